use openssl::hash::MessageDigest;
use openssl::pkey::{PKeyRef, Private, Public};
use openssl::sign::{Signer, Verifier};

use crate::jws::alg::JwsAlgorithm;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum RsassaJwsAlgorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,

    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,

    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
}

impl RsassaJwsAlgorithm {
    /// Return a signature of the message.
    ///
    /// # Arguments
    /// * `private_key` - A RSA private key.
    /// * `message` - The message data to sign.
    pub fn sign(&self, private_key: &PKeyRef<Private>, message: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut signer = Signer::new(self.message_digest(), private_key)?;
        signer.update(message)?;
        let signature = signer.sign_to_vec()?;
        Ok(signature)
    }

    /// Verify the message by the signature.
    ///
    /// `Ok(false)` is a signature that does not match, `Err` is a failure of
    /// the provider itself.
    ///
    /// # Arguments
    /// * `public_key` - A RSA public key.
    /// * `message` - The message data to verify.
    /// * `signature` - The signature data.
    pub fn verify(
        &self,
        public_key: &PKeyRef<Public>,
        message: &[u8],
        signature: &[u8],
    ) -> anyhow::Result<bool> {
        let mut verifier = Verifier::new(self.message_digest(), public_key)?;
        verifier.update(message)?;
        let matched = verifier.verify(signature)?;
        Ok(matched)
    }
}

impl JwsAlgorithm for RsassaJwsAlgorithm {
    const ALL: &'static [Self] = &[Self::RS256, Self::RS384, Self::RS512];

    fn name(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
        }
    }

    fn message_digest(&self) -> MessageDigest {
        match self {
            Self::RS256 => MessageDigest::sha256(),
            Self::RS384 => MessageDigest::sha384(),
            Self::RS512 => MessageDigest::sha512(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;
    use openssl::pkey::PKey;
    use openssl::rsa::Rsa;

    #[test]
    fn sign_and_verify_rsassa_generated_key() -> Result<()> {
        let input = b"abcde12345";

        let private_key = PKey::from_rsa(Rsa::generate(2048)?)?;
        let public_key = PKey::public_key_from_der(&private_key.public_key_to_der()?)?;

        for alg in RsassaJwsAlgorithm::ALL {
            let signature = alg.sign(&private_key, input)?;
            assert_eq!(signature.len(), 256);
            assert!(alg.verify(&public_key, input, &signature)?);
            assert!(!alg.verify(&public_key, b"abcde12346", &signature)?);
        }

        Ok(())
    }

    #[test]
    fn verify_rsassa_with_unrelated_key() -> Result<()> {
        let input = b"abcde12345";

        let private_key = PKey::from_rsa(Rsa::generate(2048)?)?;
        let other_key = PKey::from_rsa(Rsa::generate(2048)?)?;
        let other_public_key = PKey::public_key_from_der(&other_key.public_key_to_der()?)?;

        for alg in RsassaJwsAlgorithm::ALL {
            let signature = alg.sign(&private_key, input)?;
            assert!(!alg.verify(&other_public_key, input, &signature)?);
        }

        Ok(())
    }
}
