use openssl::hash::MessageDigest;
use openssl::memcmp;
use openssl::pkey::PKey;
use openssl::sign::Signer;

use crate::jws::alg::JwsAlgorithm;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum HmacJwsAlgorithm {
    /// HMAC using SHA-256
    HS256,

    /// HMAC using SHA-384
    HS384,

    /// HMAC using SHA-512
    HS512,
}

impl HmacJwsAlgorithm {
    pub fn signature_len(&self) -> usize {
        match self {
            Self::HS256 => 32,
            Self::HS384 => 48,
            Self::HS512 => 64,
        }
    }

    /// Return the MAC of a message.
    ///
    /// # Arguments
    /// * `secret` - A secret key.
    /// * `message` - The message data to sign.
    pub fn sign(&self, secret: &[u8], message: &[u8]) -> anyhow::Result<Vec<u8>> {
        let private_key = PKey::hmac(secret)?;
        let mut signer = Signer::new(self.message_digest(), &private_key)?;
        signer.update(message)?;
        let signature = signer.sign_to_vec()?;
        Ok(signature)
    }

    /// Recompute the MAC of a message and compare it with a signature in
    /// constant time. A mismatch is `Ok(false)`.
    ///
    /// # Arguments
    /// * `secret` - A secret key.
    /// * `message` - The message data to verify.
    /// * `signature` - The signature data.
    pub fn verify(&self, secret: &[u8], message: &[u8], signature: &[u8]) -> anyhow::Result<bool> {
        let new_signature = self.sign(secret, message)?;
        // memcmp::eq panics on unequal lengths; the length is not secret.
        if new_signature.len() != signature.len() {
            return Ok(false);
        }
        Ok(memcmp::eq(&new_signature, signature))
    }
}

impl JwsAlgorithm for HmacJwsAlgorithm {
    const ALL: &'static [Self] = &[Self::HS256, Self::HS384, Self::HS512];

    fn name(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }

    fn message_digest(&self) -> MessageDigest {
        match self {
            Self::HS256 => MessageDigest::sha256(),
            Self::HS384 => MessageDigest::sha384(),
            Self::HS512 => MessageDigest::sha512(),
        }
    }
}
