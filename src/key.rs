//! Parsing of RSA key material into OpenSSL key handles.
//!
//! Private keys may be given as PEM (`PRIVATE KEY`, `RSA PRIVATE KEY`,
//! `ENCRYPTED PRIVATE KEY`, or a legacy encrypted `RSA PRIVATE KEY` with
//! `Proc-Type` headers) or as DER (PKCS#8 PrivateKeyInfo or PKCS#1
//! RSAPrivateKey). Public keys may be given as PEM (`PUBLIC KEY`,
//! `RSA PUBLIC KEY`, `CERTIFICATE`) or as DER (SubjectPublicKeyInfo,
//! PKCS#1 RSAPublicKey or a X.509 certificate).
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail};
use openssl::pkey::{HasPublic, Id, PKey, PKeyRef, Private, Public};
use openssl::rsa::Rsa;
use openssl::x509::X509;
use zeroize::Zeroizing;

use crate::error::JwsError;
use crate::util::parse_pem;

/// Minimum RSA modulus length in bits.
pub const MIN_RSA_KEY_BITS: u32 = 2048;

/// Return a private key handle from PEM or DER key material.
///
/// # Arguments
/// * `input` - A private key of PEM or DER format.
/// * `passphrase` - A passphrase when the private key is encrypted.
pub fn parse_private_key(
    input: impl AsRef<[u8]>,
    passphrase: Option<&[u8]>,
) -> Result<PKey<Private>, JwsError> {
    (|| -> anyhow::Result<PKey<Private>> {
        let input = input.as_ref();

        let pkey = match (parse_pem(input), passphrase) {
            (Some(_), Some(passphrase)) => {
                PKey::private_key_from_pem_passphrase(input, passphrase)?
            }
            (Some(pem), None) => {
                let (label, data) = pem?;
                match label.as_str() {
                    "PRIVATE KEY" | "RSA PRIVATE KEY" => private_key_from_der(&data)?,
                    "ENCRYPTED PRIVATE KEY" => bail!("A passphrase is required."),
                    label => bail!("Inappropriate PEM label: {}", label),
                }
            }
            // An unencrypted DER key is accepted even when a passphrase is given.
            (None, Some(passphrase)) => {
                match PKey::private_key_from_pkcs8_passphrase(input, passphrase) {
                    Ok(val) => val,
                    Err(err) => private_key_from_der(input)
                        .map_err(|_| anyhow!("Unrecognized private key format: {}", err))?,
                }
            }
            (None, None) => private_key_from_der(input)?,
        };
        check_rsa_key(&pkey)?;

        Ok(pkey)
    })()
    .map_err(|err| JwsError::InvalidKeyFormat(err))
}

/// Return a public key handle from PEM or DER key material.
///
/// # Arguments
/// * `input` - A public key or a certificate of PEM or DER format.
pub fn parse_public_key(input: impl AsRef<[u8]>) -> Result<PKey<Public>, JwsError> {
    (|| -> anyhow::Result<PKey<Public>> {
        let input = input.as_ref();

        let pkey = if let Some(pem) = parse_pem(input) {
            let (label, data) = pem?;
            match label.as_str() {
                "PUBLIC KEY" => PKey::public_key_from_der(&data)?,
                "RSA PUBLIC KEY" => PKey::from_rsa(Rsa::public_key_from_der_pkcs1(&data)?)?,
                "CERTIFICATE" => X509::from_der(&data)?.public_key()?,
                label => bail!("Inappropriate PEM label: {}", label),
            }
        } else if let Ok(val) = PKey::public_key_from_der(input) {
            val
        } else if let Ok(val) = Rsa::public_key_from_der_pkcs1(input) {
            PKey::from_rsa(val)?
        } else {
            X509::from_der(input)
                .map_err(|err| anyhow!("Unrecognized public key format: {}", err))?
                .public_key()?
        };
        check_rsa_key(&pkey)?;

        Ok(pkey)
    })()
    .map_err(|err| JwsError::InvalidKeyFormat(err))
}

/// Read key material from a file. The buffer is wiped when dropped.
///
/// # Arguments
/// * `path` - A path of the key file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Zeroizing<Vec<u8>>, JwsError> {
    let path = path.as_ref();
    fs::read(path)
        .map(Zeroizing::new)
        .map_err(|err| JwsError::InvalidKeyFormat(anyhow!("{}: {}", path.display(), err)))
}

/// PKCS#8 PrivateKeyInfo, then PKCS#1 RSAPrivateKey.
fn private_key_from_der(input: &[u8]) -> anyhow::Result<PKey<Private>> {
    match PKey::private_key_from_der(input) {
        Ok(val) => Ok(val),
        Err(_) => Ok(PKey::from_rsa(Rsa::private_key_from_der(input)?)?),
    }
}

fn check_rsa_key<T: HasPublic>(pkey: &PKeyRef<T>) -> anyhow::Result<()> {
    if pkey.id() != Id::RSA {
        bail!("Key type must be RSA.");
    }

    if pkey.bits() < MIN_RSA_KEY_BITS {
        bail!("key length must be {} or more.", MIN_RSA_KEY_BITS);
    }

    Ok(())
}
