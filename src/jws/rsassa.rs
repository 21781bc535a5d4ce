use std::path::Path;

use openssl::pkey::{PKey, Private, Public};
use tracing::{debug, warn};

use crate::error::{JwsError, KeyRole};
use crate::jws::alg::rsassa::RsassaJwsAlgorithm;
use crate::jws::alg::AlgorithmRegistry;
use crate::jws::{Jws, JwsConfig};
use crate::key;

/// JWS backend for RS256, RS384 and RS512.
///
/// Signing needs a private key and verification needs a public key; both
/// start unset. Payloads are raw bytes by default.
#[derive(Debug, Clone)]
pub struct RsassaJws {
    private_key: Option<PKey<Private>>,
    public_key: Option<PKey<Public>>,
    registry: AlgorithmRegistry<RsassaJwsAlgorithm>,
    config: JwsConfig,
}

impl RsassaJws {
    /// Return a new instance without keys.
    pub fn new() -> Self {
        Self::with_config(JwsConfig::default())
    }

    /// Return a new instance without keys and with explicit settings.
    ///
    /// # Arguments
    /// * `config` - The segment encoding and payload format of this instance.
    pub fn with_config(config: JwsConfig) -> Self {
        Self {
            private_key: None,
            public_key: None,
            registry: AlgorithmRegistry::new(),
            config,
        }
    }

    /// Replace the private key. When the key can't be parsed the current
    /// one is kept and `false` is returned.
    ///
    /// # Arguments
    /// * `input` - A private key of PEM or DER format.
    /// * `passphrase` - A passphrase when the private key is encrypted.
    pub fn set_private_key(&mut self, input: impl AsRef<[u8]>, passphrase: Option<&[u8]>) -> bool {
        match key::parse_private_key(input, passphrase) {
            Ok(val) => {
                self.private_key = Some(val);
                debug!("replaced RSA private key");
                true
            }
            Err(err) => {
                warn!(code = err.code(), "rejected RSA private key: {}", err);
                false
            }
        }
    }

    /// Replace the public key. When the key can't be parsed the current
    /// one is kept and `false` is returned.
    ///
    /// # Arguments
    /// * `input` - A public key or a certificate of PEM or DER format.
    pub fn set_public_key(&mut self, input: impl AsRef<[u8]>) -> bool {
        match key::parse_public_key(input) {
            Ok(val) => {
                self.public_key = Some(val);
                debug!("replaced RSA public key");
                true
            }
            Err(err) => {
                warn!(code = err.code(), "rejected RSA public key: {}", err);
                false
            }
        }
    }

    /// Read a private key file and replace the private key with it.
    ///
    /// # Arguments
    /// * `path` - A path of a PEM or DER private key file.
    /// * `passphrase` - A passphrase when the private key is encrypted.
    pub fn set_private_key_from_file(
        &mut self,
        path: impl AsRef<Path>,
        passphrase: Option<&[u8]>,
    ) -> bool {
        match key::load_file(path) {
            Ok(data) => self.set_private_key(&*data, passphrase),
            Err(err) => {
                warn!(code = err.code(), "rejected RSA private key: {}", err);
                false
            }
        }
    }

    /// Read a public key or certificate file and replace the public key
    /// with it.
    ///
    /// # Arguments
    /// * `path` - A path of a PEM or DER public key or certificate file.
    pub fn set_public_key_from_file(&mut self, path: impl AsRef<Path>) -> bool {
        match key::load_file(path) {
            Ok(data) => self.set_public_key(&*data),
            Err(err) => {
                warn!(code = err.code(), "rejected RSA public key: {}", err);
                false
            }
        }
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn has_public_key(&self) -> bool {
        self.public_key.is_some()
    }
}

impl Default for RsassaJws {
    fn default() -> Self {
        Self::new()
    }
}

impl Jws for RsassaJws {
    type Algorithm = RsassaJwsAlgorithm;

    const DEFAULT_ALGORITHM: RsassaJwsAlgorithm = RsassaJwsAlgorithm::RS256;

    fn registry(&self) -> &AlgorithmRegistry<RsassaJwsAlgorithm> {
        &self.registry
    }

    fn config(&self) -> &JwsConfig {
        &self.config
    }

    fn check_signing_key(&self) -> Result<(), JwsError> {
        match self.private_key {
            Some(_) => Ok(()),
            None => Err(JwsError::KeyNotSet(KeyRole::Private)),
        }
    }

    fn check_verifying_key(&self) -> Result<(), JwsError> {
        match self.public_key {
            Some(_) => Ok(()),
            None => Err(JwsError::KeyNotSet(KeyRole::Public)),
        }
    }

    fn create_signature(
        &self,
        algorithm: RsassaJwsAlgorithm,
        message: &[u8],
    ) -> Result<Vec<u8>, JwsError> {
        let private_key = match &self.private_key {
            Some(val) => val,
            None => return Err(JwsError::KeyNotSet(KeyRole::Private)),
        };

        algorithm.sign(private_key, message).map_err(|err| {
            warn!(alg = ?algorithm, "RSA signing failed: {}", err);
            JwsError::CryptoProvider(err)
        })
    }

    fn verify_signature(
        &self,
        algorithm: RsassaJwsAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, JwsError> {
        let public_key = match &self.public_key {
            Some(val) => val,
            None => return Err(JwsError::KeyNotSet(KeyRole::Public)),
        };

        algorithm
            .verify(public_key, message, signature)
            .map_err(|err| {
                warn!(alg = ?algorithm, "RSA verification failed: {}", err);
                JwsError::CryptoProvider(err)
            })
    }
}
