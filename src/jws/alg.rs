pub mod hmac;
pub mod rsassa;

use std::collections::BTreeMap;
use std::fmt::Debug;

use openssl::hash::MessageDigest;

use crate::error::JwsError;

pub use crate::jws::alg::hmac::HmacJwsAlgorithm::HS256;
pub use crate::jws::alg::hmac::HmacJwsAlgorithm::HS384;
pub use crate::jws::alg::hmac::HmacJwsAlgorithm::HS512;

pub use crate::jws::alg::rsassa::RsassaJwsAlgorithm::RS256;
pub use crate::jws::alg::rsassa::RsassaJwsAlgorithm::RS384;
pub use crate::jws::alg::rsassa::RsassaJwsAlgorithm::RS512;

pub trait JwsAlgorithm: Debug + Copy + Send + Sync + 'static {
    /// Every algorithm of the family.
    const ALL: &'static [Self];

    /// Return the "alg" (algorithm) header parameter value of JWS.
    fn name(&self) -> &'static str;

    /// Return the digest the signature scheme is computed with.
    fn message_digest(&self) -> MessageDigest;
}

/// Read-only table from an upper-cased algorithm name to an algorithm of
/// one family.
#[derive(Debug, Clone)]
pub struct AlgorithmRegistry<A: JwsAlgorithm> {
    algorithms: BTreeMap<String, A>,
}

impl<A: JwsAlgorithm> AlgorithmRegistry<A> {
    pub fn new() -> Self {
        let mut algorithms = BTreeMap::new();
        for alg in A::ALL {
            algorithms.insert(alg.name().to_string(), *alg);
        }
        Self { algorithms }
    }

    /// Test whether a algorithm name is in this registry, ignoring case.
    ///
    /// # Arguments
    ///
    /// * `name` - a algorithm name
    pub fn is_supported(&self, name: &str) -> bool {
        self.algorithms.contains_key(&name.to_ascii_uppercase())
    }

    /// Look up a algorithm by name, ignoring case.
    ///
    /// # Arguments
    ///
    /// * `name` - a algorithm name
    pub fn resolve(&self, name: &str) -> Result<A, JwsError> {
        match self.algorithms.get(&name.to_ascii_uppercase()) {
            Some(val) => Ok(*val),
            None => Err(JwsError::UnsupportedSignatureAlgorithm(name.to_string())),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.algorithms.keys().map(|val| val.as_str())
    }
}

impl<A: JwsAlgorithm> Default for AlgorithmRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}
