use std::fmt::{self, Display};

use thiserror::Error;

/// A key role of a backend that has to be set before an operation can run.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum KeyRole {
    Private,
    Public,
}

impl Display for KeyRole {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => fmt.write_str("Private"),
            Self::Public => fmt.write_str("Public"),
        }
    }
}

#[derive(Error, Debug)]
pub enum JwsError {
    #[error("Invalid JWS format: {0}")]
    InvalidJwsFormat(#[source] anyhow::Error),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] anyhow::Error),

    #[error("Invalid JWS payload: {0}")]
    InvalidPayload(#[source] anyhow::Error),

    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedSignatureAlgorithm(String),

    #[error("Invalid JWS header: {0}")]
    InvalidHeader(#[source] anyhow::Error),

    #[error("JWS payload can't be empty.")]
    EmptyPayload,

    #[error("{0} key is not set.")]
    KeyNotSet(KeyRole),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(#[source] anyhow::Error),

    #[error("Crypto provider failure: {0}")]
    CryptoProvider(#[source] anyhow::Error),
}

impl JwsError {
    /// Return the numeric error code.
    ///
    /// The codes are stable and meant for logs and for callers that
    /// dispatch on a number instead of the variant.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidJwsFormat(_) => 1,
            Self::InvalidJson(_) => 2,
            Self::InvalidPayload(_) => 3,
            Self::UnsupportedSignatureAlgorithm(_) => 4,
            Self::InvalidHeader(_) => 5,
            Self::EmptyPayload => 6,
            Self::InvalidKeyFormat(_) => 10,
            Self::KeyNotSet(KeyRole::Private) => 40,
            Self::KeyNotSet(KeyRole::Public) => 41,
            Self::CryptoProvider(_) => 49,
        }
    }
}
