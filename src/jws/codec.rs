use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::JwsError;
use crate::util;

/// Base64 alphabet used for the three segments of a compact token.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentEncoding {
    /// base64url without padding (RFC 7515).
    #[default]
    UrlSafeNoPad,

    /// Padded base64 with the `+` and `/` alphabet. Tokens issued by older
    /// deployments use this form.
    Standard,
}

impl SegmentEncoding {
    pub fn encode(&self, input: impl AsRef<[u8]>) -> String {
        match self {
            Self::UrlSafeNoPad => util::encode_base64_urlsafe_nopad(input),
            Self::Standard => util::encode_base64_standard(input),
        }
    }

    /// Decode a segment. Input in the other alphabet is rejected.
    pub fn decode(&self, input: impl AsRef<[u8]>) -> Result<Vec<u8>, JwsError> {
        let decoded = match self {
            Self::UrlSafeNoPad => util::decode_base64_urlsafe_no_pad(input),
            Self::Standard => util::decode_base64_standard(input),
        };
        decoded.map_err(|err| JwsError::InvalidJwsFormat(anyhow!(err)))
    }
}

/// Serialize a claims map into JSON bytes.
pub fn encode_json(map: &Map<String, Value>) -> Result<Vec<u8>, JwsError> {
    serde_json::to_vec(map).map_err(|err| JwsError::InvalidJson(anyhow!(err)))
}

/// Parse JSON bytes that must hold an object.
pub fn decode_json(input: &[u8]) -> Result<Map<String, Value>, JwsError> {
    (|| -> anyhow::Result<Map<String, Value>> {
        match serde_json::from_slice::<Value>(input)? {
            Value::Object(map) => Ok(map),
            val => bail!("JSON must be an object: {}", val),
        }
    })()
    .map_err(|err| JwsError::InvalidJson(err))
}
