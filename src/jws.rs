pub mod alg;
pub mod codec;
pub mod hmac;
mod jws_header;
pub mod rsassa;

use std::borrow::Cow;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::JwsError;
use crate::jws::alg::{AlgorithmRegistry, JwsAlgorithm};
use crate::jws::codec::{decode_json, encode_json};

pub use crate::jws::codec::SegmentEncoding;
pub use crate::jws::hmac::HmacJws;
pub use crate::jws::jws_header::JwsHeader;
pub use crate::jws::rsassa::RsassaJws;

pub use crate::jws::alg::hmac::HmacJwsAlgorithm::HS256;
pub use crate::jws::alg::hmac::HmacJwsAlgorithm::HS384;
pub use crate::jws::alg::hmac::HmacJwsAlgorithm::HS512;

pub use crate::jws::alg::rsassa::RsassaJwsAlgorithm::RS256;
pub use crate::jws::alg::rsassa::RsassaJwsAlgorithm::RS384;
pub use crate::jws::alg::rsassa::RsassaJwsAlgorithm::RS512;

/// What [`Jws::payload`] returns for a backend instance.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadFormat {
    /// The decoded payload bytes.
    #[default]
    Raw,

    /// The payload parsed as a JSON object.
    Json,
}

/// Per-instance settings of a JWS backend.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct JwsConfig {
    pub segment_encoding: SegmentEncoding,
    pub payload_format: PayloadFormat,
}

impl JwsConfig {
    pub fn new(segment_encoding: SegmentEncoding, payload_format: PayloadFormat) -> Self {
        Self {
            segment_encoding,
            payload_format,
        }
    }
}

/// A JWS payload: opaque bytes or a JSON claims map.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum JwsPayload {
    Bytes(Vec<u8>),
    Claims(Map<String, Value>),
}

impl JwsPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bytes(val) => val.is_empty(),
            Self::Claims(val) => val.is_empty(),
        }
    }

    /// Return the bytes that get encoded into the payload segment.
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>, JwsError> {
        match self {
            Self::Bytes(val) => Ok(Cow::Borrowed(val)),
            Self::Claims(val) => Ok(Cow::Owned(encode_json(val)?)),
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(val) => Some(val),
            Self::Claims(_) => None,
        }
    }

    pub fn as_claims(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Bytes(_) => None,
            Self::Claims(val) => Some(val),
        }
    }
}

impl From<Vec<u8>> for JwsPayload {
    fn from(val: Vec<u8>) -> Self {
        Self::Bytes(val)
    }
}

impl From<&[u8]> for JwsPayload {
    fn from(val: &[u8]) -> Self {
        Self::Bytes(val.to_vec())
    }
}

impl From<&str> for JwsPayload {
    fn from(val: &str) -> Self {
        Self::Bytes(val.as_bytes().to_vec())
    }
}

impl From<String> for JwsPayload {
    fn from(val: String) -> Self {
        Self::Bytes(val.into_bytes())
    }
}

impl From<Map<String, Value>> for JwsPayload {
    fn from(val: Map<String, Value>) -> Self {
        Self::Claims(val)
    }
}

/// The three segments of a compact serialized JWS.
struct CompactParts<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> CompactParts<'a> {
    fn split(input: &'a str) -> Result<Self, JwsError> {
        (|| -> anyhow::Result<Self> {
            if input.is_empty() {
                bail!("JWS can't be an empty string.");
            }

            let parts: Vec<&str> = input.split('.').collect();
            if parts.len() != 3 {
                bail!(
                    "JWS must consist of 3 segments but {} found.",
                    parts.len()
                );
            }
            if parts.iter().any(|part| part.is_empty()) {
                bail!("JWS segments can't be empty.");
            }

            Ok(Self {
                header: parts[0],
                payload: parts[1],
                signature: parts[2],
            })
        })()
        .map_err(|err| JwsError::InvalidJwsFormat(err))
    }

    fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

/// Compact serialization signing and verification shared by every
/// backend.
///
/// A backend provides the key checks and the signature step; the header
/// handling, the algorithm negotiation and the segment assembly are
/// provided here.
pub trait Jws {
    type Algorithm: JwsAlgorithm;

    /// The algorithm injected when a header has no "alg" claim.
    const DEFAULT_ALGORITHM: Self::Algorithm;

    fn registry(&self) -> &AlgorithmRegistry<Self::Algorithm>;

    fn config(&self) -> &JwsConfig;

    /// Fail when the key needed by `sign` is not set.
    fn check_signing_key(&self) -> Result<(), JwsError>;

    /// Fail when the key needed by `verify` is not set.
    fn check_verifying_key(&self) -> Result<(), JwsError>;

    /// Return a signature of the signing input.
    ///
    /// # Arguments
    /// * `algorithm` - The resolved algorithm.
    /// * `message` - The signing input: `header "." payload`.
    fn create_signature(
        &self,
        algorithm: Self::Algorithm,
        message: &[u8],
    ) -> Result<Vec<u8>, JwsError>;

    /// Check a signature. A mismatch is `Ok(false)`.
    ///
    /// # Arguments
    /// * `algorithm` - The algorithm named by the token's header.
    /// * `message` - The signing input: `header "." payload`.
    /// * `signature` - The decoded signature.
    fn verify_signature(
        &self,
        algorithm: Self::Algorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, JwsError>;

    /// Test whether a algorithm name is usable with this backend, ignoring case.
    fn is_supported_algorithm(&self, name: &str) -> bool {
        self.registry().is_supported(name)
    }

    /// Return a compact serialized JWS of the payload.
    ///
    /// Header claims with falsy values are dropped. A missing "alg" claim
    /// becomes the backend's default algorithm, a present one is
    /// upper-cased.
    ///
    /// # Arguments
    ///
    /// * `payload` - The payload data.
    /// * `header` - The JWS header claims.
    fn sign(&self, payload: impl Into<JwsPayload>, header: &JwsHeader) -> Result<String, JwsError> {
        self.check_signing_key()?;

        let payload = payload.into();
        if payload.is_empty() {
            return Err(JwsError::EmptyPayload);
        }
        let payload_bytes = payload.to_bytes()?;
        if let PayloadFormat::Json = self.config().payload_format {
            decode_json(&payload_bytes).map_err(|err| JwsError::InvalidPayload(err.into()))?;
        }

        let mut header = header.without_empty_claims();
        let algorithm = match header.claim("alg") {
            None => Self::DEFAULT_ALGORITHM,
            Some(Value::String(val)) => self.registry().resolve(val)?,
            Some(val) => return Err(JwsError::UnsupportedSignatureAlgorithm(val.to_string())),
        };
        header.set_algorithm(algorithm.name());

        let encoding = self.config().segment_encoding;
        let header_b64 = encoding.encode(encode_json(header.claims_set())?);
        let payload_b64 = encoding.encode(&payload_bytes);

        let message = format!("{}.{}", header_b64, payload_b64);
        let signature = self.create_signature(algorithm, message.as_bytes())?;
        debug!(alg = algorithm.name(), "signed JWS");

        Ok(format!("{}.{}", message, encoding.encode(signature)))
    }

    /// Verify the signature of a compact serialized JWS.
    ///
    /// The algorithm named by the token's own header is used. A signature
    /// that does not match is `Ok(false)`.
    ///
    /// # Arguments
    ///
    /// * `input` - The compact serialized JWS.
    fn verify(&self, input: &str) -> Result<bool, JwsError> {
        self.check_verifying_key()?;

        let parts = CompactParts::split(input)?;
        let encoding = self.config().segment_encoding;

        let algorithm = (|| -> anyhow::Result<Self::Algorithm> {
            let header = decode_json(&encoding.decode(parts.header)?)?;
            match header.get("alg") {
                Some(Value::String(val)) => Ok(self.registry().resolve(val)?),
                Some(val) => bail!("A claim alg must be a string: {}", val),
                None => bail!("A claim alg is required."),
            }
        })()
        .map_err(|err| JwsError::InvalidHeader(err))?;

        let signature = encoding.decode(parts.signature)?;
        let matched = self.verify_signature(
            algorithm,
            parts.signing_input().as_bytes(),
            &signature,
        )?;
        debug!(alg = algorithm.name(), matched, "verified JWS");

        Ok(matched)
    }

    /// Return the decoded header of a compact serialized JWS without
    /// verifying it.
    ///
    /// # Arguments
    ///
    /// * `input` - The compact serialized JWS.
    fn header(&self, input: &str) -> Result<JwsHeader, JwsError> {
        let parts = CompactParts::split(input)?;
        let header = self.config().segment_encoding.decode(parts.header)?;
        let map = decode_json(&header)?;
        Ok(JwsHeader::from_map(map))
    }

    /// Return the decoded payload of a compact serialized JWS without
    /// verifying it, in the instance's [`PayloadFormat`].
    ///
    /// A payload segment that can't be decoded is
    /// [`JwsError::InvalidPayload`].
    ///
    /// # Arguments
    ///
    /// * `input` - The compact serialized JWS.
    fn payload(&self, input: &str) -> Result<JwsPayload, JwsError> {
        let parts = CompactParts::split(input)?;
        let encoding = self.config().segment_encoding;
        let format = self.config().payload_format;

        (|| -> anyhow::Result<JwsPayload> {
            let payload = encoding.decode(parts.payload)?;
            match format {
                PayloadFormat::Raw => Ok(JwsPayload::Bytes(payload)),
                PayloadFormat::Json => Ok(JwsPayload::Claims(decode_json(&payload)?)),
            }
        })()
        .map_err(|err| JwsError::InvalidPayload(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_split_compact() -> Result<()> {
        let parts = CompactParts::split("aaa.bbb.ccc")?;
        assert_eq!(parts.header, "aaa");
        assert_eq!(parts.payload, "bbb");
        assert_eq!(parts.signature, "ccc");
        assert_eq!(parts.signing_input(), "aaa.bbb");

        let malformed = [
            "", "aaa", "aaa.bbb", "aaa.bbb.ccc.ddd", "aaa..ccc", ".bbb.ccc", "aaa.bbb.",
        ];
        for input in &malformed {
            match CompactParts::split(input) {
                Err(JwsError::InvalidJwsFormat(_)) => {}
                _ => panic!("accepted: {:?}", input),
            }
        }

        Ok(())
    }

    #[test]
    fn test_payload_conversions() -> Result<()> {
        let claims = match json!({"iss": "https://issuer.com"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let payload = JwsPayload::from(claims.clone());
        assert_eq!(payload.as_claims(), Some(&claims));
        assert_eq!(payload.to_bytes()?.as_ref(), br#"{"iss":"https://issuer.com"}"#);

        let payload = JwsPayload::from("abc");
        assert_eq!(payload.as_bytes(), Some(b"abc".as_slice()));
        assert!(!payload.is_empty());

        assert!(JwsPayload::from("").is_empty());
        assert!(JwsPayload::from(Map::new()).is_empty());

        Ok(())
    }

    #[test]
    fn test_config_from_json() -> Result<()> {
        let config: JwsConfig = serde_json::from_str(r#"{"segment-encoding":"standard"}"#)?;
        assert_eq!(config.segment_encoding, SegmentEncoding::Standard);
        assert_eq!(config.payload_format, PayloadFormat::Raw);

        let config: JwsConfig = serde_json::from_str(r#"{"payload-format":"json"}"#)?;
        assert_eq!(
            config,
            JwsConfig::new(SegmentEncoding::UrlSafeNoPad, PayloadFormat::Json)
        );

        Ok(())
    }
}
