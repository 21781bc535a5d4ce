use std::fmt::{self, Debug};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::error::JwsError;
use crate::jws::alg::hmac::HmacJwsAlgorithm;
use crate::jws::alg::AlgorithmRegistry;
use crate::jws::{Jws, JwsConfig, PayloadFormat};

/// A non-empty HMAC secret. The bytes are overwritten when the value is
/// dropped.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    pub fn new(input: impl AsRef<[u8]>) -> Result<Self, JwsError> {
        let input = input.as_ref();
        if input.is_empty() {
            return Err(JwsError::InvalidKeyFormat(anyhow::anyhow!(
                "Secret key can't be empty."
            )));
        }
        Ok(Self(Zeroizing::new(input.to_vec())))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for SecretKey {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "SecretKey([REDACTED; {}])", self.0.len())
    }
}

/// JWS backend for HS256, HS384 and HS512.
///
/// Payloads are JSON claims by default.
#[derive(Debug, Clone)]
pub struct HmacJws {
    secret_key: SecretKey,
    registry: AlgorithmRegistry<HmacJwsAlgorithm>,
    config: JwsConfig,
}

impl HmacJws {
    /// Return a new instance.
    ///
    /// # Arguments
    /// * `secret` - A non-empty secret key.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, JwsError> {
        Self::with_config(secret, JwsConfig {
            payload_format: PayloadFormat::Json,
            ..JwsConfig::default()
        })
    }

    /// Return a new instance with explicit settings.
    ///
    /// # Arguments
    /// * `secret` - A non-empty secret key.
    /// * `config` - The segment encoding and payload format of this instance.
    pub fn with_config(secret: impl AsRef<[u8]>, config: JwsConfig) -> Result<Self, JwsError> {
        Ok(Self {
            secret_key: SecretKey::new(secret)?,
            registry: AlgorithmRegistry::new(),
            config,
        })
    }

    /// Replace the secret key. An empty key is rejected and the current one
    /// is kept.
    ///
    /// # Arguments
    /// * `secret` - A non-empty secret key.
    pub fn set_secret_key(&mut self, secret: impl AsRef<[u8]>) -> bool {
        match SecretKey::new(secret) {
            Ok(val) => {
                self.secret_key = val;
                debug!("replaced HMAC secret key");
                true
            }
            Err(err) => {
                warn!(code = err.code(), "rejected HMAC secret key: {}", err);
                false
            }
        }
    }
}

impl Jws for HmacJws {
    type Algorithm = HmacJwsAlgorithm;

    const DEFAULT_ALGORITHM: HmacJwsAlgorithm = HmacJwsAlgorithm::HS256;

    fn registry(&self) -> &AlgorithmRegistry<HmacJwsAlgorithm> {
        &self.registry
    }

    fn config(&self) -> &JwsConfig {
        &self.config
    }

    // The secret is set by every constructor and can't be unset.
    fn check_signing_key(&self) -> Result<(), JwsError> {
        Ok(())
    }

    // Same secret as signing.
    fn check_verifying_key(&self) -> Result<(), JwsError> {
        Ok(())
    }

    fn create_signature(
        &self,
        algorithm: HmacJwsAlgorithm,
        message: &[u8],
    ) -> Result<Vec<u8>, JwsError> {
        algorithm
            .sign(self.secret_key.as_bytes(), message)
            .map_err(|err| JwsError::CryptoProvider(err))
    }

    fn verify_signature(
        &self,
        algorithm: HmacJwsAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, JwsError> {
        algorithm
            .verify(self.secret_key.as_bytes(), message, signature)
            .map_err(|err| JwsError::CryptoProvider(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;
    use serde_json::{json, Map, Value};

    use crate::jws::{JwsHeader, JwsPayload, SegmentEncoding};

    const SECRET_ONE: &str = "8AA829AC3E1FAF5B75C1EC67A610670FFE56BF37";
    const SECRET_TWO: &str = "6FB2486F46632DFC171B36ED64E9FA1BAE06FC29";

    fn claims() -> Map<String, Value> {
        match json!({
            "iss": "https://issuer.com",
            "sub": "subject@something.com",
            "aud": "https://audience.com",
            "jti": "abc123"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn sign_and_verify_hmac() -> Result<()> {
        let jws = HmacJws::new(SECRET_ONE)?;

        for alg in &["HS256", "HS384", "HS512"] {
            let mut header = JwsHeader::new();
            header.set_algorithm(*alg);
            header.set_token_type("JWT");

            let token = jws.sign(claims(), &header)?;
            assert_eq!(token.split('.').count(), 3);
            assert!(jws.verify(&token)?);
            assert_eq!(jws.header(&token)?, header);
            assert_eq!(jws.payload(&token)?, JwsPayload::Claims(claims()));
        }

        Ok(())
    }

    #[test]
    fn verify_after_secret_key_change() -> Result<()> {
        let mut jws = HmacJws::new(SECRET_ONE)?;

        let mut header = JwsHeader::new();
        header.set_algorithm("HS256");
        let token = jws.sign(claims(), &header)?;
        assert!(jws.verify(&token)?);

        assert!(jws.set_secret_key(SECRET_TWO));
        assert!(!jws.verify(&token)?);

        assert!(jws.set_secret_key(SECRET_ONE));
        assert!(jws.verify(&token)?);

        Ok(())
    }

    #[test]
    fn reject_empty_secret_key() -> Result<()> {
        match HmacJws::new("") {
            Err(err @ JwsError::InvalidKeyFormat(_)) => assert_eq!(err.code(), 10),
            other => panic!("unexpected: {:?}", other),
        }

        let mut jws = HmacJws::new(SECRET_ONE)?;
        let token = jws.sign(claims(), &JwsHeader::new())?;

        assert!(!jws.set_secret_key(""));
        assert!(!jws.set_secret_key(Vec::<u8>::new()));
        assert!(jws.check_signing_key().is_ok());
        assert!(jws.check_verifying_key().is_ok());
        assert!(jws.verify(&token)?);

        Ok(())
    }

    #[test]
    fn sign_injects_default_algorithm() -> Result<()> {
        let jws = HmacJws::new(SECRET_ONE)?;

        let mut header = JwsHeader::new();
        header.set_token_type("JWT");
        header.set_algorithm("");
        header.set_content_type("");

        let token = jws.sign(claims(), &header)?;
        let decoded = jws.header(&token)?;
        assert_eq!(decoded.to_string(), r#"{"typ":"JWT","alg":"HS256"}"#);
        assert!(jws.verify(&token)?);

        Ok(())
    }

    #[test]
    fn algorithm_names_ignore_case() -> Result<()> {
        let jws = HmacJws::new(SECRET_ONE)?;

        let mut lower = JwsHeader::new();
        lower.set_algorithm("hs256");
        let mut upper = JwsHeader::new();
        upper.set_algorithm("HS256");

        let lower_token = jws.sign(claims(), &lower)?;
        let upper_token = jws.sign(claims(), &upper)?;
        assert_eq!(lower_token, upper_token);
        assert_eq!(jws.header(&lower_token)?.algorithm(), Some("HS256"));

        assert!(jws.is_supported_algorithm("hs512"));
        assert!(!jws.is_supported_algorithm("RS256"));

        Ok(())
    }

    #[test]
    fn sign_rejects_bad_input() -> Result<()> {
        let jws = HmacJws::new(SECRET_ONE)?;

        assert!(matches!(
            jws.sign(Map::new(), &JwsHeader::new()),
            Err(JwsError::EmptyPayload)
        ));
        assert!(matches!(
            jws.sign("", &JwsHeader::new()),
            Err(JwsError::EmptyPayload)
        ));

        let mut header = JwsHeader::new();
        header.set_algorithm("bogus");
        assert!(matches!(
            jws.sign(claims(), &header),
            Err(JwsError::UnsupportedSignatureAlgorithm(_))
        ));

        header.set_algorithm("RS256");
        assert!(matches!(
            jws.sign(claims(), &header),
            Err(JwsError::UnsupportedSignatureAlgorithm(_))
        ));

        header.set_claim("alg", Some(json!(256)));
        assert!(matches!(
            jws.sign(claims(), &header),
            Err(JwsError::UnsupportedSignatureAlgorithm(_))
        ));

        match jws.sign("not json", &JwsHeader::new()) {
            Err(err @ JwsError::InvalidPayload(_)) => assert_eq!(err.code(), 3),
            other => panic!("unexpected: {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn verify_rejects_malformed_tokens() -> Result<()> {
        let jws = HmacJws::new(SECRET_ONE)?;
        let token = jws.sign(claims(), &JwsHeader::new())?;

        for input in &["", "abc", "a.b", "a.b.c.d", format!("{}.x", token).as_str()] {
            assert!(matches!(
                jws.verify(input),
                Err(JwsError::InvalidJwsFormat(_))
            ));
        }

        let parts: Vec<&str> = token.split('.').collect();
        let encoding = SegmentEncoding::UrlSafeNoPad;

        let no_alg = encoding.encode(br#"{"typ":"JWT"}"#);
        let forged = format!("{}.{}.{}", no_alg, parts[1], parts[2]);
        assert!(matches!(jws.verify(&forged), Err(JwsError::InvalidHeader(_))));

        let rsa_alg = encoding.encode(br#"{"alg":"RS256"}"#);
        let forged = format!("{}.{}.{}", rsa_alg, parts[1], parts[2]);
        assert!(matches!(jws.verify(&forged), Err(JwsError::InvalidHeader(_))));

        let not_object = encoding.encode(br#"["HS256"]"#);
        let forged = format!("{}.{}.{}", not_object, parts[1], parts[2]);
        assert!(matches!(jws.verify(&forged), Err(JwsError::InvalidHeader(_))));

        let forged = format!("{}.{}.{}", parts[0], parts[1], "%%%%");
        assert!(matches!(jws.verify(&forged), Err(JwsError::InvalidJwsFormat(_))));

        Ok(())
    }

    #[test]
    fn verify_tampered_token_is_false() -> Result<()> {
        let jws = HmacJws::new(SECRET_ONE)?;
        let token = jws.sign(claims(), &JwsHeader::new())?;
        let parts: Vec<&str> = token.split('.').collect();

        let other_payload = SegmentEncoding::UrlSafeNoPad.encode(br#"{"iss":"https://evil.com"}"#);
        let tampered = format!("{}.{}.{}", parts[0], other_payload, parts[2]);
        assert!(!jws.verify(&tampered)?);

        let short_signature = SegmentEncoding::UrlSafeNoPad.encode(b"abc");
        let tampered = format!("{}.{}.{}", parts[0], parts[1], short_signature);
        assert!(!jws.verify(&tampered)?);

        let hs512 = SegmentEncoding::UrlSafeNoPad.encode(br#"{"alg":"HS512"}"#);
        let tampered = format!("{}.{}.{}", hs512, parts[1], parts[2]);
        assert!(!jws.verify(&tampered)?);

        Ok(())
    }

    #[test]
    fn standard_segment_encoding() -> Result<()> {
        let config = JwsConfig::new(SegmentEncoding::Standard, PayloadFormat::Json);
        let jws = HmacJws::with_config(SECRET_ONE, config)?;
        let url_safe = HmacJws::new(SECRET_ONE)?;

        let token = jws.sign(claims(), &JwsHeader::new())?;
        assert!(jws.verify(&token)?);
        assert_eq!(jws.payload(&token)?, JwsPayload::Claims(claims()));

        let header_segment = token.split('.').next().unwrap_or_default();
        assert_eq!(
            header_segment,
            SegmentEncoding::Standard.encode(br#"{"alg":"HS256"}"#)
        );
        assert!(token.ends_with('='));

        let url_safe_token = url_safe.sign(claims(), &JwsHeader::new())?;
        assert_ne!(token, url_safe_token);
        assert!(url_safe.verify(&url_safe_token)?);

        Ok(())
    }

    #[test]
    fn raw_payload_format() -> Result<()> {
        let config = JwsConfig::new(SegmentEncoding::UrlSafeNoPad, PayloadFormat::Raw);
        let jws = HmacJws::with_config(SECRET_ONE, config)?;

        let token = jws.sign("plain text payload", &JwsHeader::new())?;
        assert!(jws.verify(&token)?);
        assert_eq!(
            jws.payload(&token)?,
            JwsPayload::Bytes(b"plain text payload".to_vec())
        );

        Ok(())
    }

    #[test]
    fn header_and_payload_parse_errors() -> Result<()> {
        let jws = HmacJws::new(SECRET_ONE)?;
        let encoding = SegmentEncoding::UrlSafeNoPad;

        let token = format!(
            "{}.{}.{}",
            encoding.encode(b"{not json"),
            encoding.encode(b"[1,2,3]"),
            encoding.encode(b"sig")
        );
        match jws.header(&token) {
            Err(err @ JwsError::InvalidJson(_)) => assert_eq!(err.code(), 2),
            other => panic!("unexpected: {:?}", other),
        }
        match jws.payload(&token) {
            Err(err @ JwsError::InvalidPayload(_)) => assert_eq!(err.code(), 3),
            other => panic!("unexpected: {:?}", other),
        }

        let not_json = format!(
            "{}.{}.{}",
            encoding.encode(br#"{"alg":"HS256"}"#),
            encoding.encode(b"not json"),
            encoding.encode(b"sig")
        );
        assert!(jws.header(&not_json).is_ok());
        assert_eq!(jws.payload(&not_json).map_err(|err| err.code()), Err(3));

        let raw = HmacJws::with_config(
            SECRET_ONE,
            JwsConfig::new(SegmentEncoding::UrlSafeNoPad, PayloadFormat::Raw),
        )?;
        let bad_segment = format!(
            "{}.{}.{}",
            encoding.encode(br#"{"alg":"HS256"}"#),
            "%%%",
            "c2ln"
        );
        assert!(matches!(
            raw.payload(&bad_segment),
            Err(JwsError::InvalidPayload(_))
        ));

        assert!(matches!(jws.header(""), Err(JwsError::InvalidJwsFormat(_))));
        assert!(matches!(jws.payload("a.b"), Err(JwsError::InvalidJwsFormat(_))));
        assert!(matches!(
            jws.header("***.bbb.ccc"),
            Err(JwsError::InvalidJwsFormat(_))
        ));

        Ok(())
    }

    #[test]
    fn secret_key_debug_is_redacted() -> Result<()> {
        let jws = HmacJws::new(SECRET_ONE)?;
        let debug = format!("{:?}", jws);
        assert!(!debug.contains(SECRET_ONE));
        assert!(debug.contains("SecretKey([REDACTED; 40])"));
        Ok(())
    }
}
