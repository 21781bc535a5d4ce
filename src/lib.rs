//! # jwskit
//!
//! `jwskit` is a JWS (JSON Web Signature) compact serialization library
//! with a HMAC backend (HS256, HS384, HS512) and a RSASSA-PKCS1-v1_5
//! backend (RS256, RS384, RS512).
//!
//! ```
//! use jwskit::jws::{HmacJws, Jws, JwsHeader};
//! use serde_json::{json, Map};
//!
//! # fn main() -> Result<(), jwskit::JwsError> {
//! let mut jws = HmacJws::new("8AA829AC3E1FAF5B75C1EC67A610670FFE56BF37")?;
//!
//! let mut header = JwsHeader::new();
//! header.set_token_type("JWT");
//!
//! let mut claims = Map::new();
//! claims.insert("iss".to_string(), json!("https://issuer.com"));
//!
//! let token = jws.sign(claims, &header)?;
//! assert!(jws.verify(&token)?);
//!
//! jws.set_secret_key("6FB2486F46632DFC171B36ED64E9FA1BAE06FC29");
//! assert!(!jws.verify(&token)?);
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod jws;
pub mod key;

mod util;

pub use crate::error::{JwsError, KeyRole};

pub use serde_json::{Map, Value};
