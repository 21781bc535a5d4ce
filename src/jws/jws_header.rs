use std::fmt::{self, Display};

use serde_json::{Map, Value};

/// Represent JWS header claims.
///
/// Claims keep their insertion order.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct JwsHeader {
    claims: Map<String, Value>,
}

impl JwsHeader {
    /// Return a new JwsHeader instance.
    pub fn new() -> Self {
        Self { claims: Map::new() }
    }

    /// Return a JwsHeader instance from a claims map.
    ///
    /// # Arguments
    ///
    /// * `map` - JWS header claims.
    pub fn from_map(map: impl Into<Map<String, Value>>) -> Self {
        Self { claims: map.into() }
    }

    /// Set a value for algorithm header claim (alg).
    ///
    /// # Arguments
    ///
    /// * `value` - a algorithm
    pub fn set_algorithm(&mut self, value: impl Into<String>) {
        self.claims.insert("alg".to_string(), Value::String(value.into()));
    }

    /// Return the value for algorithm header claim (alg).
    pub fn algorithm(&self) -> Option<&str> {
        self.string_claim("alg")
    }

    /// Set a value for token type header claim (typ).
    ///
    /// # Arguments
    ///
    /// * `value` - a token type (e.g. "JWT")
    pub fn set_token_type(&mut self, value: impl Into<String>) {
        self.claims.insert("typ".to_string(), Value::String(value.into()));
    }

    /// Return the value for token type header claim (typ).
    pub fn token_type(&self) -> Option<&str> {
        self.string_claim("typ")
    }

    /// Set a value for content type header claim (cty).
    ///
    /// # Arguments
    ///
    /// * `value` - a content type (e.g. "JWT")
    pub fn set_content_type(&mut self, value: impl Into<String>) {
        self.claims.insert("cty".to_string(), Value::String(value.into()));
    }

    /// Return the value for content type header claim (cty).
    pub fn content_type(&self) -> Option<&str> {
        self.string_claim("cty")
    }

    /// Set a value for JWK key ID header claim (kid).
    ///
    /// # Arguments
    ///
    /// * `value` - a key ID
    pub fn set_key_id(&mut self, value: impl Into<String>) {
        self.claims.insert("kid".to_string(), Value::String(value.into()));
    }

    /// Return the value for JWK key ID header claim (kid).
    pub fn key_id(&self) -> Option<&str> {
        self.string_claim("kid")
    }

    /// Set a value for X.509 URL header claim (x5u).
    ///
    /// # Arguments
    ///
    /// * `value` - a X.509 URL
    pub fn set_x509_url(&mut self, value: impl Into<String>) {
        self.claims.insert("x5u".to_string(), Value::String(value.into()));
    }

    /// Return the value for X.509 URL header claim (x5u).
    pub fn x509_url(&self) -> Option<&str> {
        self.string_claim("x5u")
    }

    /// Set a value for header claim of a specified key.
    /// A `None` value removes the claim.
    ///
    /// # Arguments
    ///
    /// * `key` - a key name of header claim
    /// * `value` - a typed value of header claim
    pub fn set_claim(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(val) => {
                self.claims.insert(key.to_string(), val);
            }
            None => {
                self.claims.shift_remove(key);
            }
        }
    }

    /// Return the value for header claim of a specified key.
    ///
    /// # Arguments
    ///
    /// * `key` - a key name of header claim
    pub fn claim(&self, key: &str) -> Option<&Value> {
        self.claims.get(key)
    }

    /// Return values for header claims set
    pub fn claims_set(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Return a copy without the claims whose value is falsy:
    /// `null`, `false`, `0`, `""`, `[]` or `{}`.
    pub fn without_empty_claims(&self) -> Self {
        let claims = self
            .claims
            .iter()
            .filter(|(_, val)| !is_falsy(val))
            .map(|(key, val)| (key.clone(), val.clone()))
            .collect();
        Self { claims }
    }

    fn string_claim(&self, key: &str) -> Option<&str> {
        match self.claims.get(key) {
            Some(Value::String(val)) => Some(val),
            _ => None,
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(val) => !val,
        Value::Number(val) => val.as_f64() == Some(0.0),
        Value::String(val) => val.is_empty(),
        Value::Array(val) => val.is_empty(),
        Value::Object(val) => val.is_empty(),
    }
}

impl From<Map<String, Value>> for JwsHeader {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl From<JwsHeader> for Map<String, Value> {
    fn from(header: JwsHeader) -> Self {
        header.claims
    }
}

impl AsRef<Map<String, Value>> for JwsHeader {
    fn as_ref(&self) -> &Map<String, Value> {
        &self.claims
    }
}

impl Display for JwsHeader {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = serde_json::to_string(&self.claims).map_err(|_e| fmt::Error {})?;
        fmt.write_str(&val)
    }
}
