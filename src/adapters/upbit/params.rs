//! Upbit Request Parameters
//!
//! Flat parameter mapping shared by the signer and the transport. The
//! canonical query string produced here is both the SHA512 hash input and
//! the literal query string sent on GET/DELETE requests, so the two can
//! never disagree about the bytes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use url::form_urlencoded;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

// =============================================================================
// Parameter values
// =============================================================================

/// A single parameter value: string, number, or ordered list of strings
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Float(f64),
    /// Encoded as repeated `key=value` pairs, in the given order
    List(Vec<String>),
}

impl ParamValue {
    fn scalar_text(&self, key: &str) -> ExchangeResult<String> {
        match self {
            ParamValue::Text(s) => Ok(s.clone()),
            ParamValue::Int(n) => Ok(n.to_string()),
            ParamValue::Float(f) if f.is_finite() => Ok(f.to_string()),
            ParamValue::Float(f) => Err(ExchangeError::EncodingFailure(format!(
                "non-finite number {} for key '{}'",
                f, key
            ))),
            ParamValue::List(_) => Err(ExchangeError::EncodingFailure(format!(
                "list value for key '{}' is not a scalar",
                key
            ))),
        }
    }

    fn to_json(&self, key: &str) -> ExchangeResult<serde_json::Value> {
        match self {
            ParamValue::Text(s) => Ok(serde_json::Value::String(s.clone())),
            ParamValue::Int(n) => Ok(serde_json::Value::from(*n)),
            ParamValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    ExchangeError::EncodingFailure(format!(
                        "non-finite number {} for key '{}'",
                        f, key
                    ))
                }),
            ParamValue::List(items) => Ok(serde_json::Value::Array(
                items.iter().cloned().map(serde_json::Value::String).collect(),
            )),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u16> for ParamValue {
    fn from(value: u16) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

/// Decimals travel as strings so no precision is lost on the wire
impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        ParamValue::Text(value.normalize().to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for ParamValue {
    fn from(value: &[String]) -> Self {
        ParamValue::List(value.to_vec())
    }
}

impl TryFrom<serde_json::Value> for ParamValue {
    type Error = ExchangeError;

    /// Only flat values are accepted. Nested objects and arrays have no
    /// agreed canonical form, so they are rejected instead of guessed.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(ParamValue::Text(s)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Int(i))
                } else if n.is_u64() {
                    Ok(ParamValue::Text(n.to_string()))
                } else {
                    n.as_f64()
                        .map(ParamValue::Float)
                        .ok_or_else(|| ExchangeError::EncodingFailure(format!("unrepresentable number {}", n)))
                }
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    Value::Number(n) => Ok(n.to_string()),
                    other => Err(ExchangeError::EncodingFailure(format!(
                        "unsupported list element: {}",
                        other
                    ))),
                })
                .collect::<ExchangeResult<Vec<String>>>()
                .map(ParamValue::List),
            Value::Object(_) => Err(ExchangeError::EncodingFailure(
                "nested parameters are not supported".to_string(),
            )),
            Value::Bool(b) => Err(ExchangeError::EncodingFailure(format!(
                "boolean value {} is not a supported parameter type",
                b
            ))),
            Value::Null => Err(ExchangeError::EncodingFailure(
                "null is not a supported parameter value".to_string(),
            )),
        }
    }
}

// =============================================================================
// Parameter mapping
// =============================================================================

/// Request parameter mapping, kept sorted by key (byte-wise ascending)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a value, replacing any previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert only when the value is present
    pub fn insert_opt<V: Into<ParamValue>>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.0.insert(key.into(), v.into());
        }
        self
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Build parameters from a JSON object of flat values
    pub fn from_json(value: serde_json::Value) -> ExchangeResult<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut params = Params::new();
                for (key, v) in map {
                    let value = ParamValue::try_from(v).map_err(|e| match e {
                        ExchangeError::EncodingFailure(msg) => {
                            ExchangeError::EncodingFailure(format!("key '{}': {}", key, msg))
                        }
                        other => other,
                    })?;
                    params.0.insert(key, value);
                }
                Ok(params)
            }
            other => Err(ExchangeError::EncodingFailure(format!(
                "parameters must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Canonical query string: keys sorted, form-urlencoded, list values
    /// expanded to repeated pairs in their given order.
    ///
    /// `{"uuids": ["u1", "u2"]}` becomes `uuids=u1&uuids=u2`. Components use
    /// the `quote_plus` safe set (`A-Za-z0-9_.-~`, space as `+`), which is
    /// what Upbit hashes on its side.
    pub fn canonical_query(&self) -> ExchangeResult<String> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            match value {
                ParamValue::List(items) => {
                    for item in items {
                        pairs.push(encode_pair(key, item));
                    }
                }
                scalar => {
                    pairs.push(encode_pair(key, &scalar.scalar_text(key)?));
                }
            }
        }
        Ok(pairs.join("&"))
    }

    /// JSON object body for POST requests
    pub fn to_json_body(&self) -> ExchangeResult<serde_json::Value> {
        let mut map = serde_json::Map::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            map.insert(key.clone(), value.to_json(key)?);
        }
        Ok(serde_json::Value::Object(map))
    }
}

fn encode_pair(key: &str, value: &str) -> String {
    format!("{}={}", encode_component(key), encode_component(value))
}

/// `application/x-www-form-urlencoded` with `~` kept and `*` escaped
fn encode_component(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace("%7E", "~")
        .replace('*', "%2A")
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
