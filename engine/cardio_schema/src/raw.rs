//! Loosely-typed input as it arrives from a form, a JSON body or CLI flags.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors raised while reading raw input, before any schema checks.
#[derive(Debug, Error)]
pub enum RawInputError {
    #[error("input must be a JSON object mapping field names to values")]
    NotAnObject,
    #[error("value for `{key}` must be a scalar, found {kind}")]
    UnsupportedValue { key: String, kind: &'static str },
    #[error("expected `key=value`, found `{0}`")]
    MalformedPair(String),
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single uncoerced value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// Short description of the value's type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Bool(_) => "boolean",
            RawValue::Int(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "text",
        }
    }

    /// Infer a value from command-line text: integers, then floats, then booleans.
    pub fn infer(text: &str) -> RawValue {
        let t = text.trim();
        if let Ok(i) = t.parse::<i64>() {
            RawValue::Int(i)
        } else if let Ok(x) = t.parse::<f64>() {
            RawValue::Float(x)
        } else if t.eq_ignore_ascii_case("true") {
            RawValue::Bool(true)
        } else if t.eq_ignore_ascii_case("false") {
            RawValue::Bool(false)
        } else {
            RawValue::Text(t.to_string())
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::Float(x) => write!(f, "{x}"),
            RawValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Int(i64::from(v))
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// Mapping from raw input key to value. Keys are kept verbatim; matching
/// against the schema happens in validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFields(BTreeMap<String, RawValue>);

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy in every entry of `fallback` whose key is absent here.
    /// Returns the keys that were filled.
    pub fn fill_missing(&mut self, fallback: &RawFields) -> Vec<String> {
        let mut filled = Vec::new();
        for (k, v) in &fallback.0 {
            if !self.0.contains_key(k) {
                self.0.insert(k.clone(), v.clone());
                filled.push(k.clone());
            }
        }
        filled
    }

    /// Overwrite entries with those from `other`.
    pub fn extend(&mut self, other: RawFields) {
        self.0.extend(other.0);
    }

    /// Read a JSON object. `null` values are treated as absent.
    pub fn from_json(value: &JsonValue) -> Result<Self, RawInputError> {
        let obj = value.as_object().ok_or(RawInputError::NotAnObject)?;
        let mut out = RawFields::new();
        for (key, v) in obj {
            let raw = match v {
                JsonValue::Null => continue,
                JsonValue::Bool(b) => RawValue::Bool(*b),
                JsonValue::Number(n) => match n.as_i64() {
                    Some(i) => RawValue::Int(i),
                    None => RawValue::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
                JsonValue::String(s) => RawValue::Text(s.clone()),
                JsonValue::Array(_) => {
                    return Err(RawInputError::UnsupportedValue {
                        key: key.clone(),
                        kind: "array",
                    })
                }
                JsonValue::Object(_) => {
                    return Err(RawInputError::UnsupportedValue {
                        key: key.clone(),
                        kind: "object",
                    })
                }
            };
            out.insert(key.clone(), raw);
        }
        Ok(out)
    }

    pub fn from_json_str(s: &str) -> Result<Self, RawInputError> {
        let value: JsonValue = serde_json::from_str(s)?;
        Self::from_json(&value)
    }

    /// Parse `key=value` pairs such as `--field age=54`.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, RawInputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = RawFields::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| RawInputError::MalformedPair(pair.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(RawInputError::MalformedPair(pair.to_string()));
            }
            out.insert(key, RawValue::infer(value));
        }
        Ok(out)
    }
}

impl FromIterator<(String, RawValue)> for RawFields {
    fn from_iter<T: IntoIterator<Item = (String, RawValue)>>(iter: T) -> Self {
        RawFields(iter.into_iter().collect())
    }
}
