//! Evaluation-time input records
//!
//! A record maps attribute names to integer or text values. An attribute
//! that is not present in the map is absent.

use crate::error::{Result, RuleEngineError};
use crate::rule::LiteralKind;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Attribute value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Value::Integer(_) => LiteralKind::Integer,
            Value::Text(_) => LiteralKind::Text,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Attribute name to value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: AHashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object whose values are integers or strings,
    /// e.g. `{"age": 35, "department": "Sales"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RuleEngineError::InvalidRecord(e.to_string()))
    }

    /// Same as [`Record::from_json`] for an already-parsed JSON value
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| RuleEngineError::InvalidRecord(e.to_string()))
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(attribute.into(), value.into());
        self
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(attribute, value);
        self
    }

    #[inline]
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    pub fn remove(&mut self, attribute: &str) -> Option<Value> {
        self.values.remove(attribute)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
