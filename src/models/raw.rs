use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::numeric::{is_present, parse_decimal};

/// A loosely-typed record exactly as the backend returned it.
///
/// Non-object JSON values are accepted and behave like an object with no
/// fields, so a single odd row never fails a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The value under `key` if it is set (not null, not an empty string).
    pub fn present(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| is_present(v))
    }

    /// The first set value among `keys`, in order.
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.present(k))
    }

    /// The first set value among `keys`, parsed as a number; an unparseable
    /// first value does not fall through to later keys.
    pub fn first_number(&self, keys: &[&str]) -> Option<Decimal> {
        self.first_present(keys).and_then(parse_decimal)
    }

    /// The first set value among `keys` rendered as text.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        self.first_present(keys).map(|v| match v {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        })
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}
