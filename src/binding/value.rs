//! Structured Values
//!
//! The wire-level representation shared by inbound parameters and outbound
//! output fields: scalars, lists and field-name keyed structs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field carrying the type name of an entity inside a struct value
pub const FIELD_NAME_TYPE: &str = "@type";

/// Field-name keyed struct, also used for whole parameter and response maps
pub type Struct = BTreeMap<String, ParamValue>;

/// A single structured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum ParamValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<ParamValue>),
    Struct(Struct),
}

impl ParamValue {
    pub fn string(value: impl Into<String>) -> Self {
        ParamValue::String(value.into())
    }

    /// Build a struct value from `(field, value)` pairs
    pub fn structure<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ParamValue)>,
    {
        ParamValue::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the value's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "bool",
            ParamValue::Number(_) => "number",
            ParamValue::String(_) => "string",
            ParamValue::List(_) => "list",
            ParamValue::Struct(_) => "struct",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            ParamValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// The `@type` tag of a struct value, if any
    pub fn type_name(&self) -> Option<&str> {
        self.as_struct()
            .and_then(|s| s.get(FIELD_NAME_TYPE))
            .and_then(ParamValue::as_str)
    }

    /// Convert into plain JSON. Whole numbers become JSON integers so that
    /// serde-derived entities with integer fields decode cleanly.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Null => Value::Null,
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null)
                }
            }
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::List(items) => {
                Value::Array(items.iter().map(ParamValue::to_json).collect())
            }
            ParamValue::Struct(fields) => Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => n.as_f64().map(ParamValue::Number).unwrap_or(ParamValue::Null),
            Value::String(s) => ParamValue::String(s),
            Value::Array(items) => {
                ParamValue::List(items.into_iter().map(ParamValue::from).collect())
            }
            Value::Object(fields) => ParamValue::Struct(
                fields.into_iter().map(|(k, v)| (k, ParamValue::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<Struct> for ParamValue {
    fn from(value: Struct) -> Self {
        ParamValue::Struct(value)
    }
}
