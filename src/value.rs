use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime value of a field input or a registry variable.
///
/// Values are what the host UI reports for a field and what special fields
/// (login, email verification, "set variables on change") write into the
/// [`VariableRegistry`](crate::variables::VariableRegistry). Rules never look at
/// the variant directly: every operator works on the stringified form produced
/// by [`Value::as_text`] or the numeric coercion of [`Value::as_number`].
/// Lookup and login results arrive as JSON objects and are kept structured.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
}

// NaN equals NaN so that `Eq` stays reflexive
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

// Consistent with `PartialEq`: -0.0 hashes as 0.0, every NaN alike, and
// objects ignore key order
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Number(n) => canonical_bits(*n).hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Text(s) => s.hash(state),
            Value::List(items) => items.hash(state),
            Value::Object(map) => {
                map.len().hash(state);
                for (key, value) in map.iter().sorted_by_key(|(key, _)| *key) {
                    key.hash(state);
                    value.hash(state);
                }
            }
            Value::Null => {}
        }
    }
}

fn canonical_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl Value {
    /// The string a rule compares against.
    ///
    /// `Null` becomes the empty string, integral numbers drop their fraction and
    /// lists are joined with `,` (the way a multi-select reports its choices).
    /// Objects render as compact JSON.
    pub fn as_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::List(items) => items.iter().map(Value::as_text).join(","),
            Value::Object(map) => serde_json::to_string(map).unwrap_or_default(),
        }
    }

    /// Numeric coercion used by the ordering operators. `None` means the value
    /// cannot take part in a numeric comparison.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Bool(_)
            | Value::Null
            | Value::List(_)
            | Value::Object(_)
            | Value::Number(_) => None,
            Value::Text(s) => parse_number(s),
        }
    }

    /// True for `Null`, the empty string, an object without keys and anything
    /// else that stringifies to "".
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Object(map) => map.is_empty(),
            other => other.as_text().is_empty(),
        }
    }
}

/// Parses a comparison operand. Surrounding whitespace is ignored, anything
/// that is not a finite-or-infinite float (including NaN) is rejected.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other.as_text()),
        }
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

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
