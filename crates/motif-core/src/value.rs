//! Dynamically typed values carried by properties, arguments and results

use crate::errors::{CompositionError, CompositionResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A datum exchanged with capabilities.
///
/// Serializes untagged, so `Value::Int(4)` is plain `4` in JSON or TOML and
/// `Value::Unit` is `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value
    #[default]
    Unit,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Ordered list of values
    List(Vec<Value>),
}

impl Value {
    /// Borrow the text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer view of the value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of the value, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Boolean view of the value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the elements, if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is the unit value
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// Short name of the variant, used in argument errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(text) => write!(f, "{text}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = CompositionError;

    fn try_from(json: serde_json::Value) -> CompositionResult<Self> {
        match json {
            serde_json::Value::Null => Ok(Value::Unit),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(n) => Ok(Value::Int(n)),
                None => number.as_f64().map(Value::Float).ok_or_else(|| {
                    CompositionError::config(format!("number {number} is not representable"))
                }),
            },
            serde_json::Value::String(text) => Ok(Value::Text(text)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<CompositionResult<Vec<_>>>()
                .map(Value::List),
            serde_json::Value::Object(_) => Err(CompositionError::config(
                "nested tables cannot be used as capability values",
            )),
        }
    }
}

impl TryFrom<toml::Value> for Value {
    type Error = CompositionError;

    fn try_from(item: toml::Value) -> CompositionResult<Self> {
        match item {
            toml::Value::Boolean(b) => Ok(Value::Bool(b)),
            toml::Value::Integer(n) => Ok(Value::Int(n)),
            toml::Value::Float(x) => Ok(Value::Float(x)),
            toml::Value::String(text) => Ok(Value::Text(text)),
            toml::Value::Datetime(datetime) => Ok(Value::Text(datetime.to_string())),
            toml::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<CompositionResult<Vec<_>>>()
                .map(Value::List),
            toml::Value::Table(_) => Err(CompositionError::config(
                "nested tables cannot be used as capability values",
            )),
        }
    }
}
