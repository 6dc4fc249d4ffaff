//! Scalar values: strings, 64-bit integers, doubles, booleans, and null.

use crate::error::{Error, Result};

/// The declared type of a scalar, as the parser's literal classifier
/// reports it and as [`Value::from_typed_str`] consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// No value present yet.
    None,
    String,
    /// Either integer or double, decided by the literal's shape.
    Number,
    Integer,
    Double,
    Boolean,
    Null,
}

/// A scalar leaf of the document tree.
///
/// `Empty` is the state of a freshly made value node that nothing has been
/// assigned to; it is distinct from `Null`, which is the explicit `null`
/// literal.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// The declared type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Empty => ValueType::None,
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
        }
    }

    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "double",
            Value::String(_) => "string",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// `true` for both integers and doubles.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    fn cast_error(&self, wanted: &str) -> Error {
        Error::WrongType(format!(
            "wrong type: trying to cast the value '{}' which is a '{}' to '{}'",
            self.stringify(),
            self.type_name(),
            wanted
        ))
    }

    /// Borrow the string content, or `WrongType`.
    pub fn try_as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.cast_error("string")),
        }
    }

    /// Copy the string content, or `WrongType`.
    pub fn try_as_string(&self) -> Result<String> {
        self.try_as_str().map(String::from)
    }

    pub fn try_as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            other => Err(other.cast_error("integer")),
        }
    }

    pub fn try_as_double(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(other.cast_error("double")),
        }
    }

    /// Either numeric kind, widened to `f64`.
    pub fn try_as_number(&self) -> Result<f64> {
        match self {
            Value::Integer(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => Err(other.cast_error("number")),
        }
    }

    pub fn try_as_boolean(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.cast_error("boolean")),
        }
    }

    pub fn try_as_null(&self) -> Result<()> {
        match self {
            Value::Null => Ok(()),
            other => Err(other.cast_error("null")),
        }
    }

    /// Panicking form of [`Value::try_as_str`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message if the value is not a string.
    pub fn as_str(&self) -> &str {
        match self.try_as_str() {
            Ok(s) => s,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Value::try_as_integer`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message if the value is not an integer.
    pub fn as_integer(&self) -> i64 {
        match self.try_as_integer() {
            Ok(i) => i,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Value::try_as_double`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message if the value is not a double.
    pub fn as_double(&self) -> f64 {
        match self.try_as_double() {
            Ok(f) => f,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Value::try_as_number`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message if the value is not numeric.
    pub fn as_number(&self) -> f64 {
        match self.try_as_number() {
            Ok(f) => f,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Value::try_as_boolean`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message if the value is not a boolean.
    pub fn as_boolean(&self) -> bool {
        match self.try_as_boolean() {
            Ok(b) => b,
            Err(e) => panic!("{e}"),
        }
    }

    /// Canonical text form of the scalar.
    ///
    /// Strings come back verbatim (no quoting), integers and booleans in
    /// their literal form, null as `null`, and doubles with trailing zeros
    /// trimmed but always at least one fractional digit, so `2.0` stays
    /// `2.0` and `1.50` becomes `1.5`.
    pub fn stringify(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if !f.is_finite() {
                    return f.to_string();
                }
                let text = f.to_string();
                if text.contains('.') || text.contains('e') {
                    text
                } else {
                    format!("{text}.0")
                }
            }
            Value::String(s) => s.clone(),
        }
    }

    /// Convert raw literal text into a value of the declared type.
    ///
    /// `Number` picks integer or double from the presence of a dot. A
    /// literal that does not fit the declared type is a
    /// `ParsingWrongType` error.
    pub fn from_typed_str(raw: &str, kind: ValueType) -> Result<Value> {
        match kind {
            ValueType::None => Ok(Value::Empty),
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Null => Ok(Value::Null),
            ValueType::Boolean => match raw {
                "true" | "on" => Ok(Value::Bool(true)),
                "false" | "off" => Ok(Value::Bool(false)),
                _ => Err(Error::ParsingWrongType(format!(
                    "'{raw}' is not a boolean literal"
                ))),
            },
            ValueType::Integer => raw.parse::<i64>().map(Value::Integer).map_err(|_| {
                Error::ParsingWrongType(format!(
                    "'{raw}' is not a valid 64-bit integer literal"
                ))
            }),
            ValueType::Double => raw.parse::<f64>().map(Value::Float).map_err(|_| {
                Error::ParsingWrongType(format!("'{raw}' is not a valid double literal"))
            }),
            ValueType::Number => {
                if raw.contains('.') {
                    Value::from_typed_str(raw, ValueType::Double)
                } else {
                    Value::from_typed_str(raw, ValueType::Integer)
                }
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stringify())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}
