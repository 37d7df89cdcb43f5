//! Scalar cell values

use crate::error::ConversionError;
use std::fmt;

/// A scalar value held by a cell or produced while evaluating a formula.
///
/// Every representation can be read as any other through the `as_*`
/// accessors. Reading as text or as a boolean never fails; reading as a
/// number fails with a [`ConversionError`] when the value has no numeric
/// meaning.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "lowercase"))]
pub enum Value {
    /// Floating point number
    Float(f64),
    /// Integer number
    Integer(i64),
    /// Text
    String(String),
    /// Boolean (true/false)
    Boolean(bool),
}

impl Value {
    /// Read the value as a float
    pub fn as_float(&self) -> Result<f64, ConversionError> {
        match self {
            Value::Float(n) => Ok(*n),
            Value::Integer(n) => Ok(*n as f64),
            Value::Boolean(true) => Ok(1.0),
            Value::Boolean(false) => Ok(0.0),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ConversionError::new(s, "float")),
        }
    }

    /// Read the value as an integer
    ///
    /// Floats convert only when they have no fractional part and fit in an
    /// `i64`.
    pub fn as_integer(&self) -> Result<i64, ConversionError> {
        match self {
            Value::Integer(n) => Ok(*n),
            Value::Boolean(b) => Ok(*b as i64),
            Value::Float(n) => float_to_integer(*n).ok_or_else(|| ConversionError::new(self, "integer")),
            Value::String(s) => {
                let trimmed = s.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Ok(n);
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(float_to_integer)
                    .ok_or_else(|| ConversionError::new(s, "integer"))
            }
        }
    }

    /// Read the value as text, using canonical number formatting
    pub fn as_text(&self) -> String {
        match self {
            Value::Float(n) => format_float(*n),
            Value::Integer(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Boolean(true) => "true".to_string(),
            Value::Boolean(false) => "false".to_string(),
        }
    }

    /// Read the value as a boolean
    ///
    /// Zero, NaN, the empty string and the text `false` (any case) are false;
    /// everything else is true.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Float(n) => *n != 0.0 && !n.is_nan(),
            Value::Integer(n) => *n != 0,
            Value::String(s) => {
                let trimmed = s.trim();
                !(trimmed.is_empty() || trimmed.eq_ignore_ascii_case("false"))
            }
        }
    }

    /// Name of the representation, for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Float(_) => "float",
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
        }
    }

    /// Check if the value is numeric (float or integer)
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Float(_) | Value::Integer(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Float(0.0)
    }
}

/// Format a float the way cells display it: integral values print without a
/// fractional part.
fn format_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn float_to_integer(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
