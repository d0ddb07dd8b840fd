use serde::{Deserialize, Serialize};
use std::fmt;

/// A quantity as stored on a purchase or usage row.
///
/// Historical rows are not consistently typed: the same column may hold a
/// number, a numeric string, an empty string or nothing at all. `Quantity`
/// keeps the raw shape so callers decide how strictly to interpret it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Quantity {
    /// Numeric value
    Number(f64),
    /// Text value, possibly numeric
    Text(String),
    /// Boolean value
    Boolean(bool),
    /// Null or missing value
    #[default]
    Null,
    /// Arrays and objects, kept verbatim
    Other(serde_json::Value),
}

impl Quantity {
    /// Coerces the value to a number the way a loosely-typed store would.
    ///
    /// Null and blank text become `0.0`, booleans become `1.0`/`0.0`, and
    /// anything that cannot be read as a number becomes `NaN`. The result is
    /// not clamped and may be negative or non-finite.
    pub fn coerce(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => parse_numeric_text(s),
            Self::Boolean(true) => 1.0,
            Self::Boolean(false) | Self::Null => 0.0,
            Self::Other(_) => f64::NAN,
        }
    }

    /// Returns `true` for `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&trimmed[2..], radix);
    }

    // `f64::from_str` also accepts "inf" and "nan" spellings; those are not numbers here.
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Unsigned digits after a `0x`/`0o`/`0b` prefix. Signs are rejected and
/// values past `u64::MAX` stay finite.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d)))
        .unwrap_or(f64::NAN)
}

// -------------------------------------------------------------------------------------------------
// Conversions between `Quantity` and `serde_json::Value`. Serde goes through these so any JSON
// value is accepted in a quantity column.
// -------------------------------------------------------------------------------------------------

impl From<serde_json::Value> for Quantity {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Null => Self::Null,
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::Other(other)
            }
        }
    }
}

impl From<Quantity> for serde_json::Value {
    fn from(value: Quantity) -> Self {
        match value {
            Quantity::Number(f) => serde_json::Number::from_f64(f).map_or(Self::Null, Self::Number),
            Quantity::Text(s) => Self::String(s),
            Quantity::Boolean(b) => Self::Bool(b),
            Quantity::Null => Self::Null,
            Quantity::Other(v) => v,
        }
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Quantity {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Quantity {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Quantity {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Quantity {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}
