use std::fmt;

/// A single cell of the frame table.
///
/// [`Value::Missing`] is the explicit "unset" state of a cell: freshly added
/// columns are filled with it, and measurements that could not be computed
/// for a frame leave it behind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Missing,
    Number(f64),
    Text(String),
    Vector([f64; 3]),
}

impl Value {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric content of the cell, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets a raw text field, e.g. a CSV cell: empty fields and the
    /// usual NaN spellings become `Missing`, numbers become `Number`, and
    /// anything else is kept as `Text`.
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        if matches!(
            trimmed.to_ascii_lowercase().as_str(),
            "nan" | "na" | "<na>" | "null" | "none"
        ) {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Value::Number(v),
            Err(_) => Value::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Vector([x, y, z]) => write!(f, "{};{};{}", x, y, z),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Value::Missing, Value::Number)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        s.map_or(Value::Missing, Value::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_field_classifies_cells() {
        assert_eq!(Value::from_field(""), Value::Missing);
        assert_eq!(Value::from_field("  NaN "), Value::Missing);
        assert_eq!(Value::from_field("1.5e-3"), Value::Number(1.5e-3));
        assert_eq!(Value::from_field("-42"), Value::Number(-42.0));
        assert_eq!(Value::from_field("B3LYP"), Value::Text("B3LYP".into()));
    }

    #[test]
    fn display_leaves_missing_empty() {
        assert_eq!(Value::Missing.to_string(), "");
        assert_eq!(Value::Number(90.0).to_string(), "90");
        assert_eq!(Value::Vector([0.0, 1.5, -2.0]).to_string(), "0;1.5;-2");
    }

    #[test]
    fn option_conversions_map_none_to_missing() {
        assert_eq!(Value::from(None::<f64>), Value::Missing);
        assert_eq!(Value::from(Some(2.0)), Value::Number(2.0));
        assert_eq!(Value::from(None::<String>), Value::Missing);
    }
}
