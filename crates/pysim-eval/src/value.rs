//! Runtime values held in the interpreter environment.

use std::fmt;

use serde::{Serialize, Serializer};

/// Text a `def` binding renders as.
pub const FUNCTION_MARKER: &str = "function";

/// A value bound to a name in the environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value.
    Str(String),
    /// A numeric value (always f64, like JavaScript).
    Number(f64),
    /// Marker left behind by a `def` line. Function bodies are never captured.
    Function,
}

impl Value {
    /// Coerce this value to the text `print` emits for it.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Function => FUNCTION_MARKER.to_string(),
        }
    }
}

/// Render a number the way JavaScript's `String(n)` does.
///
/// Magnitudes of at least 1e21 or below 1e-6 use exponent form with the
/// shortest round-trip mantissa (`1e+21`, `1.5e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n != 0.0 && (n.abs() >= 1e21 || n.abs() < 1e-6) {
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else if n == n.trunc() && n.abs() < 1e15 {
        // Integer-like numbers without decimal point
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_value())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            // JSON has no NaN/Infinity
            Value::Number(n) => serializer.serialize_str(&format_number(*n)),
            Value::Function => serializer.serialize_str(FUNCTION_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_numbers_have_no_fraction() {
        assert_eq!(Value::Number(5.0).to_string_value(), "5");
        assert_eq!(Value::Number(-12.0).to_string_value(), "-12");
        assert_eq!(Value::Number(-0.0).to_string_value(), "0");
        assert_eq!(Value::Number(1024.0).to_string_value(), "1024");
    }

    #[test]
    fn test_fractional_and_special_numbers() {
        assert_eq!(Value::Number(3.5).to_string_value(), "3.5");
        assert_eq!(Value::Number(0.1 + 0.2).to_string_value(), "0.30000000000000004");
        assert_eq!(Value::Number(f64::NAN).to_string_value(), "NaN");
        assert_eq!(Value::Number(f64::INFINITY).to_string_value(), "Infinity");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string_value(), "-Infinity");
    }

    #[test]
    fn test_exponent_form_at_the_extremes() {
        assert_eq!(format_number(2f64.powf(70.0)), "1.1805916207174113e+21");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1e21), "-1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        // Just inside the plain-decimal range.
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_function_marker() {
        assert_eq!(Value::Function.to_string(), "function");
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&vec![
            Value::from("hi"),
            Value::Number(2.5),
            Value::Number(f64::INFINITY),
            Value::Function,
        ])
        .unwrap();
        assert_eq!(json, r#"["hi",2.5,"Infinity","function"]"#);
    }
}
