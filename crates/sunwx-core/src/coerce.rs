//! Null-safe coercion of upstream leaves into numbers and strings

use crate::types::Scalar;

/// Finite numeric interpretation of a value, if it has one.
///
/// Numbers pass through; text is trimmed and parsed. `NaN` and infinities
/// are rejected whichever form they arrive in.
pub fn number(value: Option<&Scalar>) -> Option<f64> {
    let parsed = match value? {
        Scalar::Number(n) => Some(*n),
        Scalar::Text(text) => text.trim().parse::<f64>().ok(),
        Scalar::Other(_) => None,
    };
    parsed.filter(|n| n.is_finite())
}

pub fn coerce_number(value: Option<&Scalar>, fallback: f64) -> f64 {
    number(value).unwrap_or(fallback)
}

/// Text that is non-empty after trimming, returned untrimmed
pub fn text(value: Option<&Scalar>) -> Option<&str> {
    match value? {
        Scalar::Text(text) if !text.trim().is_empty() => Some(text.as_str()),
        _ => None,
    }
}

pub fn coerce_string(value: Option<&Scalar>, fallback: &str) -> String {
    text(value).unwrap_or(fallback).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some(&"abc".into()), 5.0), 5.0);
        assert_eq!(coerce_number(Some(&"12.5".into()), 5.0), 12.5);
        assert_eq!(coerce_number(Some(&" 7 ".into()), 5.0), 7.0);
        assert_eq!(coerce_number(Some(&Scalar::Number(-3.0)), 5.0), -3.0);
        assert_eq!(coerce_number(None, 5.0), 5.0);
    }

    #[test]
    fn test_coerce_number_rejects_non_finite() {
        assert_eq!(coerce_number(Some(&"NaN".into()), 1.0), 1.0);
        assert_eq!(coerce_number(Some(&"Infinity".into()), 1.0), 1.0);
        assert_eq!(coerce_number(Some(&"-inf".into()), 1.0), 1.0);
        assert_eq!(coerce_number(Some(&Scalar::Number(f64::NAN)), 1.0), 1.0);
        assert_eq!(coerce_number(Some(&"".into()), 1.0), 1.0);
        assert_eq!(
            coerce_number(Some(&Scalar::Other(serde_json::json!(true))), 1.0),
            1.0
        );
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(coerce_string(Some(&"".into()), "x"), "x");
        assert_eq!(coerce_string(Some(&"  ".into()), "x"), "x");
        assert_eq!(coerce_string(Some(&" SN-1 ".into()), "x"), " SN-1 ");
        assert_eq!(coerce_string(Some(&Scalar::Number(42.0)), "x"), "x");
        assert_eq!(coerce_string(None, "x"), "x");
    }
}
