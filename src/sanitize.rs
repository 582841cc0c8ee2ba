use serde_json::Value;

/// Converts a possibly-missing reading into a well-defined float, falling back to `0.0`.
///
/// Every pollutant value passes through here before it is displayed, written
/// to a report or classified, so downstream code never has to null-check.
pub fn sanitize(value: Option<f64>) -> f64 {
    sanitize_or(value, 0.0)
}

/// Like [`sanitize`], but with an explicit fallback.
///
/// Total: `None` and NaN both map to `default`, everything else passes through
/// unchanged (including `-0.0` and infinities).
pub fn sanitize_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => default,
    }
}

/// Sanitizes a raw JSON payload value.
///
/// Numbers pass through (NaN-encoded values fall back), numeric strings are
/// parsed, and anything else (null, objects, arrays, non-numeric strings)
/// yields `default`.
pub fn sanitize_json(value: &Value, default: f64) -> f64 {
    sanitize_or(json_number(value), default)
}

/// Extracts a numeric value from a raw JSON payload value, if there is one.
///
/// Providers sometimes encode readings as strings; a value that is neither a
/// number nor a numeric string counts as absent.
pub fn json_number(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (!v.is_nan()).then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_value_falls_back() {
        assert_eq!(sanitize(None), 0.0);
        assert_eq!(sanitize_or(None, 7.5), 7.5);
    }

    #[test]
    fn nan_falls_back() {
        assert_eq!(sanitize(Some(f64::NAN)), 0.0);
        assert_eq!(sanitize_or(Some(f64::NAN), -1.0), -1.0);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(sanitize(Some(42.0)), 42.0);
        assert_eq!(sanitize(Some(-0.0)), -0.0);
        assert!(sanitize(Some(-0.0)).is_sign_negative());
        assert_eq!(sanitize(Some(f64::INFINITY)), f64::INFINITY);
    }

    #[test]
    fn json_numbers_and_numeric_strings() {
        assert_eq!(sanitize_json(&json!(42), 0.0), 42.0);
        assert_eq!(sanitize_json(&json!(12.5), 0.0), 12.5);
        assert_eq!(sanitize_json(&json!("42"), 0.0), 42.0);
        assert_eq!(sanitize_json(&json!(" 3.5 "), 0.0), 3.5);
    }

    #[test]
    fn json_garbage_falls_back() {
        assert_eq!(sanitize_json(&json!("abc"), 0.0), 0.0);
        assert_eq!(sanitize_json(&json!(null), 0.0), 0.0);
        assert_eq!(sanitize_json(&json!({"v": 1}), 0.0), 0.0);
        assert_eq!(sanitize_json(&json!([1.0]), 9.0), 9.0);
    }
}
