//! Lenient boolean ingestion (spec §9 "Loosely-typed boolean fields").
//!
//! `premium`, `straordinaria` and `can_do_straordinaria` arrive from upstream
//! systems as booleans, strings, or integers. This coercion applies only at
//! the ingestion boundary; once a [`crate::task::Task`] or
//! [`crate::task::Cleaner`] exists, its boolean fields are plain `bool`.

use serde::Deserialize;
use serde_json::Value;

/// Accepts `true`, `"true"`/`"1"`/`"yes"` (case- and whitespace-insensitive),
/// and any non-zero integer as true. Everything else, including absence of
/// the field, is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        Value::Number(n) => n.as_i64().map(|i| i != 0).unwrap_or_else(|| {
            n.as_f64().map(|f| f != 0.0).unwrap_or(false)
        }),
        _ => false,
    }
}

/// A `bool` that deserializes leniently via [`coerce_bool`], for use on
/// ingestion-facing structs with `#[serde(deserialize_with = "...")]`.
pub fn deserialize_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_bool(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_true_variants() {
        assert!(coerce_bool(&json!(true)));
        assert!(coerce_bool(&json!("true")));
        assert!(coerce_bool(&json!("TRUE")));
        assert!(coerce_bool(&json!(" yes ")));
        assert!(coerce_bool(&json!("1")));
        assert!(coerce_bool(&json!(1)));
        assert!(coerce_bool(&json!(-3)));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!coerce_bool(&json!(false)));
        assert!(!coerce_bool(&json!("false")));
        assert!(!coerce_bool(&json!("no")));
        assert!(!coerce_bool(&json!(0)));
        assert!(!coerce_bool(&json!(null)));
        assert!(!coerce_bool(&json!("")));
    }
}
