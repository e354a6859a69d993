pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value as display text. Decimals arrive as strings.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// True for a non-empty array whose elements are all objects.
pub(crate) fn is_record_array(value: &Value) -> bool {
    matches!(value, Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object))
}

/// Flatten nested objects into dotted `(key, text)` rows. Arrays of objects
/// are skipped (they are rendered as their own tables); arrays of scalars are
/// joined with `"; "`.
pub(crate) fn flatten(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, val, rows);
            }
        }
        Value::Array(_) if is_record_array(value) => {}
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().map(scalar_text).collect();
            rows.push((prefix.to_string(), joined.join("; ")));
        }
        other => rows.push((prefix.to_string(), scalar_text(other))),
    }
}

/// Collect every array-of-objects under `value`, keyed by dotted path.
pub(crate) fn record_arrays<'a>(
    prefix: &str,
    value: &'a Value,
    out: &mut Vec<(String, &'a [Value])>,
) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                record_arrays(&path, val, out);
            }
        }
        Value::Array(items) if is_record_array(value) => {
            out.push((prefix.to_string(), items.as_slice()))
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_object() {
        let v = json!({
            "health_score": "66.91",
            "scores": { "liquidity_score": "85.57" },
            "actions": ["a", "b"],
            "points": [{ "x": 1 }],
        });
        let mut rows = Vec::new();
        flatten("", &v, &mut rows);
        assert!(rows.contains(&("health_score".to_string(), "66.91".to_string())));
        assert!(rows.contains(&("scores.liquidity_score".to_string(), "85.57".to_string())));
        assert!(rows.contains(&("actions".to_string(), "a; b".to_string())));
        assert!(!rows.iter().any(|(k, _)| k == "points"));
    }

    #[test]
    fn test_record_arrays_found_at_depth() {
        let v = json!({ "forecast": { "forecast": [{ "month": "July 2024" }] } });
        let mut out = Vec::new();
        record_arrays("", &v, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, "forecast.forecast");
    }
}
