use serde_json::Value;

use super::scalar_text;

/// Headline fields, most specific first. The first one present in the
/// result is printed on its own.
const HEADLINE_KEYS: [&str; 14] = [
    "health_score",
    "credit_readiness_score",
    "compliance_score",
    "readiness_score",
    "total_tax",
    "optimal_value",
    "best_scenario",
    "sensitivity_coefficient",
    "optimal_working_capital",
    "average_projected_cf",
    "overall_performance",
    "scenario_name",
    "valid_deductions",
    "current_ratio",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            for key in HEADLINE_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    println!("{}", scalar_text(val));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, scalar_text(val));
            }
        }
        Value::Array(items) => println!("{}", items.len()),
        other => println!("{}", scalar_text(other)),
    }
}
