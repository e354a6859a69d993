use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten, record_arrays, scalar_text};

/// Render an envelope as a field/value table, one extra table per list of
/// records (forecast points, recommendations, sweep results), then warnings.
pub fn print_table(value: &Value) {
    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Array(items) => print_records("", items),
        Value::Object(_) => {
            let mut rows = Vec::new();
            flatten("", body, &mut rows);
            if !rows.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in &rows {
                    builder.push_record([key.as_str(), val.as_str()]);
                }
                println!("{}", Table::from(builder));
            }

            let mut arrays = Vec::new();
            record_arrays("", body, &mut arrays);
            for (path, items) in arrays {
                println!();
                print_records(&path, items);
            }
        }
        other => println!("{}", scalar_text(other)),
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", scalar_text(w));
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_records(title: &str, items: &[Value]) {
    if items.is_empty() {
        println!("(empty)");
        return;
    }
    if !title.is_empty() {
        println!("{title}:");
    }

    let Some(Value::Object(first)) = items.first() else {
        for item in items {
            println!("{}", scalar_text(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in items {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h.as_str()).map(cell_text).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join("; "),
        other => scalar_text(other),
    }
}
