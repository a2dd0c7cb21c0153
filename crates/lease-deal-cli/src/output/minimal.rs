use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known deal fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    // Quotes nest the deal under result.calculation
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .map(|r| r.get("calculation").unwrap_or(r))
        .unwrap_or(value);

    let priority_keys = [
        "total_payment",
        "term",
        "is_valid",
        "per_payment_amount",
        "base_payment",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Schedules print the per-payment totals, one per line
    if let Value::Array(rows) = result_obj {
        for row in rows {
            if let Some(total) = row.get("total_payment") {
                println!("{}", format_minimal(total));
            }
        }
        return;
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
