use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Quotes print the deal worksheet, then validation errors, warnings and
/// methodology. Term searches print the chosen term and, when requested,
/// one row per candidate. Schedules print one row per payment.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_quote(result, map);
            } else if let Some(Value::Array(errors)) = map.get("errors") {
                print_validation(map, errors);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_quote(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    if let Some(Value::Object(calc)) = result.get("calculation") {
        print_flat_object(calc);
    }

    if let Some(Value::Object(optimal)) = result.get("optimal_term") {
        println!("\nTerm search:");
        print_flat_object(optimal);
    }

    if let Some(Value::Object(validation)) = result.get("validation") {
        if let Some(Value::Array(errors)) = validation.get("errors") {
            if !errors.is_empty() {
                println!("\nValidation errors:");
                print_array_table(errors);
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_validation(map: &Map<String, Value>, errors: &[Value]) {
    let summary: Map<String, Value> = map
        .iter()
        .filter(|(k, _)| k.as_str() != "errors")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    print_flat_object(&summary);
    if !errors.is_empty() {
        println!("\nErrors:");
        print_array_table(errors);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.first().map_or(false, Value::is_object) => {
                nested.push((key, arr));
            }
            _ => builder.push_record([key.as_str(), &format_value(val)]),
        }
    }
    println!("{}", Table::from(builder));

    for (key, arr) in nested {
        println!("\n{}:", key);
        print_array_table(arr);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(map) => match (map.get("min"), map.get("max")) {
            // term ranges
            (Some(min), Some(max)) => format!("{}-{} months", format_value(min), format_value(max)),
            _ => serde_json::to_string(value).unwrap_or_default(),
        },
    }
}
