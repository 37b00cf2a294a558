pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Pretty-printed JSON envelope; the default output.
fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}

/// Flatten nested objects into dotted keys (`breakdown.stamp_tax`).
///
/// Arrays of objects are skipped; callers render those as their own tables.
pub(crate) fn flatten_fields(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut fields = Vec::new();
    flatten_into("", map, &mut fields);
    fields
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            Value::Array(items) if items.iter().any(Value::is_object) => {}
            _ => out.push((name, val.clone())),
        }
    }
}

/// First array-of-objects field in a result (the amortization schedule).
pub(crate) fn row_set(map: &Map<String, Value>) -> Option<(&str, &[Value])> {
    map.iter().find_map(|(key, val)| match val {
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            Some((key.as_str(), items.as_slice()))
        }
        _ => None,
    })
}
