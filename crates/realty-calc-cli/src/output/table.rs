use colored::Colorize;
use realty_calc_core::format::{format_percent, format_won, group_thousands};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use super::{flatten_fields, row_set};

const RATIO_SUFFIXES: [&str; 6] = ["ratio", "rate", "ltv", "dti", "ceiling", "limit"];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_field_table(map);
            }
        }
        Value::Array(arr) => print_row_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_field_table(result);

    if let Some((name, rows)) = row_set(result) {
        println!("\n{}:", name);
        print_row_table(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
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

/// Two-column Field/Value table; money shows grouped won, ratios show percent.
fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value", "Display"]);
    for (key, val) in flatten_fields(map) {
        let raw = format_value(&val);
        let display = humanize(&key, &val).unwrap_or_default();
        builder.push_record([key, raw, display]);
    }
    println!("{}", Table::from(builder));
}

fn print_row_table(arr: &[Value]) {
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
                    .map(|h| map.get(h.as_str()).map(round_cell).unwrap_or_default())
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

/// Human rendering for decimal fields, keyed off the field name.
fn humanize(key: &str, value: &Value) -> Option<String> {
    let Value::String(s) = value else {
        return None;
    };
    let amount = Decimal::from_str(s).ok()?;
    let leaf = key.rsplit('.').next().unwrap_or(key);
    if RATIO_SUFFIXES.iter().any(|suffix| leaf.ends_with(suffix)) {
        Some(format_percent(amount))
    } else if amount.abs() >= Decimal::from(10_000) {
        Some(format_won(amount))
    } else {
        None
    }
}

/// Schedule cells are shown to the won.
fn round_cell(value: &Value) -> String {
    match value {
        Value::String(s) => Decimal::from_str(s)
            .map(group_thousands)
            .unwrap_or_else(|_| s.clone()),
        other => format_value(other),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ratios_render_as_percent_and_money_as_won() {
        assert_eq!(
            humanize("dsr_ratio", &json!("0.3694")).as_deref(),
            Some("36.94%")
        );
        assert_eq!(
            humanize("breakdown.acquisition_tax", &json!("5000000")).as_deref(),
            Some("500만원")
        );
        assert_eq!(humanize("score", &json!(85)), None);
    }
}
