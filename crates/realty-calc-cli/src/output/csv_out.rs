use serde_json::{Map, Value};
use std::io;

use super::{flatten_fields, row_set};

/// Write output as CSV to stdout.
///
/// A result carrying rows (the amortization schedule) is written as those
/// rows; anything else becomes `field,value` pairs with dotted keys.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let target = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            match row_set(target) {
                Some((_, rows)) => write_rows(&mut wtr, rows),
                None => write_fields(&mut wtr, target),
            }
        }
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in flatten_fields(map) {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(&val)]);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr
            .iter()
            .map(format_csv_value)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        let map = value.as_object().unwrap();
        match row_set(map) {
            Some((_, rows)) => write_rows(&mut wtr, rows),
            None => write_fields(&mut wtr, map),
        }
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn schedule_rows_become_csv_rows() {
        let out = render(&json!({
            "summary": { "months": 2 },
            "schedule": [
                { "month": 1, "balance": "50" },
                { "month": 2, "balance": "0" }
            ]
        }));
        assert_eq!(out, "balance,month\n50,1\n0,2\n");
    }

    #[test]
    fn fields_are_flattened() {
        let out = render(&json!({ "score": 85, "unmet_requirements": [] }));
        assert_eq!(out, "field,value\nscore,85\nunmet_requirements,\n");
    }
}
