use serde_json::{Map, Value};

/// Headline figure of each calculator, in lookup order.
const PRIORITY_KEYS: [&str; 8] = [
    "total_cost",
    "max_loan_amount",
    "dsr_ratio",
    "score",
    "summary.monthly_payment",
    "ltv",
    "monthly_payment",
    "year",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority (dotted keys
/// reach into nested objects), then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(val) = PRIORITY_KEYS
            .iter()
            .filter_map(|key| lookup(map, key))
            .find(|val| !val.is_null())
        {
            println!("{}", format_minimal(val));
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn lookup<'a>(map: &'a Map<String, Value>, dotted: &str) -> Option<&'a Value> {
    let mut parts = dotted.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_summary_is_reachable() {
        let value = json!({ "summary": { "monthly_payment": "1347134.06" } });
        let map = value.as_object().unwrap();
        assert_eq!(
            lookup(map, "summary.monthly_payment"),
            Some(&json!("1347134.06"))
        );
        assert_eq!(lookup(map, "summary.months"), None);
    }
}
