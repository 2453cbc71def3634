use serde_json::Value;

/// Key answer of each calculator, most specific first.
const PRIORITY_KEYS: [&str; 10] = [
    "max_purchase_price",
    "max_offer_price",
    "required_units",
    "years_to_target",
    "best_overall",
    "profit",
    "cashflow_per_unit",
    "total_down_payment",
    "net_operating_income",
    "rating",
];

/// Print just the key answer value from the output.
///
/// Looks through the result envelope, then its `summary` section, for the
/// first well-known field; falls back to the first field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let summary = result_obj.get("summary");

    for scope in [Some(result_obj), summary].into_iter().flatten() {
        if let Some(found) = first_priority(scope) {
            println!("{}", format_minimal(found));
            return;
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn first_priority(scope: &Value) -> Option<&Value> {
    let map = scope.as_object()?;
    PRIORITY_KEYS
        .iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
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
