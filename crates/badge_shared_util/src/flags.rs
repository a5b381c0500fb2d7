use serde_json::Value;

/// Interpret a loosely typed flag coming from a push payload.
///
/// Senders are inconsistent about how they encode booleans, so `true`, `"true"`
/// and anything whose integer value is 1 (`1`, `"1"`, `1.0`) count as set.
pub fn is_true_or_one(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|n| n == 1).unwrap_or_else(|| n.as_f64().map_or(false, |f| f.trunc() == 1.0)),
        Value::String(s) => {
            let s = s.trim();
            s == "true" || leading_integer(s) == Some(1)
        }
        _ => false,
    }
}

/// Parse the leading integer of a string the way lenient number parsers do, ignoring trailing garbage.
fn leading_integer(s: &str) -> Option<i64> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
