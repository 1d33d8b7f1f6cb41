//! Parameter parsing and JSON output.

use quarry_core::{Param, Row, SqlValue};
use serde_json::{Map, Number, Value};

/// Parses a command-line parameter.
///
/// `NULL` is NULL, integers and floats are numbers, `[a,b,c]` is a list
/// parameter of such values, anything else is text. Quote a value with
/// single quotes to force text.
pub fn parse_param(raw: &str) -> Param {
    match raw
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some("") => Param::List(Vec::new()),
        Some(items) => Param::List(items.split(',').map(|i| parse_scalar(i.trim())).collect()),
        None => Param::Scalar(parse_scalar(raw)),
    }
}

fn parse_scalar(raw: &str) -> SqlValue {
    if raw.eq_ignore_ascii_case("null") {
        return SqlValue::Null;
    }
    if let Some(text) = raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return SqlValue::Text(text.to_string());
    }
    if let Ok(n) = raw.parse::<i64>() {
        return SqlValue::Int(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return SqlValue::Float(f);
    }
    SqlValue::Text(raw.to_string())
}

/// Converts a value to JSON. Blobs become upper-case hex strings.
pub fn value_to_json(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Bool(*b),
        SqlValue::Int(n) => Value::Number((*n).into()),
        SqlValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        SqlValue::Text(s) => Value::String(s.clone()),
        SqlValue::Blob(b) => Value::String(b.iter().map(|byte| format!("{byte:02X}")).collect()),
    }
}

/// Converts a row to a JSON object keyed by column.
pub fn row_to_json(row: &Row) -> Value {
    let object: Map<String, Value> = row
        .iter()
        .map(|(column, value)| (column.to_string(), value_to_json(value)))
        .collect();
    Value::Object(object)
}
