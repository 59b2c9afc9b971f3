use std::collections::BTreeMap;

use serde_json::Value;

/// Flat, render-ready row: column key to cell text.
pub type DisplayRow = BTreeMap<String, String>;

/// One table row after the per-entity mapping has flattened the raw API
/// record. The raw value is kept for the detail and edit views.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub id: Option<String>,
    pub fields: DisplayRow,
    pub raw: Value,
}

pub type RowMapper = fn(&Value) -> RecordRow;

/// Render a JSON scalar as cell text. Objects and arrays render empty so a
/// forgotten nested field shows up as a blank cell rather than JSON noise.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Object(_) | Value::Array(_) => String::new(),
    }
}

pub fn field(record: &Value, key: &str) -> String {
    record.get(key).map(cell_text).unwrap_or_default()
}

/// First non-empty value among several possible source keys. List payloads
/// from different endpoints name the same concept differently, so display
/// fields coalesce over the known spellings.
pub fn coalesce(record: &Value, keys: &[&str]) -> String {
    for key in keys {
        let text = field(record, key);
        if !text.trim().is_empty() {
            return text;
        }
    }
    String::new()
}

/// Dotted-path lookup for nested payloads, e.g. `campaign.name`.
pub fn nested_field(record: &Value, path: &str) -> String {
    let mut current = record;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }
    cell_text(current)
}

pub fn record_id(record: &Value) -> Option<String> {
    for key in ["id", "_id", "lead_id"] {
        if let Some(value) = record.get(key) {
            let text = cell_text(value);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}
