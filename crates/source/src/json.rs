//! Structured-record sources: a JSON array of flat objects.

use crate::RecordSet;
use crate::error::SourceError;
use serde_json::Value;
use slagen_types::Record;

/// Reads a top-level array of objects. Field order follows first appearance
/// across all entries.
pub fn read_json(text: &str) -> Result<RecordSet, SourceError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(entries) = value else {
        return Err(SourceError::Malformed {
            line: 1,
            message: "expected a top-level array of objects".to_string(),
        });
    };

    let mut fields: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(map) = entry else {
            return Err(SourceError::Malformed {
                line: 1,
                message: format!("entry {} is not an object", index + 1),
            });
        };

        let mut record = Record::new();
        for (name, value) in map {
            if !fields.contains(&name) {
                fields.push(name.clone());
            }
            record.insert(name, value_to_text(value));
        }
        records.push(record);
    }

    Ok(RecordSet { fields, records })
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
