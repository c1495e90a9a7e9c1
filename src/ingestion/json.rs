//! JSON reading.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Columns are the union of the object keys. Nested objects and arrays are kept as
//! their JSON text.

use std::fs;
use std::path::Path;

use crate::error::{CleanerError, CleanerResult};
use crate::types::{DataSet, NamedSheet, Schema, Value};

use super::csv::sheet_name_from_path;

/// Read a JSON file as a single sheet named after the file stem.
pub fn read_json_sheet(path: impl AsRef<Path>) -> CleanerResult<NamedSheet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    Ok(NamedSheet {
        name: sheet_name_from_path(path),
        data: read_json_from_str(&text)?,
    })
}

/// Read JSON from an in-memory string into a [`DataSet`].
pub fn read_json_from_str(input: &str) -> CleanerResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CleanerError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => json_values_to_dataset(&items),
            serde_json::Value::Object(_) => json_values_to_dataset(std::slice::from_ref(&v)),
            _ => Err(CleanerError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                CleanerError::SchemaMismatch {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            values.push(v);
        }
        json_values_to_dataset(&values)
    }
}

fn json_values_to_dataset(values: &[serde_json::Value]) -> CleanerResult<DataSet> {
    let mut objects = Vec::with_capacity(values.len());
    for (idx0, v) in values.iter().enumerate() {
        let obj = v.as_object().ok_or_else(|| CleanerError::SchemaMismatch {
            message: format!("row {} is not a json object", idx0 + 1),
        })?;
        objects.push(obj);
    }

    let mut fields: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !fields.contains(key) {
                fields.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|obj| {
            fields
                .iter()
                .map(|f| obj.get(f).map(convert_json_value).unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Ok(DataSet::new(Schema::new(fields), rows))
}

fn convert_json_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::read_json_from_str;
    use crate::types::{Schema, Value};

    #[test]
    fn array_of_objects_unions_keys() {
        let ds = read_json_from_str(r#"[{"code":"111","n":1},{"code":"222","email":"a@x.com"}]"#).unwrap();
        assert_eq!(ds.schema, Schema::new(["code", "n", "email"]));
        assert_eq!(ds.rows[0][1], Value::Int64(1));
        assert_eq!(ds.rows[1][1], Value::Null);
        assert_eq!(ds.rows[1][2], Value::text("a@x.com"));
    }

    #[test]
    fn ndjson_is_accepted() {
        let ds = read_json_from_str("{\"code\":\"1\"}\n\n{\"code\":null}\n").unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[1][0], Value::Null);
    }

    #[test]
    fn non_object_rows_are_rejected() {
        let err = read_json_from_str("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("row 1 is not a json object"));
    }
}
