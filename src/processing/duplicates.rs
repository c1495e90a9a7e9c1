//! Duplicate detection over canonical asset codes.

use std::collections::HashMap;

use crate::types::{DataSet, Value};

/// Cell value written for duplicated rows.
pub const DUPLICATE_YES: &str = "Yes";
/// Cell value written for unique rows.
pub const DUPLICATE_NO: &str = "No";

/// Per-row flag: `true` if the row's code in `code_idx` occurs at least twice.
///
/// Codes are compared by their rendered text. Blank codes are not special: several rows with
/// an empty code flag each other.
pub fn duplicate_flags(dataset: &DataSet, code_idx: usize) -> Vec<bool> {
    let keys: Vec<String> = dataset
        .rows
        .iter()
        .map(|row| row.get(code_idx).map(Value::render).unwrap_or_default())
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(keys.len());
    for key in &keys {
        *counts.entry(key.as_str()).or_default() += 1;
    }

    keys.iter()
        .map(|key| counts.get(key.as_str()).copied().unwrap_or(0) >= 2)
        .collect()
}

/// Return a copy of `dataset` with a `Yes`/`No` column named `flag_column`.
pub fn mark_duplicates(dataset: &DataSet, flags: &[bool], flag_column: &str) -> DataSet {
    let values = flags
        .iter()
        .map(|&dup| Value::text(if dup { DUPLICATE_YES } else { DUPLICATE_NO }))
        .collect();
    dataset.with_column(flag_column, values)
}
