//! Turning a raw cell grid into a [`DataSet`].
//!
//! Every reader produces a row-major grid of [`Value`]s and hands it here, so header
//! detection behaves the same whichever reader succeeded:
//!
//! - the first row with any non-blank cell is the header row
//! - blank header cells become `Unnamed: <col>`; repeated names get `.1`, `.2`, ... suffixes
//! - columns with a blank header and no data are dropped
//! - fully blank data rows are skipped; short rows are padded with nulls
//! - a grid without any non-blank cell is an empty table with no columns

use std::collections::HashSet;

use crate::error::CleanerResult;
use crate::types::{DataSet, Schema, Value};

/// Build a dataset from `grid`. `sheet` is only used for logging.
pub fn dataset_from_grid(sheet: &str, grid: Vec<Vec<Value>>) -> CleanerResult<DataSet> {
    let mut rows = grid.into_iter().skip_while(|row| row.iter().all(Value::is_blank));
    let Some(header) = rows.next() else {
        tracing::debug!(sheet, "sheet has no non-empty rows; reading it as an empty table");
        return Ok(DataSet::default());
    };

    let data: Vec<Vec<Value>> = rows
        .filter(|row| !row.iter().all(Value::is_blank))
        .collect();

    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let keep: Vec<usize> = (0..width)
        .filter(|&col| {
            let named = header.get(col).is_some_and(|h| !h.is_blank());
            named || data.iter().any(|row| row.get(col).is_some_and(|v| !v.is_blank()))
        })
        .collect();

    let names = header_names(keep.iter().map(|&col| (col, header.get(col).unwrap_or(&Value::Null))));
    let rows = data
        .into_iter()
        .map(|row| {
            keep.iter()
                .map(|&col| row.get(col).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(DataSet::new(Schema::new(names), rows))
}

fn header_names<'a>(cells: impl Iterator<Item = (usize, &'a Value)>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();
    for (col, cell) in cells {
        let base = if cell.is_blank() {
            format!("Unnamed: {col}")
        } else {
            cell.render().trim().to_string()
        };

        let mut name = base.clone();
        let mut n = 1;
        while !seen.insert(name.clone()) {
            name = format!("{base}.{n}");
            n += 1;
        }
        names.push(name);
    }
    names
}
