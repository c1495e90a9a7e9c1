//! Workbook reading through calamine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::CleanerResult;
use crate::types::{NamedSheet, Value};

use super::grid::dataset_from_grid;
use super::unified::{resolve_sheet_selection, SheetSelection};

/// Read the selected sheets of an Excel document (`.xlsx`, `.xls`, `.ods`, etc.).
///
/// Behavior:
/// - Resolves `selection` against the workbook's sheet names (missing sheets are an error)
/// - Detects the first non-empty row of each sheet as its header row
/// - Keeps cell types: text, integers, floats and booleans; dates become text
pub fn read_excel_sheets(
    path: impl AsRef<Path>,
    selection: &SheetSelection,
) -> CleanerResult<Vec<NamedSheet>> {
    let mut workbook = open_workbook_auto(path)?;
    let available = workbook.sheet_names().to_vec();
    let names = resolve_sheet_selection(selection, &available)?;

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        // the range starts at the first used cell; pad so column indexes are absolute
        let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
        let grid: Vec<Vec<Value>> = range
            .rows()
            .map(|row| {
                std::iter::repeat_n(Value::Null, offset)
                    .chain(row.iter().map(convert_cell))
                    .collect()
            })
            .collect();
        let data = dataset_from_grid(&name, grid)?;
        tracing::debug!(sheet = %name, rows = data.row_count(), "read sheet with calamine");
        sheets.push(NamedSheet { name, data });
    }
    Ok(sheets)
}

/// Workbook sheet names, in workbook order.
pub fn excel_sheet_names(path: impl AsRef<Path>) -> CleanerResult<Vec<String>> {
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names().to_vec())
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::Utf8(dt.to_string()),
        Data::DateTimeIso(s) => Value::Utf8(s.clone()),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(_) | Data::Empty => Value::Null,
    }
}
