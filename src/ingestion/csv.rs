//! CSV reading.

use std::path::Path;

use crate::error::CleanerResult;
use crate::types::{DataSet, NamedSheet, Value};

use super::grid::dataset_from_grid;

/// Read a CSV file as a single sheet named after the file stem.
///
/// Rules:
///
/// - The first non-empty record is the header row.
/// - Records may have different lengths; short ones are padded with nulls.
/// - Every non-empty value is kept as text (asset codes must not lose leading zeros).
pub fn read_csv_sheet(path: impl AsRef<Path>) -> CleanerResult<NamedSheet> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let name = sheet_name_from_path(path);
    let data = read_csv_from_reader(&mut rdr, &name)?;
    Ok(NamedSheet { name, data })
}

/// Read CSV data from an existing CSV reader. The reader should not consume headers itself.
pub fn read_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    sheet: &str,
) -> CleanerResult<DataSet> {
    let mut grid: Vec<Vec<Value>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        grid.push(
            record
                .iter()
                .map(|raw| {
                    if raw.trim().is_empty() {
                        Value::Null
                    } else {
                        Value::Utf8(raw.to_string())
                    }
                })
                .collect(),
        );
    }
    dataset_from_grid(sheet, grid)
}

pub(crate) fn sheet_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Sheet1".to_string())
}
