//! Asset comparison: which codes of an original inventory made it into a cleaned workbook.
//!
//! Codes are compared by integer value, so `00123`, `123` and `A-123` all match each other.

use std::collections::HashSet;

use crate::error::{CleanerError, CleanerResult};
use crate::processing::{digits_only, Splitter};
use crate::types::{DataSet, NamedSheet, Report, Schema, Value};

/// Sheet name of the comparison report.
pub const COMPARISON_SHEET: &str = "Comparison";

/// Status of a code present in the cleaned workbook.
pub const MATCH_FOUND: &str = "Found";
/// Status of a code absent from the cleaned workbook.
pub const MATCH_MISSING: &str = "Missing";

/// Column names of the comparison table.
pub const COMPARISON_COLUMNS: [&str; 4] = ["OriginalEntry", "ExtractedAsset", "CleanedAsset", "MatchStatus"];

/// Integer form of a code: its digits with leading zeros removed.
///
/// Returns `None` when `token` has no digits. An all-zero code is `"0"`.
pub fn canonical_integer(token: &str) -> Option<String> {
    let digits = digits_only(token);
    if digits.is_empty() {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
}

/// Canonical codes found in `field` across `sheets`. Sheets without the column are skipped.
pub fn collect_canonical_codes(sheets: &[NamedSheet], field: &str) -> HashSet<String> {
    let mut codes = HashSet::new();
    for sheet in sheets {
        let Some(values) = sheet.data.column(field) else {
            tracing::debug!(sheet = %sheet.name, field, "sheet has no asset column; skipped");
            continue;
        };
        codes.extend(
            values
                .filter(|v| !v.is_blank())
                .filter_map(|v| canonical_integer(&v.render())),
        );
    }
    codes
}

/// One row per code token of every original row, with its match status against `known`.
///
/// Tokens come from splitting the raw `field` cell with `splitter`. A token without digits has
/// an empty `CleanedAsset` and is always missing. A cell with no tokens at all (blank, or only
/// delimiters) still gets one missing row with an empty `ExtractedAsset`.
pub fn compare_codes(
    original: &DataSet,
    field: &str,
    known: &HashSet<String>,
    splitter: &Splitter,
) -> CleanerResult<DataSet> {
    let idx = original
        .schema
        .index_of(field)
        .ok_or_else(|| CleanerError::SchemaMismatch {
            message: format!(
                "missing required column '{field}'. headers={:?}",
                original.schema.fields
            ),
        })?;

    let mut rows = Vec::new();
    for row in &original.rows {
        let raw = row.get(idx).map(Value::render).unwrap_or_default();
        let tokens = splitter.tokens(&raw);
        if tokens.is_empty() {
            let entry = if raw.trim().is_empty() { Value::Null } else { Value::text(raw.as_str()) };
            rows.push(vec![entry, Value::Null, Value::Null, Value::text(MATCH_MISSING)]);
            continue;
        }
        for token in tokens {
            let cleaned = canonical_integer(token);
            let status = match &cleaned {
                Some(code) if known.contains(code) => MATCH_FOUND,
                _ => MATCH_MISSING,
            };
            rows.push(vec![
                Value::text(raw.as_str()),
                Value::text(token),
                cleaned.map_or(Value::Null, Value::Utf8),
                Value::text(status),
            ]);
        }
    }

    let table = DataSet::new(Schema::new(COMPARISON_COLUMNS), rows);
    let found = table.reduce_rows(0usize, |n, row| n + usize::from(row[3].as_str() == Some(MATCH_FOUND)));
    tracing::info!(
        tokens = table.row_count(),
        found,
        missing = table.row_count() - found,
        "comparison finished"
    );
    Ok(table)
}

/// Wrap a comparison table into a one-sheet report.
pub fn comparison_report(table: DataSet) -> Report {
    let mut report = Report::default();
    report.push(COMPARISON_SHEET, table);
    report
}
