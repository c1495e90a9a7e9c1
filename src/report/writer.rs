use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

use crate::error::{CleanerError, CleanerResult};
use crate::types::{Report, ReportSheet, Value};

// Integers beyond this lose precision as an Excel number.
const MAX_EXACT_INTEGER: u64 = 999_999_999_999_999;

/// Write `report` as an `.xlsx` workbook at `path`.
///
/// The workbook is built in memory; `path` is written only after every sheet serialized.
pub fn write_report(report: &Report, path: impl AsRef<Path>) -> CleanerResult<()> {
    let path = path.as_ref();
    let bytes = write_report_to_buffer(report)?;
    fs::write(path, &bytes)?;
    tracing::info!(
        path = %path.display(),
        sheets = report.sheets.len(),
        bytes = bytes.len(),
        "report written"
    );
    Ok(())
}

/// Serialize `report` to `.xlsx` bytes.
///
/// Each sheet gets a bold header row followed by its data rows. Null cells are left empty.
/// Highlighted cells get a yellow fill.
pub fn write_report_to_buffer(report: &Report) -> CleanerResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let highlight = Format::new().set_background_color(Color::Yellow);

    for sheet in &report.sheets {
        let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;
        write_sheet(worksheet, sheet, &header, &highlight)?;
        tracing::debug!(sheet = %sheet.name, rows = sheet.data.row_count(), "sheet serialized");
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &ReportSheet,
    header: &Format,
    highlight: &Format,
) -> CleanerResult<()> {
    for (col, name) in sheet.data.schema.field_names().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, sanitize_text(name), header)?;
    }

    for (i, row) in sheet.data.rows.iter().enumerate() {
        let row32 = row_index(i + 1)?;
        for (col, value) in row.iter().enumerate() {
            let col16 = column_index(col)?;
            let marked = sheet
                .highlight
                .as_ref()
                .is_some_and(|h| h.column == col && h.rows.contains(&i));
            let format = if marked { Some(highlight) } else { None };
            write_value(worksheet, row32, col16, value, format)?;
        }
    }
    Ok(())
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    format: Option<&Format>,
) -> CleanerResult<()> {
    match (value, format) {
        (Value::Null, _) => {}
        (Value::Utf8(s), None) => {
            worksheet.write_string(row, col, sanitize_text(s))?;
        }
        (Value::Utf8(s), Some(f)) => {
            worksheet.write_string_with_format(row, col, sanitize_text(s), f)?;
        }
        (Value::Int64(i), f) if i.unsigned_abs() > MAX_EXACT_INTEGER => {
            let text = i.to_string();
            match f {
                Some(f) => worksheet.write_string_with_format(row, col, &text, f)?,
                None => worksheet.write_string(row, col, &text)?,
            };
        }
        (Value::Int64(i), None) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        (Value::Int64(i), Some(f)) => {
            worksheet.write_number_with_format(row, col, *i as f64, f)?;
        }
        (Value::Float64(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (Value::Float64(n), Some(f)) => {
            worksheet.write_number_with_format(row, col, *n, f)?;
        }
        (Value::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (Value::Bool(b), Some(f)) => {
            worksheet.write_boolean_with_format(row, col, *b, f)?;
        }
    }
    Ok(())
}

/// Remove characters XML 1.0 cannot carry (C0 controls other than tab, LF and CR, plus the
/// U+FFFE/U+FFFF noncharacters).
pub fn sanitize_text(s: &str) -> String {
    s.chars().filter(|&c| is_xml_char(c)).collect()
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

fn row_index(row: usize) -> CleanerResult<u32> {
    u32::try_from(row).map_err(|_| too_large("row", row))
}

fn column_index(col: usize) -> CleanerResult<u16> {
    u16::try_from(col).map_err(|_| too_large("column", col))
}

fn too_large(what: &str, index: usize) -> CleanerError {
    CleanerError::SchemaMismatch {
        message: format!("{what} index {index} does not fit in a worksheet"),
    }
}

#[cfg(test)]
mod tests {
    use super::{sanitize_text, write_report_to_buffer};
    use crate::types::{DataSet, Report, Schema, Value};

    #[test]
    fn strips_xml_illegal_characters() {
        assert_eq!(sanitize_text("a\u{0}b\u{1F}c\td\n"), "abc\td\n");
        assert_eq!(sanitize_text("ทรัพย์สิน\u{FFFE}"), "ทรัพย์สิน");
    }

    #[test]
    fn serializes_a_zip_package() {
        let mut report = Report::default();
        report.push(
            "Correct Data",
            DataSet::new(
                Schema::new(["code", "n"]),
                vec![vec![Value::text("00123"), Value::Int64(7)], vec![Value::Null, Value::Bool(true)]],
            ),
        );
        report.push("Empty", DataSet::empty(Schema::new(["code"])));

        let bytes = write_report_to_buffer(&report).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn invalid_sheet_names_are_rejected() {
        let mut report = Report::default();
        report.push("bad/name", DataSet::empty(Schema::new(["code"])));
        assert!(write_report_to_buffer(&report).is_err());
    }
}
