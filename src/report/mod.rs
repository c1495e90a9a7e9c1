//! Report assembly and writing.
//!
//! [`assemble_report`] picks the configured views out of a [`PipelineOutput`], names them and
//! attaches duplicate highlighting; [`write_report`] serializes the result as an `.xlsx`
//! workbook.

mod writer;

use crate::config::PipelineConfig;
use crate::pipeline::PipelineOutput;
use crate::types::{Highlight, Report};

pub use writer::{sanitize_text, write_report, write_report_to_buffer};

/// Build the output report for one run, in the order of `config.views`.
///
/// If `config.highlight` names a sheet, cells of its field whose value occurs more than once
/// within that sheet are marked. A highlight field the sheet does not have is skipped.
pub fn assemble_report(output: &PipelineOutput, config: &PipelineConfig) -> Report {
    let mut report = Report::default();
    for view in &config.views {
        report.push(view.sheet.clone(), output.view(view.kind).clone());
    }

    if let Some(spec) = &config.highlight {
        if let Some(sheet) = report.sheets.iter_mut().find(|s| s.name == spec.sheet) {
            match sheet.data.schema.index_of(&spec.field) {
                Some(column) => {
                    let rows = sheet.data.repeated_value_rows(column);
                    tracing::debug!(sheet = %sheet.name, cells = rows.len(), "highlighting repeated values");
                    sheet.highlight = Some(Highlight { column, rows });
                }
                None => tracing::warn!(
                    sheet = %spec.sheet,
                    field = %spec.field,
                    "highlight field not present in sheet; skipping"
                ),
            }
        }
    }
    report
}
