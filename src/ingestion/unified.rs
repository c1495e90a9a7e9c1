//! Unified reading entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which reads the selected sheets of a file and
//! concatenates them into one [`crate::types::DataSet`], or [`read_sheets_from_path`] to keep
//! the sheets apart.
//!
//! - If [`ReadOptions::format`] is `None`, the format is inferred from the file extension.
//! - Excel inputs go through a [`ReaderChain`]: calamine first, then the zip/XML recovery reader.
//! - If an [`super::observability::IngestionObserver`] is provided, success/fallback/failure/alerts
//!   are reported to it.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CleanerError, CleanerResult, ReadAttempt};
use crate::types::{DataSet, NamedSheet};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, excel, json, recovery};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Spreadsheet/workbook formats read through calamine (with xlsx recovery).
    Excel,
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
}

impl InputFormat {
    /// Parse an input format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Excel),
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    pub fn from_path(path: &Path) -> CleanerResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CleanerError::SchemaMismatch {
                message: format!("cannot infer format: path has no extension ({})", path.display()),
            })?;

        Self::from_extension(ext).ok_or_else(|| CleanerError::SchemaMismatch {
            message: format!(
                "cannot infer format from extension '{ext}' for path ({})",
                path.display()
            ),
        })
    }
}

/// How to choose sheet(s) when reading a workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// Read the first sheet (default).
    #[default]
    First,
    /// Read a single named sheet.
    Sheet(String),
    /// Read all sheets.
    AllSheets,
    /// Read only the listed sheets, in order.
    Sheets(Vec<String>),
}

/// Resolve `selection` against the sheet names a workbook actually has.
pub(crate) fn resolve_sheet_selection(
    selection: &SheetSelection,
    available: &[String],
) -> CleanerResult<Vec<String>> {
    if available.is_empty() {
        return Err(CleanerError::SchemaMismatch {
            message: "workbook has no sheets".to_string(),
        });
    }

    let pick = |name: &str| -> CleanerResult<String> {
        if available.iter().any(|s| s == name) {
            Ok(name.to_string())
        } else {
            Err(CleanerError::SheetNotFound {
                sheet: name.to_string(),
                available: available.to_vec(),
            })
        }
    };

    match selection {
        SheetSelection::First => Ok(vec![available[0].clone()]),
        SheetSelection::Sheet(name) => Ok(vec![pick(name)?]),
        SheetSelection::AllSheets => Ok(available.to_vec()),
        SheetSelection::Sheets(names) => names.iter().map(|n| pick(n)).collect(),
    }
}

/// Options controlling unified reading behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ReadOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<InputFormat>,
    /// Which workbook sheets to read. Ignored for CSV/JSON.
    pub sheet_selection: SheetSelection,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("format", &self.format)
            .field("sheet_selection", &self.sheet_selection)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            format: None,
            sheet_selection: SheetSelection::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// One strategy for turning a file into named sheets.
pub trait SheetReader: Send + Sync {
    /// Short name used in logs and aggregated errors.
    fn name(&self) -> &'static str;

    /// Read the selected sheets of `path`.
    fn read(&self, path: &Path, selection: &SheetSelection) -> CleanerResult<Vec<NamedSheet>>;
}

/// High-level workbook reader backed by calamine.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalamineReader;

impl SheetReader for CalamineReader {
    fn name(&self) -> &'static str {
        "calamine"
    }

    fn read(&self, path: &Path, selection: &SheetSelection) -> CleanerResult<Vec<NamedSheet>> {
        excel::read_excel_sheets(path, selection)
    }
}

/// Cell-by-cell recovery reader for xlsx packages.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxPackageReader;

impl SheetReader for XlsxPackageReader {
    fn name(&self) -> &'static str {
        "xlsx-package"
    }

    fn read(&self, path: &Path, selection: &SheetSelection) -> CleanerResult<Vec<NamedSheet>> {
        recovery::read_xlsx_package(path, selection)
    }
}

/// CSV reader. The whole file is one sheet.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReader;

impl SheetReader for CsvReader {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn read(&self, path: &Path, _selection: &SheetSelection) -> CleanerResult<Vec<NamedSheet>> {
        Ok(vec![csv::read_csv_sheet(path)?])
    }
}

/// JSON / NDJSON reader. The whole file is one sheet.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReader;

impl SheetReader for JsonReader {
    fn name(&self) -> &'static str {
        "json"
    }

    fn read(&self, path: &Path, _selection: &SheetSelection) -> CleanerResult<Vec<NamedSheet>> {
        Ok(vec![json::read_json_sheet(path)?])
    }
}

/// Ordered list of reader strategies. The first one that succeeds wins.
///
/// Every failure, a missing sheet included, moves on to the next reader. When every reader
/// fails, the result is:
///
/// - the last [`CleanerError::SheetNotFound`] if every reader reported the sheet missing
/// - the error itself if only one reader ran
/// - otherwise a [`CleanerError::InputRead`] listing each attempt
pub struct ReaderChain {
    readers: Vec<Box<dyn SheetReader>>,
}

impl fmt::Debug for ReaderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.readers.iter().map(|r| r.name()))
            .finish()
    }
}

impl ReaderChain {
    /// Build a chain from explicit readers, tried in order.
    pub fn new(readers: Vec<Box<dyn SheetReader>>) -> Self {
        Self { readers }
    }

    /// Default chain for a format.
    pub fn for_format(format: InputFormat) -> Self {
        match format {
            InputFormat::Excel => Self::new(vec![Box::new(CalamineReader), Box::new(XlsxPackageReader)]),
            InputFormat::Csv => Self::new(vec![Box::new(CsvReader)]),
            InputFormat::Json => Self::new(vec![Box::new(JsonReader)]),
        }
    }

    /// Names of the readers, in order.
    pub fn reader_names(&self) -> Vec<&'static str> {
        self.readers.iter().map(|r| r.name()).collect()
    }

    /// Run the chain.
    pub fn read(&self, path: &Path, selection: &SheetSelection) -> CleanerResult<Vec<NamedSheet>> {
        self.read_with_fallback(path, selection, |_, _| {})
    }

    /// Run the chain, calling `on_fallback` with the reader name and error each time a reader
    /// fails and another one is left to try.
    pub fn read_with_fallback<F>(
        &self,
        path: &Path,
        selection: &SheetSelection,
        mut on_fallback: F,
    ) -> CleanerResult<Vec<NamedSheet>>
    where
        F: FnMut(&str, &CleanerError),
    {
        let mut failures: Vec<(&'static str, CleanerError)> = Vec::new();
        for (i, reader) in self.readers.iter().enumerate() {
            match reader.read(path, selection) {
                Ok(sheets) => {
                    tracing::debug!(reader = reader.name(), sheets = sheets.len(), "reader succeeded");
                    return Ok(sheets);
                }
                Err(e) => {
                    if i + 1 < self.readers.len() {
                        on_fallback(reader.name(), &e);
                    }
                    failures.push((reader.name(), e));
                }
            }
        }

        let all_missing = failures
            .iter()
            .all(|(_, e)| matches!(e, CleanerError::SheetNotFound { .. }));
        if failures.len() == 1 || all_missing {
            if let Some((_, e)) = failures.pop() {
                return Err(e);
            }
        }
        Err(CleanerError::InputRead {
            path: path.to_path_buf(),
            attempts: failures
                .into_iter()
                .map(|(reader, e)| ReadAttempt {
                    reader: reader.to_string(),
                    message: e.to_string(),
                })
                .collect(),
        })
    }
}

/// Read the selected sheets of `path`, each as its own [`NamedSheet`].
///
/// When an observer is configured, this function reports:
///
/// - `on_fallback` whenever a reader strategy fails and the next one is tried
/// - `on_success` on success, with sheet and row count stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use asset_code_cleaner::ingestion::{read_sheets_from_path, ReadOptions, SheetSelection};
///
/// # fn main() -> Result<(), asset_code_cleaner::CleanerError> {
/// let opts = ReadOptions {
///     sheet_selection: SheetSelection::AllSheets,
///     ..Default::default()
/// };
/// for sheet in read_sheets_from_path("inventory.xlsx", &opts)? {
///     println!("{}: {} rows", sheet.name, sheet.data.row_count());
/// }
/// # Ok(())
/// # }
/// ```
pub fn read_sheets_from_path(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> CleanerResult<Vec<NamedSheet>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => InputFormat::from_path(path)?,
    };

    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format,
    };

    let result = fs::metadata(path)
        .map_err(CleanerError::from)
        .and_then(|_| {
            ReaderChain::for_format(format).read_with_fallback(path, &options.sheet_selection, |reader, e| {
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_fallback(&ctx, reader, e);
                }
            })
        });

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(sheets) => obs.on_success(
                &ctx,
                IngestionStats {
                    sheets: sheets.len(),
                    rows: sheets.iter().map(|s| s.data.row_count()).sum(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

/// Read the selected sheets of `path` and concatenate them into one dataset.
///
/// Columns are unioned by name across sheets; cells a sheet does not have are null.
///
/// ```no_run
/// use asset_code_cleaner::ingestion::{ingest_from_path, ReadOptions};
///
/// # fn main() -> Result<(), asset_code_cleaner::CleanerError> {
/// let ds = ingest_from_path("inventory.xlsx", &ReadOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &ReadOptions) -> CleanerResult<DataSet> {
    let sheets = read_sheets_from_path(path, options)?;
    Ok(DataSet::concat(sheets.iter().map(|s| &s.data)))
}

fn severity_for_error(e: &CleanerError) -> IngestionSeverity {
    match e {
        CleanerError::Io(_) => IngestionSeverity::Critical,
        CleanerError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        CleanerError::SheetNotFound { .. } | CleanerError::SchemaMismatch { .. } => {
            IngestionSeverity::Warning
        }
        _ => IngestionSeverity::Error,
    }
}
