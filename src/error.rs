use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type used across the crate.
pub type CleanerResult<T> = Result<T, CleanerError>;

/// One failed attempt of a reader strategy, kept so every failure can be reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAttempt {
    /// Name of the reader strategy.
    pub reader: String,
    /// Rendered error message.
    pub message: String,
}

impl fmt::Display for ReadAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reader, self.message)
    }
}

/// Error type returned by reading, cleaning and report writing.
#[derive(Debug, Error)]
pub enum CleanerError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook could not be parsed by calamine.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The xlsx package could not be opened as a zip archive.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Worksheet XML could not be parsed.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV input error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON input or JSON configuration error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration error.
    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The report workbook could not be written.
    #[error("xlsx write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// A requested sheet does not exist in the workbook.
    #[error("sheet '{sheet}' not found. sheets={available:?}")]
    SheetNotFound { sheet: String, available: Vec<String> },

    /// The input does not have a column the pipeline needs.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The pipeline configuration is not usable.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// Every reader strategy failed for an input file.
    #[error("could not read '{}': {}", .path.display(), join_attempts(.attempts))]
    InputRead {
        path: PathBuf,
        attempts: Vec<ReadAttempt>,
    },
}

fn join_attempts(attempts: &[ReadAttempt]) -> String {
    attempts
        .iter()
        .map(ReadAttempt::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
