//! Reading input files into datasets.
//!
//! Most callers should use [`ingest_from_path`] or [`read_sheets_from_path`] (from [`unified`]),
//! which:
//!
//! - auto-detect the format by file extension (or you can override via [`ReadOptions`])
//! - try each reader strategy of a [`ReaderChain`] until one succeeds
//! - optionally report success/fallback/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`excel`] (calamine)
//! - [`recovery`] (zip + XML, for workbooks calamine rejects)
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod excel;
pub mod grid;
pub mod json;
pub mod observability;
pub mod recovery;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use unified::{
    ingest_from_path, read_sheets_from_path, CalamineReader, CsvReader, InputFormat, JsonReader, ReadOptions,
    ReaderChain, SheetReader, SheetSelection, XlsxPackageReader,
};
