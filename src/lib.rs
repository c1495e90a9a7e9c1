//! `asset-code-cleaner` cleans the asset-code column of a fixed-asset inventory workbook and
//! writes a multi-sheet `.xlsx` report.
//!
//! A raw code cell is either valid (only digits, not all zeros, no junk words) or invalid.
//! Valid codes are cleansed to their digits; invalid cells are split on a delimiter class into
//! one row per extracted code. The merged rows are checked for duplicated codes, filtered by
//! responsible unit and, optionally, summarized by creator email domain.
//!
//! ## Pipeline
//!
//! - [`ingestion::ingest_from_path`]: read one or more sheets of an Excel/CSV/JSON file into a
//!   [`types::DataSet`]. Excel inputs fall back to a low-level xlsx reader when calamine fails.
//! - [`pipeline::Pipeline::run`]: classify → split → merge → dedupe → filter → summarize.
//! - [`report::assemble_report`] + [`report::write_report`]: name the configured views and write
//!   them as sheets.
//! - [`compare`]: check which original codes appear in a cleaned workbook.
//!
//! ## Quick example
//!
//! ```no_run
//! use asset_code_cleaner::config::PipelineConfig;
//! use asset_code_cleaner::ingestion::{ingest_from_path, ReadOptions};
//! use asset_code_cleaner::pipeline::Pipeline;
//! use asset_code_cleaner::report::{assemble_report, write_report};
//!
//! # fn main() -> Result<(), asset_code_cleaner::CleanerError> {
//! let config = PipelineConfig::duplicate_audit();
//! let input = ingest_from_path("inventory.xlsx", &ReadOptions::default())?;
//! let output = Pipeline::new(config.clone())?.run(&input)?;
//! write_report(&assemble_report(&output, &config), "cleaned_data.xlsx")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: values, schemas, datasets and reports
//! - [`processing`]: the cleaning components (normalize, classify, split, duplicates, domains)
//! - [`pipeline`]: the staged cleaning run with progress events
//! - [`ingestion`]: file readers and the reader chain
//! - [`report`]: report assembly and xlsx writing
//! - [`compare`]: original vs. cleaned code matching
//! - [`config`]: pipeline configuration and presets
//! - [`error`]: the crate error type

pub mod compare;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod types;

pub use error::{CleanerError, CleanerResult};
