//! The asset-code cleaning components.
//!
//! Each component is a pure function (or a small configured value with pure methods) over
//! [`crate::types::Value`]s and [`crate::types::DataSet`]s:
//!
//! - [`normalize_code()`]: digit-only canonical form of a raw code
//! - [`Classifier`]: valid/invalid decision for a raw code
//! - [`Splitter`]: one row per code found in a multi-code cell
//! - [`duplicate_flags()`]: codes occurring more than once
//! - [`DomainSummarizer`]: email-domain frequency table
//!
//! ## Example: classify → split
//!
//! ```rust
//! use asset_code_cleaner::processing::{Classifier, Splitter};
//! use asset_code_cleaner::types::{DataSet, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(["code", "room"]),
//!     vec![
//!         vec![Value::text("111"), Value::text("A")],
//!         vec![Value::text("222, 333 / Notebook"), Value::text("B")],
//!     ],
//! );
//!
//! let classifier = Classifier::new(["Notebook"]);
//! let invalid = ds.filter_rows(|row| classifier.is_invalid(&row[0]));
//! let split = Splitter::default().split_dataset(&invalid, 0);
//!
//! assert_eq!(split.row_count(), 2);
//! assert_eq!(split.rows[1], vec![Value::text("333"), Value::text("B")]);
//! ```

pub mod classify;
pub mod domains;
pub mod duplicates;
pub mod normalize;
pub mod split;

pub use classify::{Classification, Classifier};
pub use domains::DomainSummarizer;
pub use duplicates::{duplicate_flags, mark_duplicates};
pub use normalize::{digits_only, normalize_code};
pub use split::Splitter;
