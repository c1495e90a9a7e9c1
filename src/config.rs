//! Pipeline configuration.
//!
//! Every behavior that differed between the historical variants of this tool (field names,
//! authority targets, junk tokens, which sheets get written, whether duplicates stay in the
//! "Correct Data" sheet) is a field of [`PipelineConfig`]. Two presets reproduce the known
//! variants: [`PipelineConfig::split_audit`] and [`PipelineConfig::duplicate_audit`].
//!
//! Configs load from TOML or JSON:
//!
//! ```toml
//! asset_field = "Asset Code"
//! authority_field = "Owner"
//! authority_targets = ["Head Office"]
//! authority_base = "correct"
//! exclude_duplicates_from_correct = true
//!
//! [[views]]
//! kind = "correct"
//! sheet = "Correct Data"
//!
//! [[views]]
//! kind = "duplicate_or_invalid"
//! sheet = "Duplicate & Wrong Data"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CleanerError, CleanerResult};

/// Asset-code column used by the inventory workbooks.
pub const DEFAULT_ASSET_FIELD: &str = "รหัสทรัพย์สิน";
/// Central-authority column used by the inventory workbooks.
pub const DEFAULT_AUTHORITY_FIELD: &str = "หน่วยงานกลางดูแลทรัพย์สิน";
/// Column holding the document creator's email.
pub const DEFAULT_EMAIL_FIELD: &str = "อีเมลผู้สร้างเอกสาร";
/// Domain counted for rows without a creator email.
pub const DEFAULT_EMAIL_DOMAIN: &str = "cpall.co.th";

/// Excel's limit on sheet name length.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Known non-code strings seen in the asset-code column.
pub const DEFAULT_JUNK_TOKENS: &[&str] = &[
    "รหัสทรัพย์สิน",
    "ไม่มี",
    "Computer",
    "Notebook",
    "ไม่มีรหัสทรัพย์สิน",
    "แทบเล็ต",
    "รายละเอียด",
    "nan",
    "-",
    "์Notebook",
    "ทบ. 5589338",
    "ทบ. 5589339 (รูปเครื่อง)",
];

/// Authority values kept in the filtered sheet.
pub const DEFAULT_AUTHORITY_TARGETS: &[&str] = &[
    "ทรัพย์สินองค์กร พื้นที่ธาราพาร์ค",
    "ทรัพย์สินองค์กร พื้นที่สีลม/สาทร",
];

/// Characters that separate codes inside a multi-code cell. `' '` stands for any whitespace.
pub const DEFAULT_DELIMITERS: &[char] = &[' ', ',', '/', '\\', '*'];

/// Which derived table a report sheet shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportView {
    /// Rows whose raw code was already valid, with the code cleansed.
    ValidRows,
    /// Rows whose raw code was invalid, unmodified.
    InvalidRows,
    /// Rows produced by splitting invalid cells.
    SplitRows,
    /// Valid rows followed by split rows, with the duplicate flag column.
    MergedRows,
    /// Merged rows with a valid canonical code (and no duplicates, if so configured).
    Correct,
    /// Rows of the configured [`AuthorityBase`] whose authority field equals one of the targets.
    AuthorityFiltered,
    /// Merged rows that are duplicated or whose canonical code is still invalid.
    DuplicateOrInvalid,
    /// Email domain frequency table over the correct rows.
    DomainSummary,
}

/// Which rows the authority filter selects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityBase {
    /// Every merged row, including rows whose code is still invalid.
    Merged,
    /// Only the rows of the "correct" view.
    Correct,
}

/// A report sheet: which view, under which name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSpec {
    /// View to render.
    pub kind: ReportView,
    /// Sheet name in the output workbook.
    pub sheet: String,
}

impl ViewSpec {
    /// Create a view spec.
    pub fn new(kind: ReportView, sheet: impl Into<String>) -> Self {
        Self {
            kind,
            sheet: sheet.into(),
        }
    }
}

/// Highlight cells of one column whose value repeats within one output sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpec {
    /// Output sheet to highlight in.
    pub sheet: String,
    /// Column whose repeated values are highlighted.
    pub field: String,
}

/// Configuration for one cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column holding the raw asset code. Required in the input.
    pub asset_field: String,
    /// Column naming the responsible organizational unit.
    pub authority_field: String,
    /// Authority values kept by the filtered view (exact string equality).
    pub authority_targets: Vec<String>,
    /// Rows the authority filter selects from.
    pub authority_base: AuthorityBase,
    /// Substrings that mark an asset-code cell as junk.
    pub junk_tokens: Vec<String>,
    /// Characters that separate codes inside one cell.
    pub delimiters: Vec<char>,
    /// Column holding an email address for the domain summary.
    pub email_field: Option<String>,
    /// Domain counted when the email cell is blank.
    pub default_domain: String,
    /// Name of the Yes/No column added to merged rows.
    pub duplicate_column: String,
    /// Drop duplicated codes from the "correct" view.
    pub exclude_duplicates_from_correct: bool,
    /// Output sheets, in write order.
    pub views: Vec<ViewSpec>,
    /// Optional sheet-local duplicate highlighting. Off unless set explicitly.
    #[serde(default)]
    pub highlight: Option<HighlightSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::duplicate_audit()
    }
}

impl PipelineConfig {
    /// Preset writing every intermediate table: valid, invalid, split, merged and the
    /// authority-filtered rows.
    pub fn split_audit() -> Self {
        Self {
            asset_field: DEFAULT_ASSET_FIELD.to_string(),
            authority_field: DEFAULT_AUTHORITY_FIELD.to_string(),
            authority_targets: DEFAULT_AUTHORITY_TARGETS.iter().map(|s| s.to_string()).collect(),
            authority_base: AuthorityBase::Merged,
            junk_tokens: DEFAULT_JUNK_TOKENS.iter().map(|s| s.to_string()).collect(),
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            email_field: None,
            default_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            duplicate_column: "Duplicate".to_string(),
            exclude_duplicates_from_correct: false,
            views: vec![
                ViewSpec::new(ReportView::ValidRows, "Correct Data"),
                ViewSpec::new(ReportView::InvalidRows, "Incorrect Data"),
                ViewSpec::new(ReportView::SplitRows, "Result of Split"),
                ViewSpec::new(ReportView::MergedRows, "Merged Data"),
                ViewSpec::new(ReportView::AuthorityFiltered, "Tara-Silom"),
            ],
            highlight: None,
        }
    }

    /// Preset writing the cleaned rows, the authority-filtered rows, the duplicate/invalid
    /// rows and the creator-email domain summary, with repeated codes highlighted.
    pub fn duplicate_audit() -> Self {
        Self {
            email_field: Some(DEFAULT_EMAIL_FIELD.to_string()),
            authority_base: AuthorityBase::Correct,
            exclude_duplicates_from_correct: true,
            views: vec![
                ViewSpec::new(ReportView::Correct, "Correct Data"),
                ViewSpec::new(ReportView::AuthorityFiltered, "Tara-Silom"),
                ViewSpec::new(ReportView::DuplicateOrInvalid, "Duplicate & Wrong Data"),
                ViewSpec::new(ReportView::DomainSummary, "Company Email"),
            ],
            highlight: Some(HighlightSpec {
                sheet: "Duplicate & Wrong Data".to_string(),
                field: DEFAULT_ASSET_FIELD.to_string(),
            }),
            ..Self::split_audit()
        }
    }

    /// Load a config from a `.toml` or `.json` file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> CleanerResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match ext.as_deref() {
            Some("toml") => toml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            _ => {
                return Err(CleanerError::InvalidConfig {
                    message: format!(
                        "cannot infer config format from path ({}); use .toml or .json",
                        path.display()
                    ),
                });
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values the pipeline cannot work with.
    pub fn validate(&self) -> CleanerResult<()> {
        if self.asset_field.trim().is_empty() {
            return Err(invalid("asset_field must not be empty"));
        }
        if self.delimiters.is_empty() {
            return Err(invalid("delimiters must not be empty"));
        }
        if self.duplicate_column.trim().is_empty() || self.duplicate_column == self.asset_field {
            return Err(invalid("duplicate_column must be non-empty and differ from asset_field"));
        }
        if self.views.is_empty() {
            return Err(invalid("at least one view is required"));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for view in &self.views {
            let name = view.sheet.as_str();
            if name.trim().is_empty() {
                return Err(invalid("sheet names must not be empty"));
            }
            if name.chars().count() > MAX_SHEET_NAME_LEN {
                return Err(invalid(&format!(
                    "sheet name '{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
                )));
            }
            if !seen.insert(name) {
                return Err(invalid(&format!("sheet name '{name}' is used twice")));
            }
        }

        if let Some(h) = &self.highlight {
            if !seen.contains(h.sheet.as_str()) {
                return Err(invalid(&format!(
                    "highlight sheet '{}' is not one of the configured views",
                    h.sheet
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> CleanerError {
    CleanerError::InvalidConfig {
        message: message.to_string(),
    }
}
