//! The cleaning pipeline: classify → split → merge → dedupe → filter → summarize.
//!
//! [`Pipeline::run`] takes an input [`DataSet`] and returns every intermediate and derived
//! table in a [`PipelineOutput`]. The input is never modified. Progress is reported through
//! an optional [`PipelineObserver`]; the pipeline itself has no UI or I/O dependency.
//!
//! ```rust
//! use asset_code_cleaner::config::PipelineConfig;
//! use asset_code_cleaner::pipeline::Pipeline;
//! use asset_code_cleaner::types::{DataSet, Schema, Value};
//!
//! # fn main() -> Result<(), asset_code_cleaner::CleanerError> {
//! let config = PipelineConfig {
//!     asset_field: "code".to_string(),
//!     authority_field: "owner".to_string(),
//!     authority_targets: vec!["HQ".to_string()],
//!     ..PipelineConfig::duplicate_audit()
//! };
//! let input = DataSet::new(
//!     Schema::new(["code", "owner"]),
//!     vec![
//!         vec![Value::text("111"), Value::text("HQ")],
//!         vec![Value::text("0000"), Value::text("Branch")],
//!         vec![Value::text("222, 333"), Value::text("Branch")],
//!     ],
//! );
//!
//! let out = Pipeline::new(config)?.run(&input)?;
//! assert_eq!(out.correct.row_count(), 3);
//! assert_eq!(out.authority_filtered.row_count(), 1);
//! assert_eq!(out.duplicate_or_invalid.row_count(), 1);
//! # Ok(())
//! # }
//! ```

mod observer;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AuthorityBase, PipelineConfig, ReportView};
use crate::error::{CleanerError, CleanerResult};
use crate::processing::domains::{COUNT_COLUMN, DOMAIN_COLUMN};
use crate::processing::{
    duplicate_flags, mark_duplicates, normalize_code, Classifier, DomainSummarizer, Splitter,
};
use crate::types::{DataSet, Schema, Value};

pub use observer::{
    PipelineEvent, PipelineObserver, RecordingPipelineObserver, RunSummary, Stage,
    TracingPipelineObserver,
};

/// Every table produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Rows whose raw code was valid, with the code cleansed to digits.
    pub valid: DataSet,
    /// Rows whose raw code was invalid, as read.
    pub invalid: DataSet,
    /// One row per code extracted from the invalid rows.
    pub split: DataSet,
    /// Valid rows followed by split rows, with the duplicate flag column.
    pub merged: DataSet,
    /// Per merged row: does its code occur more than once.
    pub duplicate_flags: Vec<bool>,
    /// Merged rows with a valid code (duplicates removed if so configured).
    pub correct: DataSet,
    /// Merged or correct rows (per [`AuthorityBase`]) whose authority field matches a target.
    pub authority_filtered: DataSet,
    /// Merged rows that are duplicated or still invalid.
    pub duplicate_or_invalid: DataSet,
    /// Email domain counts over the correct rows.
    pub domain_summary: DataSet,
    /// Row counts.
    pub summary: RunSummary,
}

impl PipelineOutput {
    /// The table shown by a report view.
    pub fn view(&self, kind: ReportView) -> &DataSet {
        match kind {
            ReportView::ValidRows => &self.valid,
            ReportView::InvalidRows => &self.invalid,
            ReportView::SplitRows => &self.split,
            ReportView::MergedRows => &self.merged,
            ReportView::Correct => &self.correct,
            ReportView::AuthorityFiltered => &self.authority_filtered,
            ReportView::DuplicateOrInvalid => &self.duplicate_or_invalid,
            ReportView::DomainSummary => &self.domain_summary,
        }
    }
}

/// A configured cleaning pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    classifier: Classifier,
    splitter: Splitter,
    summarizer: DomainSummarizer,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline from a config, validating it first.
    pub fn new(config: PipelineConfig) -> CleanerResult<Self> {
        config.validate()?;
        Ok(Self {
            classifier: Classifier::new(config.junk_tokens.iter().cloned()),
            splitter: Splitter::new(config.delimiters.iter().copied()),
            summarizer: DomainSummarizer::new(config.default_domain.clone()),
            config,
            observer: None,
        })
    }

    /// Attach an observer for progress events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The config this pipeline was built from.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over `input`.
    ///
    /// Fails only if the asset-code column is missing. A missing authority or email column
    /// yields an empty view and a warning.
    pub fn run(&self, input: &DataSet) -> CleanerResult<PipelineOutput> {
        let start = Instant::now();
        let cfg = &self.config;
        let code_idx =
            input
                .schema
                .index_of(&cfg.asset_field)
                .ok_or_else(|| CleanerError::SchemaMismatch {
                    message: format!(
                        "missing required column '{}'. headers={:?}",
                        cfg.asset_field, input.schema.fields
                    ),
                })?;

        self.emit(PipelineEvent::RunStarted {
            input_rows: input.row_count(),
        });

        let valid = input
            .filter_rows(|row| self.classifier.classify(&row[code_idx]).is_valid())
            .map_rows(|row| {
                let mut out = row.to_vec();
                out[code_idx] = normalize_code(&row[code_idx]);
                out
            });
        let invalid = input.filter_rows(|row| self.classifier.is_invalid(&row[code_idx]));
        self.stage_finished(Stage::Classify, valid.row_count() + invalid.row_count());

        let split = self.splitter.split_dataset(&invalid, code_idx);
        self.stage_finished(Stage::Split, split.row_count());

        let merged = DataSet::concat([&valid, &split]);
        self.stage_finished(Stage::Merge, merged.row_count());

        let flags = duplicate_flags(&merged, code_idx);
        let merged = mark_duplicates(&merged, &flags, &cfg.duplicate_column);
        let duplicate_rows = flags.iter().filter(|f| **f).count();
        self.stage_finished(Stage::Dedupe, duplicate_rows);

        let code_ok: Vec<bool> = merged
            .rows
            .iter()
            .map(|row| self.classifier.classify(&row[code_idx]).is_valid())
            .collect();
        let correct = merged.filter_indexed(|i, _| {
            code_ok[i] && !(cfg.exclude_duplicates_from_correct && flags[i])
        });
        let duplicate_or_invalid = merged.filter_indexed(|i, _| flags[i] || !code_ok[i]);
        let authority_filtered = match cfg.authority_base {
            AuthorityBase::Merged => self.filter_by_authority(&merged),
            AuthorityBase::Correct => self.filter_by_authority(&correct),
        };
        self.stage_finished(Stage::Filter, correct.row_count());

        let domain_summary = self.summarize_domains(&correct);
        self.stage_finished(Stage::Summarize, domain_summary.row_count());

        let summary = RunSummary {
            input_rows: input.row_count(),
            valid_rows: valid.row_count(),
            invalid_rows: invalid.row_count(),
            split_rows: split.row_count(),
            merged_rows: merged.row_count(),
            duplicate_rows,
            correct_rows: correct.row_count(),
        };
        self.emit(PipelineEvent::RunFinished {
            elapsed: start.elapsed(),
            summary,
        });

        Ok(PipelineOutput {
            valid,
            invalid,
            split,
            merged,
            duplicate_flags: flags,
            correct,
            authority_filtered,
            duplicate_or_invalid,
            domain_summary,
            summary,
        })
    }

    fn filter_by_authority(&self, dataset: &DataSet) -> DataSet {
        let cfg = &self.config;
        let Some(idx) = dataset.schema.index_of(&cfg.authority_field) else {
            tracing::warn!(
                column = %cfg.authority_field,
                "authority column missing; filtered view will be empty"
            );
            return DataSet::empty(dataset.schema.clone());
        };
        dataset.filter_rows(|row| match row.get(idx) {
            Some(Value::Null) | None => false,
            Some(v) => {
                let text = v.render();
                cfg.authority_targets.iter().any(|t| *t == text)
            }
        })
    }

    fn summarize_domains(&self, dataset: &DataSet) -> DataSet {
        match &self.config.email_field {
            Some(field) => {
                if dataset.schema.index_of(field).is_none() {
                    tracing::warn!(column = %field, "email column missing; domain summary will be empty");
                }
                self.summarizer.summarize(dataset, field)
            }
            None => DataSet::empty(Schema::new([DOMAIN_COLUMN, COUNT_COLUMN])),
        }
    }

    fn stage_finished(&self, stage: Stage, output_rows: usize) {
        self.emit(PipelineEvent::StageFinished {
            stage,
            progress: stage.progress(),
            output_rows,
        });
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use super::{Pipeline, PipelineEvent, RecordingPipelineObserver, Stage};
    use crate::config::{AuthorityBase, PipelineConfig, ReportView};
    use crate::types::{DataSet, Schema, Value};

    fn config() -> PipelineConfig {
        PipelineConfig {
            asset_field: "code".to_string(),
            authority_field: "owner".to_string(),
            authority_targets: vec!["HQ".to_string()],
            email_field: Some("email".to_string()),
            ..PipelineConfig::duplicate_audit()
        }
    }

    fn inventory() -> DataSet {
        DataSet::new(
            Schema::new(["code", "owner", "email"]),
            vec![
                vec![Value::text("111"), Value::text("HQ"), Value::text("a@x.com")],
                vec![Value::text("0000"), Value::text("Branch"), Value::Null],
                vec![Value::text("222, 333"), Value::text("Branch"), Value::text("b@y.com")],
            ],
        )
    }

    fn codes(ds: &DataSet) -> BTreeSet<String> {
        ds.column("code").unwrap().map(|v| v.render()).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn end_to_end_three_rows() {
        let out = Pipeline::new(config()).unwrap().run(&inventory()).unwrap();

        assert_eq!(codes(&out.correct), set(&["111", "222", "333"]));
        assert_eq!(codes(&out.duplicate_or_invalid), set(&["0000"]));
        assert_eq!(codes(&out.authority_filtered), set(&["111"]));
        assert_eq!(out.duplicate_or_invalid.value(0, "owner"), Some(&Value::text("Branch")));
    }

    #[test]
    fn intermediate_tables_match_split_audit_layout() {
        let out = Pipeline::new(config()).unwrap().run(&inventory()).unwrap();

        assert_eq!(out.valid.row_count(), 1);
        assert_eq!(out.invalid.rows[1][0], Value::text("222, 333"));
        assert_eq!(codes(&out.split), set(&["0000", "222", "333"]));
        assert_eq!(out.merged.row_count(), 4);
        assert_eq!(out.merged.schema.index_of("Duplicate"), Some(3));
        assert_eq!(out.view(ReportView::SplitRows), &out.split);
    }

    #[test]
    fn authority_filter_follows_configured_base() {
        let input = DataSet::new(
            Schema::new(["code", "owner", "email"]),
            vec![
                vec![Value::text("111"), Value::text("HQ"), Value::Null],
                vec![Value::text("0000"), Value::text("HQ"), Value::Null],
                vec![Value::text("222"), Value::text("Branch"), Value::Null],
            ],
        );

        let merged_base = PipelineConfig {
            asset_field: "code".to_string(),
            authority_field: "owner".to_string(),
            authority_targets: vec!["HQ".to_string()],
            ..PipelineConfig::split_audit()
        };
        assert_eq!(merged_base.authority_base, AuthorityBase::Merged);
        let out = Pipeline::new(merged_base).unwrap().run(&input).unwrap();
        assert_eq!(codes(&out.authority_filtered), set(&["111", "0000"]));

        let out = Pipeline::new(config()).unwrap().run(&input).unwrap();
        assert_eq!(codes(&out.authority_filtered), set(&["111"]));
    }

    #[test]
    fn duplicates_leave_correct_view_only_when_configured() {
        let input = DataSet::new(
            Schema::new(["code", "owner", "email"]),
            vec![
                vec![Value::text("100"), Value::text("HQ"), Value::Null],
                vec![Value::text("200"), Value::text("HQ"), Value::Null],
                vec![Value::text("100 / 300"), Value::text("HQ"), Value::Null],
            ],
        );

        let out = Pipeline::new(config()).unwrap().run(&input).unwrap();
        assert_eq!(out.duplicate_flags, vec![true, false, true, false]);
        assert_eq!(codes(&out.correct), set(&["200", "300"]));
        assert_eq!(out.duplicate_or_invalid.row_count(), 2);

        let keep = PipelineConfig {
            exclude_duplicates_from_correct: false,
            ..config()
        };
        let out = Pipeline::new(keep).unwrap().run(&input).unwrap();
        assert_eq!(out.correct.row_count(), 4);
    }

    #[test]
    fn every_surviving_row_lands_in_exactly_one_final_view() {
        let input = DataSet::new(
            Schema::new(["code", "owner", "email"]),
            vec![
                vec![Value::text("100"), Value::Null, Value::Null],
                vec![Value::text("100"), Value::Null, Value::Null],
                vec![Value::text("Computer"), Value::Null, Value::Null],
                vec![Value::text("5, 6*7"), Value::Null, Value::Null],
                vec![Value::text("000"), Value::Null, Value::Null],
                vec![Value::Float64(900.0), Value::Null, Value::Null],
            ],
        );
        let out = Pipeline::new(config()).unwrap().run(&input).unwrap();

        // "Computer" yields no codes and is the only row dropped.
        assert_eq!(out.merged.row_count(), 2 + 3 + 1 + 1);
        assert_eq!(
            out.correct.row_count() + out.duplicate_or_invalid.row_count(),
            out.merged.row_count()
        );
    }

    #[test]
    fn domain_summary_counts_correct_rows_only() {
        let out = Pipeline::new(config()).unwrap().run(&inventory()).unwrap();
        assert_eq!(
            out.domain_summary.rows,
            vec![
                vec![Value::text("y.com"), Value::Int64(2)],
                vec![Value::text("x.com"), Value::Int64(1)],
            ]
        );
    }

    #[test]
    fn missing_asset_column_is_fatal() {
        let input = DataSet::new(Schema::new(["other"]), vec![vec![Value::text("1")]]);
        let err = Pipeline::new(config()).unwrap().run(&input).unwrap_err();
        assert!(err.to_string().contains("missing required column 'code'"));
    }

    #[test]
    fn missing_authority_and_email_columns_degrade_to_empty_views() {
        let input = DataSet::new(Schema::new(["code"]), vec![vec![Value::text("1")]]);
        let out = Pipeline::new(config()).unwrap().run(&input).unwrap();
        assert_eq!(out.correct.row_count(), 1);
        assert!(out.authority_filtered.is_empty());
        assert!(out.domain_summary.is_empty());
        assert_eq!(out.domain_summary.schema.len(), 2);
    }

    #[test]
    fn observer_sees_stages_in_order() {
        let obs = Arc::new(RecordingPipelineObserver::default());
        let pipeline = Pipeline::new(config()).unwrap().with_observer(obs.clone());
        pipeline.run(&inventory()).unwrap();

        let events = obs.events();
        assert!(matches!(events.first(), Some(PipelineEvent::RunStarted { input_rows: 3 })));
        assert!(matches!(events.last(), Some(PipelineEvent::RunFinished { .. })));

        let stages: Vec<Stage> = events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::StageFinished { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(stages, Stage::ALL.to_vec());
        assert_eq!(obs.progress(), 1.0);
    }
}
