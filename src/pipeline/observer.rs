use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Partition rows into valid/invalid and cleanse valid codes.
    Classify,
    /// Split invalid rows into one row per code.
    Split,
    /// Concatenate valid and split rows.
    Merge,
    /// Flag repeated canonical codes.
    Dedupe,
    /// Derive the correct, authority-filtered and duplicate/invalid views.
    Filter,
    /// Tabulate email domains.
    Summarize,
}

impl Stage {
    /// All stages, in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Classify,
        Stage::Split,
        Stage::Merge,
        Stage::Dedupe,
        Stage::Filter,
        Stage::Summarize,
    ];

    /// Fraction of the run completed once this stage has finished.
    pub fn progress(self) -> f32 {
        let pos = Self::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1;
        pos as f32 / Self::ALL.len() as f32
    }

    /// Lower-case stage name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Classify => "classify",
            Stage::Split => "split",
            Stage::Merge => "merge",
            Stage::Dedupe => "dedupe",
            Stage::Filter => "filter",
            Stage::Summarize => "summarize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row counts of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub input_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub split_rows: usize,
    pub merged_rows: usize,
    pub duplicate_rows: usize,
    pub correct_rows: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input={}, valid={}, invalid={}, split={}, merged={}, duplicates={}, correct={}",
            self.input_rows,
            self.valid_rows,
            self.invalid_rows,
            self.split_rows,
            self.merged_rows,
            self.duplicate_rows,
            self.correct_rows
        )
    }
}

/// Events emitted by [`super::Pipeline::run`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RunStarted {
        input_rows: usize,
    },
    StageFinished {
        stage: Stage,
        progress: f32,
        output_rows: usize,
    },
    RunFinished {
        elapsed: Duration,
        summary: RunSummary,
    },
}

/// Observer hook for pipeline progress.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Logs pipeline events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingPipelineObserver;

impl PipelineObserver for TracingPipelineObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { input_rows } => {
                tracing::info!(input_rows, "cleaning run started");
            }
            PipelineEvent::StageFinished {
                stage,
                progress,
                output_rows,
            } => {
                tracing::debug!(
                    stage = stage.name(),
                    progress = f64::from(*progress),
                    output_rows,
                    "stage finished"
                );
            }
            PipelineEvent::RunFinished { elapsed, summary } => {
                tracing::info!(?elapsed, %summary, "cleaning run finished");
            }
        }
    }
}

/// Keeps every event; useful for progress displays that poll, and for tests.
#[derive(Debug, Default)]
pub struct RecordingPipelineObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingPipelineObserver {
    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Latest reported progress, `0.0` before the first stage finishes.
    pub fn progress(&self) -> f32 {
        self.events()
            .iter()
            .rev()
            .find_map(|e| match e {
                PipelineEvent::StageFinished { progress, .. } => Some(*progress),
                _ => None,
            })
            .unwrap_or(0.0)
    }
}

impl PipelineObserver for RecordingPipelineObserver {
    fn on_event(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
