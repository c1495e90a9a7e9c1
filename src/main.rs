//! `asset-code-cleaner` command line.
//!
//! ```bash
//! asset-code-cleaner clean --input inventory.xlsx --output cleaned_data.xlsx
//! asset-code-cleaner clean --input inventory.xlsx --variant split-audit --all-sheets
//! asset-code-cleaner compare --original inventory.xlsx --cleaned cleaned_data.xlsx
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use asset_code_cleaner::compare::{collect_canonical_codes, compare_codes, comparison_report};
use asset_code_cleaner::config::{PipelineConfig, DEFAULT_ASSET_FIELD};
use asset_code_cleaner::ingestion::{
    ingest_from_path, read_sheets_from_path, CompositeObserver, FileObserver, IngestionObserver, ReadOptions,
    SheetSelection, TracingObserver,
};
use asset_code_cleaner::pipeline::{Pipeline, TracingPipelineObserver};
use asset_code_cleaner::processing::Splitter;
use asset_code_cleaner::report::{assemble_report, write_report};

#[derive(Parser)]
#[command(name = "asset-code-cleaner")]
#[command(about = "Clean asset codes of an inventory workbook and write an audit report")]
#[command(version)]
struct Cli {
    /// Log filter, e.g. `info`, `debug` or `asset_code_cleaner=trace`
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean an inventory file and write the report workbook
    Clean {
        /// Input workbook (.xlsx/.xls/.ods), .csv or .json
        #[arg(long)]
        input: PathBuf,

        /// Report workbook to write
        #[arg(long, default_value = "cleaned_data.xlsx")]
        output: PathBuf,

        /// Sheet to read (repeatable). Defaults to the first sheet
        #[arg(long = "sheet", conflicts_with = "all_sheets")]
        sheets: Vec<String>,

        /// Read and concatenate every sheet
        #[arg(long)]
        all_sheets: bool,

        /// Pipeline config (.toml or .json)
        #[arg(long, conflicts_with = "variant")]
        config: Option<PathBuf>,

        /// Built-in report layout
        #[arg(long, value_enum, default_value = "duplicate-audit")]
        variant: Variant,

        /// Append read outcomes to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Check which codes of an original file appear in a cleaned workbook
    Compare {
        /// Original inventory file
        #[arg(long)]
        original: PathBuf,

        /// Cleaned report workbook
        #[arg(long)]
        cleaned: PathBuf,

        /// Comparison workbook to write
        #[arg(long, default_value = "asset_comparison_report.xlsx")]
        output: PathBuf,

        /// Cleaned sheets to collect codes from (repeatable). Defaults to every sheet
        #[arg(long = "sheet")]
        sheets: Vec<String>,

        /// Asset-code column name
        #[arg(long, default_value = DEFAULT_ASSET_FIELD)]
        asset_field: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    /// Valid, invalid, split, merged and authority-filtered sheets
    SplitAudit,
    /// Correct, authority-filtered, duplicate/invalid and email-domain sheets
    DuplicateAudit,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("invalid --log-level '{}'", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Clean {
            input,
            output,
            sheets,
            all_sheets,
            config,
            variant,
            log_file,
        } => {
            let config = match config {
                Some(path) => PipelineConfig::from_path(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => match variant {
                    Variant::SplitAudit => PipelineConfig::split_audit(),
                    Variant::DuplicateAudit => PipelineConfig::duplicate_audit(),
                },
            };

            let mut observers: Vec<Arc<dyn IngestionObserver>> = vec![Arc::new(TracingObserver)];
            if let Some(path) = log_file {
                observers.push(Arc::new(FileObserver::new(path)));
            }
            let options = ReadOptions {
                sheet_selection: selection(sheets, all_sheets),
                observer: Some(Arc::new(CompositeObserver::new(observers))),
                ..Default::default()
            };

            let data = ingest_from_path(&input, &options)
                .with_context(|| format!("reading {}", input.display()))?;
            let pipeline = Pipeline::new(config)?.with_observer(Arc::new(TracingPipelineObserver));
            let result = pipeline.run(&data)?;
            let report = assemble_report(&result, pipeline.config());
            write_report(&report, &output).with_context(|| format!("writing {}", output.display()))?;

            println!("{}", result.summary);
            println!("report: {}", output.display());
        }
        Commands::Compare {
            original,
            cleaned,
            output,
            sheets,
            asset_field,
        } => {
            let original_data = ingest_from_path(&original, &ReadOptions::default())
                .with_context(|| format!("reading {}", original.display()))?;

            let cleaned_options = ReadOptions {
                sheet_selection: selection(sheets, true),
                ..Default::default()
            };
            let cleaned_sheets = read_sheets_from_path(&cleaned, &cleaned_options)
                .with_context(|| format!("reading {}", cleaned.display()))?;

            let known = collect_canonical_codes(&cleaned_sheets, &asset_field);
            let table = compare_codes(&original_data, &asset_field, &known, &Splitter::default())?;
            write_report(&comparison_report(table), &output)
                .with_context(|| format!("writing {}", output.display()))?;

            println!("report: {}", output.display());
        }
    }
    Ok(())
}

fn selection(sheets: Vec<String>, all_sheets: bool) -> SheetSelection {
    match sheets.len() {
        0 if all_sheets => SheetSelection::AllSheets,
        0 => SheetSelection::First,
        1 => SheetSelection::Sheet(sheets.into_iter().next().unwrap_or_default()),
        _ => SheetSelection::Sheets(sheets),
    }
}
