//! rsiscan CLI: scan a folder of raw OHLCV exports and print the RSI of
//! every stock with enough history.
//!
//! Stdout carries only `<stock> <rsi>` lines. The folder prompt, diagnostics
//! and logs go to stderr; raise the log level with `-v` / `-vv` or `RUST_LOG`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use rsiscan_core::data::OverwritePolicy;
use rsiscan_runner::{write_summary, ErrorPolicy, Pipeline, PipelineConfig, StdoutProgress};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "Enter Folder Path: ";

#[derive(Parser, Debug)]
#[command(
    name = "rsiscan",
    about = "Clean raw stock CSV exports and print a first-window RSI per stock"
)]
struct Cli {
    /// Folder holding the raw `*.csv` exports. Prompted for when omitted.
    folder: Option<PathBuf>,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory cleaned files are written to. Defaults to DATA/CLEAN.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// What a failing file does to the run: skip or abort.
    #[arg(long)]
    on_error: Option<ErrorPolicy>,

    /// What to do when today's cleaned file already exists: overwrite or error.
    #[arg(long)]
    on_existing: Option<OverwritePolicy>,

    /// Number of intervals averaged by the RSI. Defaults to 14.
    #[arg(long)]
    period: Option<usize>,

    /// Write the run summary as JSON to this path.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Processing date stamped on cleaned files (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    let folder = match &cli.folder {
        Some(folder) => folder.clone(),
        None => prompt_folder(io::stdin().lock(), io::stderr().lock())?,
    };
    let as_of = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let summary = pipeline
        .run(&folder, as_of, &StdoutProgress)
        .with_context(|| format!("run over {} aborted", folder.display()))?;

    if let Some(path) = &cli.summary {
        write_summary(&summary, path)?;
        info!(path = %path.display(), "summary written");
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Config file (or defaults), then command-line overrides.
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(policy) = cli.on_error {
        config.on_error = policy;
    }
    if let Some(policy) = cli.on_existing {
        config.on_existing = policy;
    }
    if let Some(period) = cli.period {
        config.rsi_period = period;
    }
    config.validate()?;
    Ok(config)
}

/// Ask for the input folder on `output` (stderr in `main`) and read one line from `input`.
fn prompt_folder<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<PathBuf> {
    write!(output, "{PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read folder path")?;
    Ok(PathBuf::from(line.trim_end_matches(&['\r', '\n'][..])))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
