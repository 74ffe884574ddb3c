//! Command-line parsing for the classroom monitoring panel.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the data/merge/classification code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::DateRange;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "comfort",
    version,
    about = "Classroom environment monitoring panel"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI.
    ///
    /// This uses the same fetch pipeline as the text subcommands, but
    /// renders results in a terminal UI using Ratatui.
    Tui(RangeArgs),
    /// Print the latest readings as text cards.
    Current,
    /// Print the merged daily table and its compliance summary.
    Daily(DailyArgs),
    /// Print the backend's within-range percentages with interpretation.
    Compliance(RangeArgs),
    /// Print the per-day listing for both sensor sets.
    History(RangeArgs),
    /// Write the multi-section research report (markdown).
    Report(ReportArgs),
}

/// Shared date-range options. Defaults to the last 5 days ending today.
#[derive(Debug, Parser, Clone, Copy)]
pub struct RangeArgs {
    /// Start of the range (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End of the range (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn resolve(&self) -> DateRange {
        DateRange::resolve(self.from, self.to)
    }
}

/// Options for the merged daily table.
#[derive(Debug, Parser)]
pub struct DailyArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Export the merged table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the merged run (rows + summaries) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for the report export.
#[derive(Debug, Parser)]
pub struct ReportArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Output path for the markdown report.
    #[arg(long, default_value = "report.md")]
    pub out: PathBuf,
}
