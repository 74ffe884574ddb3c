//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches from the sensor statistics API
//! - merges/classifies/summarizes
//! - prints text output or launches the TUI
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, DailyArgs, RangeArgs, ReportArgs};
use crate::data::StatsClient;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `comfort` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::init();

    // We want `comfort` and `comfort --from ...` to behave like
    // `comfort tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => crate::tui::run(args),
        Command::Current => handle_current(),
        Command::Daily(args) => handle_daily(args),
        Command::Compliance(args) => handle_compliance(args),
        Command::History(args) => handle_history(args),
        Command::Report(args) => handle_report(args),
    }
}

fn handle_current() -> Result<(), AppError> {
    let client = StatsClient::from_env()?;
    let stats = client.current()?;
    println!("{}", crate::report::format::format_current(&stats));
    Ok(())
}

fn handle_daily(args: DailyArgs) -> Result<(), AppError> {
    let client = StatsClient::from_env()?;
    let range = args.range.resolve();
    let run = pipeline::run_daily(&client, &range)?;

    println!("{}", crate::report::format::format_daily(&run));

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_daily_csv(path, &run.rows)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_daily_json(path, &run)?;
    }

    Ok(())
}

fn handle_compliance(args: RangeArgs) -> Result<(), AppError> {
    let client = StatsClient::from_env()?;
    let range = args.resolve();
    let stats = client.compliance(&range)?;
    println!(
        "{}",
        crate::report::format::format_compliance(&stats, &range)
    );
    Ok(())
}

fn handle_history(args: RangeArgs) -> Result<(), AppError> {
    let client = StatsClient::from_env()?;
    let range = args.resolve();
    let run = pipeline::run_history(&client, &range)?;
    println!("{}", crate::report::format::format_history(&run));
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let client = StatsClient::from_env()?;
    let range = args.range.resolve();

    // Each section degrades to a "not available" note rather than failing
    // the whole export; the report documents what could not be fetched.
    let current = client.current().ok();
    let daily = pipeline::run_daily(&client, &range).ok();
    let compliance = client.compliance(&range).ok();
    let history = pipeline::run_history(&client, &range).ok();

    let report = crate::report::build_report(&crate::report::ReportInput {
        range,
        current: current.as_ref(),
        daily: daily.as_ref(),
        compliance: compliance.as_ref(),
        history: history.as_ref(),
    });
    crate::io::export::write_report(&args.out, &report)?;
    println!("Wrote report to {}", args.out.display());
    Ok(())
}

/// Rewrite argv so `comfort` defaults to `comfort tui`.
///
/// Rules:
/// - `comfort`                     -> `comfort tui`
/// - `comfort --from 2025-01-01`   -> `comfort tui --from 2025-01-01`
/// - `comfort --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "current" | "daily" | "compliance" | "history" | "report"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(args(&["comfort"])), args(&["comfort", "tui"]));
    }

    #[test]
    fn leading_flag_is_treated_as_tui_flags() {
        assert_eq!(
            rewrite_args(args(&["comfort", "--from", "2025-01-01"])),
            args(&["comfort", "tui", "--from", "2025-01-01"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(args(&["comfort", "daily"])),
            args(&["comfort", "daily"])
        );
        assert_eq!(
            rewrite_args(args(&["comfort", "--help"])),
            args(&["comfort", "--help"])
        );
    }
}
