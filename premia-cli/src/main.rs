//! Premia CLI — spreadsheet cleaning and ERP analysis commands.
//!
//! Commands:
//! - `convert` — clean one named extract and export it as CSV
//! - `erp` — build the ERP series plus its intermediate artifacts
//! - `rolling` — trailing-window sigma bands over the ERP series
//! - `interval` — flat sigma bands over a calendar interval
//! - `thermometer` — ratio and ERP percentile rankings

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use premia_core::clean::DateSystem;
use premia_runner::runner::default_interval_end;
use premia_runner::{
    run_convert, run_erp, run_interval, run_rolling, run_thermometer, AnalysisConfig, RunContext,
    RunError,
};

#[derive(Parser)]
#[command(
    name = "premia",
    about = "Premia CLI — valuation data cleaning and equity risk premium analysis"
)]
struct Cli {
    /// Directory holding the CSV extracts.
    #[arg(long, global = true, default_value = "input")]
    input_dir: PathBuf,

    /// Directory artifacts are written into.
    #[arg(long, global = true, default_value = "output")]
    output_dir: PathBuf,

    /// Path to a TOML analysis configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Date-serial convention of the source workbooks.
    #[arg(long, global = true, value_enum)]
    date_system: Option<DateSystemArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean one named extract and export it as CSV.
    Convert {
        /// Logical file stem, matched case-insensitively (e.g. data_PE).
        stem: String,
    },
    /// Build the ERP series and export it with its intermediates.
    Erp,
    /// Trailing-window sigma bands over the ERP series.
    Rolling {
        /// Trailing window in trading days.
        #[arg(long)]
        window: Option<usize>,
    },
    /// Flat sigma bands over a calendar interval of the ERP series.
    Interval {
        /// Interval start (YYYY-MM-DD), snapped forward to a trading day.
        #[arg(long)]
        start: NaiveDate,

        /// Interval end (YYYY-MM-DD), snapped backward. Defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Ratio and ERP percentile rankings.
    Thermometer,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error ({}): {error:#}", error.kind());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(system) = cli.date_system {
        config.date_system = Some(system.into());
    }
    let ctx = RunContext::new(cli.input_dir, cli.output_dir, config);

    match cli.command {
        Commands::Convert { stem } => {
            let summary = run_convert(&ctx, &stem)?;
            print_summary(&summary);
        }
        Commands::Erp => {
            let summary = run_erp(&ctx)?;
            print_summary(&summary);
        }
        Commands::Rolling { window } => {
            let window = window.unwrap_or(ctx.config.rolling.window);
            let summary = run_rolling(&ctx, window)?;
            print_summary(&summary);
        }
        Commands::Interval { start, end } => {
            let end = end.unwrap_or_else(default_interval_end);
            let summary = run_interval(&ctx, start, end)?;
            if summary.start_adjusted {
                eprintln!(
                    "note: start adjusted to trading day {}",
                    summary.used_start
                );
            }
            if summary.end_adjusted {
                eprintln!("note: end adjusted to trading day {}", summary.used_end);
            }
            print_summary(&summary);
        }
        Commands::Thermometer => {
            let summary = run_thermometer(&ctx)?;
            print_summary(&summary);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateSystemArg {
    /// Serial 1 = 1900-01-01 (the common convention).
    #[value(name = "1900")]
    Excel1900,
    /// Serial 0 = 1904-01-01 (legacy Mac workbooks).
    #[value(name = "1904")]
    Excel1904,
}

impl From<DateSystemArg> for DateSystem {
    fn from(arg: DateSystemArg) -> Self {
        match arg {
            DateSystemArg::Excel1900 => DateSystem::Excel1900,
            DateSystemArg::Excel1904 => DateSystem::Excel1904,
        }
    }
}

fn print_summary<T: serde::Serialize>(summary: &T) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{json}"),
        Err(error) => eprintln!("cannot render summary: {error}"),
    }
}
