// tally - keyed record reconciliation between two sources

mod daily;
mod exit_codes;
mod logging;
mod recon;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{recon_exit_code, EXIT_RUNTIME, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE};
use recon::ReconCommands;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Reconcile two keyed record collections and report the differences")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Config-driven reconciliation of two delimited files
    #[command(subcommand)]
    Recon(ReconCommands),

    /// Show per-kind counts and the first stored discrepancies
    #[command(after_help = "\
Examples:
  tally report recon.db
  tally report recon.db --limit 25
  tally report recon.db --json")]
    Report {
        /// SQLite store written by `tally recon run --db`
        #[arg(env = "TALLY_DB")]
        db: PathBuf,

        /// Number of detail rows to print
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Process a daily file on weekdays, archive it on weekends
    #[command(after_help = "\
Examples:
  tally daily payments_d-1.csv
  tally daily payments_d-1.csv --date 2026-01-17 --archive-dir archive/")]
    Daily {
        /// File delivered for the day
        file: PathBuf,

        /// Execution date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Destination for weekend archives
        #[arg(long, default_value = "archive")]
        archive_dir: PathBuf,

        /// Output the outcome as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("TALLY_COMMIT"),
        ")",
        "\nengine:  tally-recon ",
        env!("CARGO_PKG_VERSION"),
        "\nstore:   sqlite schema v1",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {e}");
    }

    let result = match cli.command {
        Commands::Recon(cmd) => recon::cmd_recon(cmd),
        Commands::Report { db, limit, json } => report::cmd_report(db, limit, json),
        Commands::Daily {
            file,
            date,
            archive_dir,
            json,
        } => daily::cmd_daily(file, date, archive_dir, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, msg)
    }

    /// Engine error with its registry code.
    pub fn recon(err: tally_recon::ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            tally_recon::ReconError::DuplicateKey { .. } => {
                Some("each source must carry every key at most once".to_string())
            }
            tally_recon::ReconError::InvalidRange { .. } => {
                Some("check [range] in the config or the --lower/--upper flags".to_string())
            }
            tally_recon::ReconError::MissingColumn { .. } => Some(
                "check key_field, compare and [snapshots] against the source header".to_string(),
            ),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// File and store errors from tally-io.
    pub fn io(err: tally_io::Error) -> Self {
        let code = match &err {
            tally_io::Error::Read { .. } => EXIT_RUNTIME,
            _ => EXIT_STORE,
        };
        Self::new(code, err.to_string())
    }

    /// Replace the message, keeping code and hint.
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
