//! `tally recon`: config-driven reconciliation of two delimited files.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use tally_io::text::read_file_as_utf8;
use tally_io::SqliteStore;
use tally_recon::load::load_records;
use tally_recon::{DiscrepancySink, ReconConfig, ReconInput, ReconResult, RecordSet, Side};

use crate::exit_codes::EXIT_DISCREPANCIES;
use crate::report::write_details;
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  tally recon run local-vs-gcp.recon.toml
  tally recon run local-vs-gcp.recon.toml --json
  tally recon run local-vs-gcp.recon.toml --output result.json
  tally recon run local-vs-gcp.recon.toml --db recon.db
  tally recon run local-vs-gcp.recon.toml --lower 5008804 --upper 5008900")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Replace the contents of this SQLite result store
        #[arg(long)]
        db: Option<PathBuf>,

        /// Override the range's lower bound (inclusive)
        #[arg(long, allow_hyphen_values = true)]
        lower: Option<i64>,

        /// Override the range's upper bound (inclusive)
        #[arg(long, allow_hyphen_values = true)]
        upper: Option<i64>,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  tally recon validate local-vs-gcp.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, json, output, db, lower, upper } => {
            cmd_recon_run(config, json, output, db, lower, upper)
        }
        ReconCommands::Validate { config } => cmd_recon_validate(config),
    }
}

fn load_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = read_file_as_utf8(config_path).map_err(CliError::io)?;
    ReconConfig::from_toml(&config_str).map_err(CliError::recon)
}

/// Source files and a relative store path resolve against the config's directory.
fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

fn load_side(config: &ReconConfig, base: &Path, side: Side) -> Result<RecordSet, CliError> {
    let source = config.sources.get(side);
    let path = base.join(&source.file);
    let data = read_file_as_utf8(&path).map_err(CliError::io)?;
    let required = config.required_columns();
    load_records(side, &data, source, &config.key_field, &required).map_err(|e| {
        let message = format!("{}: {e}", path.display());
        CliError::recon(e).with_message(message)
    })
}

fn cmd_recon_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    db: Option<PathBuf>,
    lower: Option<i64>,
    upper: Option<i64>,
) -> Result<(), CliError> {
    let mut config = load_config(&config_path)?;
    config.override_range(lower, upper);
    config.validate().map_err(CliError::recon)?;

    let base = base_dir(&config_path);
    let input = ReconInput {
        left: load_side(&config, base, Side::Left)?,
        right: load_side(&config, base, Side::Right)?,
    };

    let result = tally_recon::run(&config, &input).map_err(CliError::recon)?;

    // The --db flag wins over [store] in the config
    let store_path = db.or_else(|| config.store.as_ref().map(|s| base.join(&s.path)));
    if let Some(ref path) = store_path {
        let mut store = SqliteStore::open(path).map_err(CliError::io)?;
        store.replace_all(&result.discrepancies).map_err(CliError::io)?;
        eprintln!("stored {} discrepancies in {}", result.discrepancies.len(), path.display());
    }

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&config, &result);

    if !result.summary.is_clean() {
        // Exit 1 without an `error:` line
        eprintln!("{} discrepancies found", result.summary.total);
        return Err(CliError::new(EXIT_DISCREPANCIES, ""));
    }
    Ok(())
}

/// Human summary to stderr.
fn print_summary(config: &ReconConfig, result: &ReconResult) {
    let s = &result.summary;
    let labels = config.labels();
    eprintln!(
        "recon '{}' over {}: {} {} and {} {} records in range",
        result.meta.config_name,
        result.meta.range,
        s.left_in_range,
        labels.left,
        s.right_in_range,
        labels.right,
    );
    eprintln!(
        "{} discrepancies: {} left-only, {} right-only, {} mismatches",
        s.total, s.left_only, s.right_only, s.mismatches,
    );

    let limit = config.report.detail_limit;
    if s.total > 0 {
        let shown = &result.discrepancies[..s.total.min(limit)];
        let mut err = std::io::stderr().lock();
        // stderr write failures are not actionable
        let _ = write_details(&mut err, shown);
        if s.total > limit {
            eprintln!("  ... {} more", s.total - limit);
        }
    }
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let base = base_dir(&config_path);

    let missing: Vec<String> = Side::ALL
        .into_iter()
        .map(|side| base.join(&config.sources.get(side).file))
        .filter(|path| !path.is_file())
        .map(|path| path.display().to_string())
        .collect();

    eprintln!(
        "valid: recon '{}' over [{}, {}], comparing {} field(s)",
        config.name,
        config.range.lower,
        config.range.upper,
        config.compare.len(),
    );

    if !missing.is_empty() {
        // Config is sound; sources may simply not be delivered yet
        eprintln!("warning: source file(s) not found: {}", missing.join(", "));
    }
    Ok(())
}
