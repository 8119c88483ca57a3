//! `tally daily`: weekday processing or weekend archiving of a delivered file.

use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use tally_io::text::read_file_as_utf8;
use tally_recon::schedule::{archive_path, count_data_rows};
use tally_recon::ProcessingDecision;

use crate::CliError;

#[derive(Debug, Serialize)]
struct DailyOutcome {
    date: NaiveDate,
    weekday: String,
    decision: ProcessingDecision,
    file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    archived_to: Option<PathBuf>,
}

pub fn cmd_daily(
    file: PathBuf,
    date: Option<NaiveDate>,
    archive_dir: PathBuf,
    json: bool,
) -> Result<(), CliError> {
    if !file.is_file() {
        return Err(CliError::usage(format!("input file not found: {}", file.display())));
    }

    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let decision = ProcessingDecision::for_date(date);
    tracing::info!(%date, %decision, file = %file.display(), "daily decision");

    let mut outcome = DailyOutcome {
        date,
        weekday: date.weekday().to_string(),
        decision,
        file: file.clone(),
        records: None,
        archived_to: None,
    };

    match decision {
        ProcessingDecision::Process => {
            let content = read_file_as_utf8(&file).map_err(CliError::io)?;
            let records = count_data_rows(&content);
            tracing::info!(records, "processed daily file");
            eprintln!("{date} ({}): processed {} with {records} records", outcome.weekday, file.display());
            outcome.records = Some(records);
        }
        ProcessingDecision::Archive => {
            std::fs::create_dir_all(&archive_dir).map_err(|e| {
                CliError::runtime(format!("cannot create {}: {e}", archive_dir.display()))
            })?;
            let dest = archive_path(&file, &archive_dir, date);
            std::fs::copy(&file, &dest).map_err(|e| {
                CliError::runtime(format!("cannot archive to {}: {e}", dest.display()))
            })?;
            tracing::info!(dest = %dest.display(), "archived daily file");
            eprintln!("{date} ({}): archived {} to {}", outcome.weekday, file.display(), dest.display());
            outcome.archived_to = Some(dest);
        }
    }

    if json {
        let json_str = serde_json::to_string_pretty(&outcome)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }
    Ok(())
}
