//! Daily file handling: process on business days, archive on weekends.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingDecision {
    Process,
    Archive,
}

impl ProcessingDecision {
    /// Monday through Friday process; Saturday and Sunday archive.
    pub fn for_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => Self::Archive,
            _ => Self::Process,
        }
    }
}

impl std::fmt::Display for ProcessingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::Archive => write!(f, "archive"),
        }
    }
}

/// Date-stamped destination for an archived file: `{stem}_{YYYYMMDD}.{ext}`.
pub fn archive_path(source: &Path, archive_dir: &Path, date: NaiveDate) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".into());
    let stamp = date.format("%Y%m%d");
    let name = match source.extension() {
        Some(ext) => format!("{stem}_{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{stamp}"),
    };
    archive_dir.join(name)
}

/// Data rows in a file with one header line.
pub fn count_data_rows(content: &str) -> usize {
    content.lines().count().saturating_sub(1)
}
