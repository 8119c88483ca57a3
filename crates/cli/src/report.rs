//! `tally report`: read back the latest run from a result store.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use tally_io::SqliteStore;
use tally_recon::{Discrepancy, DiscrepancySink, KindCount};

use crate::CliError;

#[derive(Serialize)]
struct ReportOutput {
    total: usize,
    counts: Vec<KindCount>,
    discrepancies: Vec<Discrepancy>,
}

pub fn cmd_report(db: PathBuf, limit: usize, json: bool) -> Result<(), CliError> {
    // Opening a missing path would create an empty store
    if !db.is_file() {
        return Err(CliError::usage(format!("no result store at {}", db.display()))
            .with_hint("write one with `tally recon run <config> --db <path>`"));
    }

    let store = SqliteStore::open(&db).map_err(CliError::io)?;
    let counts = store.counts_by_kind().map_err(CliError::io)?;
    let discrepancies = store.first(limit).map_err(CliError::io)?;
    let total = counts.iter().map(|c| c.count).sum();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        let output = ReportOutput { total, counts, discrepancies };
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        writeln!(out, "{json_str}").map_err(|e| CliError::runtime(e.to_string()))?;
        return Ok(());
    }

    write_report(&mut out, total, &counts, &discrepancies)
        .map_err(|e| CliError::runtime(e.to_string()))
}

fn write_report(
    out: &mut impl Write,
    total: usize,
    counts: &[KindCount],
    discrepancies: &[Discrepancy],
) -> io::Result<()> {
    writeln!(out, "{:<12} {:>8}", "KIND", "COUNT")?;
    for c in counts {
        writeln!(out, "{:<12} {:>8}", c.kind.as_str(), c.count)?;
    }
    writeln!(out, "{:<12} {:>8}", "TOTAL", total)?;

    if !discrepancies.is_empty() {
        writeln!(out)?;
        writeln!(out, "first {} of {}:", discrepancies.len(), total)?;
        write_details(out, discrepancies)?;
    }
    Ok(())
}

/// One block per discrepancy: kind, id and description, then the
/// differing fields and both snapshots when present.
pub(crate) fn write_details(out: &mut impl Write, discrepancies: &[Discrepancy]) -> io::Result<()> {
    for d in discrepancies {
        writeln!(out, "  {:<10} {:>10}  {}", d.kind.as_str(), d.id, d.description)?;
        if !d.fields.is_empty() {
            writeln!(out, "    fields: {}", d.fields.join(", "))?;
        }
        if let Some(ref snap) = d.left_snapshot {
            writeln!(out, "    left:   {snap}")?;
        }
        if let Some(ref snap) = d.right_snapshot {
            writeln!(out, "    right:  {snap}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tally_recon::DiscrepancyKind;

    fn mismatch() -> Discrepancy {
        Discrepancy {
            kind: DiscrepancyKind::Mismatch,
            id: 5008805,
            description: "Record ID 5008805 has diverging values between local and GCP".into(),
            left_snapshot: Some("M|427500|-12005|NULL".into()),
            right_snapshot: Some("M|427500|-12005|Managers".into()),
            fields: vec!["OCCUPATION_TYPE".into()],
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn details_show_fields_and_snapshots() {
        let mut buf = Vec::new();
        write_details(&mut buf, &[mismatch()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("MISMATCH"));
        assert!(text.contains("fields: OCCUPATION_TYPE"));
        assert!(text.contains("left:   M|427500|-12005|NULL"));
        assert!(text.contains("right:  M|427500|-12005|Managers"));
    }

    #[test]
    fn report_table_has_total() {
        let counts = vec![KindCount { kind: DiscrepancyKind::Mismatch, count: 3 }];
        let mut buf = Vec::new();
        write_report(&mut buf, 3, &counts, &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("MISMATCH"));
        assert!(lines[2].starts_with("TOTAL"));
        assert!(!text.contains("first"));
    }
}
