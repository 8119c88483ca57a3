use chrono::{DateTime, Utc};
use tempfile::TempDir;

use tally_io::text::read_file_as_utf8;
use tally_io::SqliteStore;
use tally_recon::model::{Discrepancy, DiscrepancyKind, KindCount};
use tally_recon::sink::DiscrepancySink;

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn row(kind: DiscrepancyKind, id: i64, detected_at: DateTime<Utc>) -> Discrepancy {
    Discrepancy {
        kind,
        id,
        description: format!("Record ID {id}"),
        left_snapshot: (kind != DiscrepancyKind::RightOnly).then(|| "M|427500|NULL".to_string()),
        right_snapshot: (kind != DiscrepancyKind::LeftOnly).then(|| "M|427500|Working".to_string()),
        fields: if kind == DiscrepancyKind::Mismatch {
            vec!["OCCUPATION_TYPE".into()]
        } else {
            Vec::new()
        },
        detected_at,
    }
}

#[test]
fn replace_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("recon.db");
    let t = at("2026-01-14T08:00:00Z");

    {
        let mut store = SqliteStore::open(&db).unwrap();
        store
            .replace_all(&[
                row(DiscrepancyKind::LeftOnly, 1, t),
                row(DiscrepancyKind::RightOnly, 2, t),
            ])
            .unwrap();
    }

    let mut store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.count().unwrap(), 2);

    store.replace_all(&[row(DiscrepancyKind::Mismatch, 7, t)]).unwrap();
    drop(store);

    let store = SqliteStore::open(&db).unwrap();
    let stored = store.first(10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, 7);
    assert_eq!(stored[0].fields, vec!["OCCUPATION_TYPE".to_string()]);
}

#[test]
fn clear_empties_store_across_reopen() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("recon.db");
    let t = at("2026-01-14T08:00:00Z");

    let mut store = SqliteStore::open(&db).unwrap();
    store
        .replace_all(&[
            row(DiscrepancyKind::LeftOnly, 1, t),
            row(DiscrepancyKind::Mismatch, 3, t),
        ])
        .unwrap();
    store.clear().unwrap();

    assert_eq!(store.count().unwrap(), 0);
    assert!(store.first(10).unwrap().is_empty());
    assert!(store.counts_by_kind().unwrap().is_empty());
    drop(store);

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn empty_run_clears_previous_rows() {
    let dir = TempDir::new().unwrap();
    let mut store = SqliteStore::open(&dir.path().join("recon.db")).unwrap();
    let t = at("2026-01-14T08:00:00Z");

    store.replace_all(&[row(DiscrepancyKind::LeftOnly, 1, t)]).unwrap();
    store.replace_all(&[]).unwrap();

    assert_eq!(store.count().unwrap(), 0);
    assert!(store.counts_by_kind().unwrap().is_empty());
}

#[test]
fn counts_most_frequent_first() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let t = at("2026-01-14T08:00:00Z");
    store
        .replace_all(&[
            row(DiscrepancyKind::LeftOnly, 1, t),
            row(DiscrepancyKind::Mismatch, 2, t),
            row(DiscrepancyKind::Mismatch, 3, t),
            row(DiscrepancyKind::RightOnly, 4, t),
            row(DiscrepancyKind::Mismatch, 5, t),
        ])
        .unwrap();

    // LEFT_ONLY and RIGHT_ONLY tie at one; kind order breaks the tie
    assert_eq!(
        store.counts_by_kind().unwrap(),
        vec![
            KindCount { kind: DiscrepancyKind::Mismatch, count: 3 },
            KindCount { kind: DiscrepancyKind::LeftOnly, count: 1 },
            KindCount { kind: DiscrepancyKind::RightOnly, count: 1 },
        ]
    );
}

#[test]
fn first_n_in_insertion_order() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let t = at("2026-01-14T08:00:00Z");
    let rows: Vec<Discrepancy> = [40, 10, 30, 20]
        .into_iter()
        .map(|id| row(DiscrepancyKind::Mismatch, id, t))
        .collect();
    store.replace_all(&rows).unwrap();

    let ids: Vec<i64> = store.first(3).unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![40, 10, 30]);
    assert_eq!(store.first(0).unwrap().len(), 0);
    assert_eq!(store.first(usize::MAX).unwrap().len(), 4);
}

#[test]
fn timestamps_round_trip_exactly() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let t = at("2026-01-17T23:59:58.250Z");
    store.replace_all(&[row(DiscrepancyKind::RightOnly, 9, t)]).unwrap();
    assert_eq!(store.first(1).unwrap()[0].detected_at, t);
}

#[test]
fn semicolon_file_read_through_text_layer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.csv");
    std::fs::write(&path, "ID;CODE_GENDER\n5008804;M\n").unwrap();
    let text = read_file_as_utf8(&path).unwrap();
    assert!(text.starts_with("ID;CODE_GENDER"));
}
