use chrono::{DateTime, Utc};

use crate::compare::differing_fields;
use crate::config::ReconOptions;
use crate::model::{Discrepancy, DiscrepancyKind, RecordSet};
use crate::snapshot::render_snapshot;

/// Compare two collections over `options.range`.
///
/// Output is grouped as left-only, right-only, then mismatches, each in
/// ascending id order. Pure: re-running on the same inputs yields the same
/// discrepancies apart from `detected_at`.
pub fn reconcile(
    left: &RecordSet,
    right: &RecordSet,
    options: &ReconOptions,
    detected_at: DateTime<Utc>,
) -> Vec<Discrepancy> {
    let mut out = Vec::new();
    presence_pass(left, right, DiscrepancyKind::LeftOnly, options, detected_at, &mut out);
    presence_pass(right, left, DiscrepancyKind::RightOnly, options, detected_at, &mut out);
    mismatch_pass(left, right, options, detected_at, &mut out);
    out
}

/// Ids of `driving` in range that are missing from `other`.
fn presence_pass(
    driving: &RecordSet,
    other: &RecordSet,
    kind: DiscrepancyKind,
    options: &ReconOptions,
    detected_at: DateTime<Utc>,
    out: &mut Vec<Discrepancy>,
) {
    let snapshots = &options.snapshots;
    let (found_in, missing_from) = match kind {
        DiscrepancyKind::RightOnly => (&options.labels.right, &options.labels.left),
        _ => (&options.labels.left, &options.labels.right),
    };

    for record in driving.in_range(options.range) {
        if other.contains(record.id) {
            continue;
        }
        let snapshot = Some(render_snapshot(record, &snapshots.presence, &snapshots.null_token));
        let (left_snapshot, right_snapshot) = match kind {
            DiscrepancyKind::RightOnly => (None, snapshot),
            _ => (snapshot, None),
        };
        out.push(Discrepancy {
            kind,
            id: record.id,
            description: format!(
                "Record ID {} exists in {found_in} but was not found in {missing_from}",
                record.id
            ),
            left_snapshot,
            right_snapshot,
            fields: Vec::new(),
            detected_at,
        });
    }
}

fn mismatch_pass(
    left: &RecordSet,
    right: &RecordSet,
    options: &ReconOptions,
    detected_at: DateTime<Utc>,
    out: &mut Vec<Discrepancy>,
) {
    let snapshots = &options.snapshots;

    for left_record in left.in_range(options.range) {
        let Some(right_record) = right.get(left_record.id) else {
            continue;
        };
        let fields = differing_fields(left_record, right_record, &options.compare);
        if fields.is_empty() {
            continue;
        }
        out.push(Discrepancy {
            kind: DiscrepancyKind::Mismatch,
            id: left_record.id,
            description: format!(
                "Record ID {} has diverging values between {} and {}",
                left_record.id, options.labels.left, options.labels.right
            ),
            left_snapshot: Some(render_snapshot(
                left_record,
                &snapshots.mismatch,
                &snapshots.null_token,
            )),
            right_snapshot: Some(render_snapshot(
                right_record,
                &snapshots.mismatch,
                &snapshots.null_token,
            )),
            fields,
            detected_at,
        });
    }
}
