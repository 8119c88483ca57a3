use std::collections::HashMap;

use crate::model::{Discrepancy, DiscrepancyKind, KindCount, ReconSummary, RecordSet};
use crate::range::KeyRange;

/// Per-kind counts, most frequent first. Ties keep emission order.
pub fn count_by_kind(discrepancies: &[Discrepancy]) -> Vec<KindCount> {
    let mut counts: HashMap<DiscrepancyKind, usize> = HashMap::new();
    for d in discrepancies {
        *counts.entry(d.kind).or_insert(0) += 1;
    }

    let mut by_kind: Vec<KindCount> = DiscrepancyKind::ALL
        .into_iter()
        .filter_map(|kind| counts.get(&kind).map(|&count| KindCount { kind, count }))
        .collect();
    by_kind.sort_by(|a, b| b.count.cmp(&a.count).then(a.kind.cmp(&b.kind)));
    by_kind
}

/// Compute summary statistics for one run.
pub fn compute_summary(
    left: &RecordSet,
    right: &RecordSet,
    range: KeyRange,
    discrepancies: &[Discrepancy],
) -> ReconSummary {
    let by_kind = count_by_kind(discrepancies);
    let count = |kind: DiscrepancyKind| {
        by_kind
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.count)
            .unwrap_or(0)
    };

    ReconSummary {
        left_records: left.len(),
        right_records: right.len(),
        left_in_range: left.in_range(range).count(),
        right_in_range: right.in_range(range).count(),
        total: discrepancies.len(),
        left_only: count(DiscrepancyKind::LeftOnly),
        right_only: count(DiscrepancyKind::RightOnly),
        mismatches: count(DiscrepancyKind::Mismatch),
        by_kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Record, Side};
    use chrono::Utc;

    fn discrepancy(kind: DiscrepancyKind, id: i64) -> Discrepancy {
        Discrepancy {
            kind,
            id,
            description: String::new(),
            left_snapshot: None,
            right_snapshot: None,
            fields: Vec::new(),
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn counts_sorted_descending() {
        let ds = vec![
            discrepancy(DiscrepancyKind::LeftOnly, 1),
            discrepancy(DiscrepancyKind::Mismatch, 2),
            discrepancy(DiscrepancyKind::Mismatch, 3),
        ];
        let counts = count_by_kind(&ds);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0], KindCount { kind: DiscrepancyKind::Mismatch, count: 2 });
        assert_eq!(counts[1], KindCount { kind: DiscrepancyKind::LeftOnly, count: 1 });
    }

    #[test]
    fn ties_follow_kind_order() {
        let ds = vec![
            discrepancy(DiscrepancyKind::Mismatch, 1),
            discrepancy(DiscrepancyKind::RightOnly, 2),
        ];
        let kinds: Vec<DiscrepancyKind> = count_by_kind(&ds).iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![DiscrepancyKind::RightOnly, DiscrepancyKind::Mismatch]);
    }

    #[test]
    fn summary_counts() {
        let left = RecordSet::from_records(Side::Left, (1..=5).map(Record::new)).unwrap();
        let right = RecordSet::from_records(Side::Right, (3..=12).map(Record::new)).unwrap();
        let ds = vec![
            discrepancy(DiscrepancyKind::LeftOnly, 1),
            discrepancy(DiscrepancyKind::LeftOnly, 2),
            discrepancy(DiscrepancyKind::RightOnly, 6),
        ];
        let summary = compute_summary(&left, &right, KeyRange::new(1, 6).unwrap(), &ds);
        assert_eq!(summary.left_records, 5);
        assert_eq!(summary.right_records, 10);
        assert_eq!(summary.left_in_range, 5);
        assert_eq!(summary.right_in_range, 4);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.left_only, 2);
        assert_eq!(summary.right_only, 1);
        assert_eq!(summary.mismatches, 0);
        assert!(!summary.is_clean());
    }
}
