//! RAG status aggregation for the compliance dashboard.
//!
//! The RAG status on each record is trusted as given; it is never
//! recomputed from the due date here.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{CategoryBreakdown, ComplianceRecord, RagCounts, RagSummary};

/// Row label for records without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Category row a record is counted under.
///
/// Known categories use their canonical label so spelling variants merge.
/// Anything else keeps its trimmed label as received.
pub fn category_label(record: &ComplianceRecord) -> String {
    match record.category_kind() {
        Ok(category) => category.label().to_string(),
        Err(_) => {
            let raw = record.category.trim();
            if raw.is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                raw.to_string()
            }
        }
    }
}

/// Count records per RAG status and per category in a single pass.
///
/// Only records whose RAG status is not recognized are left out of the
/// counts; they are reported in `skipped`. Every counted record appears in
/// exactly one category row, and rows are ordered by label.
pub fn aggregate(records: &[ComplianceRecord]) -> RagSummary {
    let mut counts = RagCounts::default();
    let mut by_category: BTreeMap<String, RagCounts> = BTreeMap::new();
    let mut skipped = 0u64;

    for record in records {
        let rag = match record.rag() {
            Ok(rag) => rag,
            Err(_) => {
                debug!(
                    record_id = %record.id,
                    rag_status = %record.rag_status,
                    "Skipping record with unrecognized RAG status"
                );
                skipped += 1;
                continue;
            }
        };

        counts.increment(rag);
        by_category.entry(category_label(record)).or_default().increment(rag);
    }

    RagSummary {
        total: counts.sum(),
        counts,
        by_category: by_category
            .into_iter()
            .map(|(label, counts)| CategoryBreakdown::new(label, counts))
            .collect(),
        skipped,
    }
}

/// Aggregate raw JSON records as posted by a client.
///
/// A value that does not decode into a record (not an object, no id, no
/// usable due date) is skipped like an unrecognized RAG status instead of
/// failing the batch.
pub fn aggregate_values(values: &[JsonValue]) -> RagSummary {
    let mut undecodable = 0u64;
    let records: Vec<ComplianceRecord> = values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match ComplianceRecord::deserialize(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(index = index, error = %e, "Skipping undecodable record");
                undecodable += 1;
                None
            }
        })
        .collect();

    let mut summary = aggregate(&records);
    summary.skipped += undecodable;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RagStatus;
    use chrono::NaiveDate;
    use fake::{Fake, Faker};
    use serde_json::json;
    use uuid::Uuid;

    fn record(category: &str, rag: &str) -> ComplianceRecord {
        ComplianceRecord::new(
            Uuid::new_v4().to_string(),
            category,
            NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
            "In Progress",
            rag,
        )
    }

    /// Random records, some with values the aggregator must skip.
    fn random_records() -> Vec<ComplianceRecord> {
        const CATEGORIES: [&str; 10] = [
            "GST", "Direct Tax", "Payroll", "MCA", "FEMA", "FP&A", "gst", "VAT", "Labour Law", "",
        ];
        const RAGS: [&str; 5] = ["Green", "Amber", "Red", "red", "Blue"];

        let len: usize = (0..200).fake();
        (0..len)
            .map(|_| {
                let category = CATEGORIES[(0..CATEGORIES.len()).fake::<usize>()];
                let rag = RAGS[(0..RAGS.len()).fake::<usize>()];
                let mut r = record(category, rag);
                r.due_date = Faker.fake::<NaiveDate>();
                r
            })
            .collect()
    }

    fn has_unknown_rag(r: &ComplianceRecord) -> bool {
        r.rag().is_err()
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.counts, RagCounts::default());
        assert!(summary.by_category.is_empty());
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn test_aggregate_counts() {
        let records = vec![
            record("GST", "Green"),
            record("GST", "Red"),
            record("Payroll", "Amber"),
            record("GST", "Green"),
        ];

        let summary = aggregate(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.counts.green, 2);
        assert_eq!(summary.counts.amber, 1);
        assert_eq!(summary.counts.red, 1);

        assert_eq!(summary.by_category.len(), 2);
        let gst = &summary.by_category[0];
        assert_eq!(gst.category, "GST");
        assert_eq!((gst.green, gst.amber, gst.red, gst.total), (2, 0, 1, 3));
        let payroll = &summary.by_category[1];
        assert_eq!(payroll.category, "Payroll");
        assert_eq!((payroll.green, payroll.amber, payroll.red, payroll.total), (0, 1, 0, 1));
    }

    #[test]
    fn test_aggregate_orders_categories_by_label() {
        let records = vec![
            record("Payroll", "Green"),
            record("GST", "Green"),
            record("FP&A", "Green"),
            record("Direct Tax", "Green"),
            record("MCA", "Green"),
            record("FEMA", "Green"),
        ];

        let labels: Vec<String> = aggregate(&records)
            .by_category
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(labels, vec!["Direct Tax", "FEMA", "FP&A", "GST", "MCA", "Payroll"]);
    }

    #[test]
    fn test_aggregate_merges_category_spellings() {
        let records = vec![record("GST", "Green"), record("gst", "amber"), record(" Gst ", "RED")];

        let summary = aggregate(&records);
        assert_eq!(summary.by_category.len(), 1);
        assert_eq!(summary.by_category[0].category, "GST");
        assert_eq!(summary.by_category[0].total, 3);
    }

    #[test]
    fn test_aggregate_skips_unknown_rag_status() {
        let records = vec![record("GST", "Green"), record("GST", "Blue"), record("MCA", "")];

        let summary = aggregate(&records);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.by_category.len(), 1);
    }

    #[test]
    fn test_aggregate_counts_unlisted_category() {
        let records = vec![record("Labour Law", "Red"), record("GST", "Green")];

        let summary = aggregate(&records);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.counts.red, 1);
        assert_eq!(summary.counts.green, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(
            summary.by_category,
            vec![
                CategoryBreakdown::new("GST", RagCounts { green: 1, amber: 0, red: 0 }),
                CategoryBreakdown::new("Labour Law", RagCounts { green: 0, amber: 0, red: 1 }),
            ]
        );
    }

    #[test]
    fn test_aggregate_blank_category_is_uncategorized() {
        let records = vec![record("  ", "Amber"), record("", "Green")];

        let summary = aggregate(&records);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.by_category.len(), 1);
        assert_eq!(summary.by_category[0].category, UNCATEGORIZED);
        assert_eq!(summary.by_category[0].total, 2);
    }

    #[test]
    fn test_aggregate_invariants_hold_for_random_input() {
        for _ in 0..50 {
            let records = random_records();
            let unknown_rag = records.iter().filter(|r| has_unknown_rag(r)).count() as u64;
            let summary = aggregate(&records);

            let counted = records.len() as u64 - unknown_rag;
            assert_eq!(summary.skipped, unknown_rag);
            assert_eq!(summary.total, counted);
            assert_eq!(summary.counts.sum(), counted);

            let category_total: u64 = summary.by_category.iter().map(|c| c.total).sum();
            assert_eq!(category_total, counted);
            for c in &summary.by_category {
                assert_eq!(c.green + c.amber + c.red, c.total);
                let expected = records
                    .iter()
                    .filter(|r| !has_unknown_rag(r))
                    .filter(|r| category_label(r) == c.category)
                    .count() as u64;
                assert_eq!(c.total, expected);
            }

            for status in RagStatus::ALL {
                let expected = records
                    .iter()
                    .filter(|r| r.rag().ok() == Some(status))
                    .count() as u64;
                assert_eq!(summary.counts.get(status), expected);
            }
        }
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let records = random_records();
        assert_eq!(aggregate(&records), aggregate(&records));
    }

    #[test]
    fn test_aggregate_ignores_input_order() {
        let mut records = random_records();
        let forward = aggregate(&records);
        records.reverse();
        assert_eq!(aggregate(&records), forward);
    }

    #[test]
    fn test_aggregate_values_skips_malformed_entries() {
        let values = vec![
            json!({"id": "ci-1", "category": "GST", "dueDate": "2024-07-20", "status": "Filed", "ragStatus": "Green"}),
            json!({"id": "ci-42", "category": "Labour Law", "dueDate": "2024-07-20", "ragStatus": "Red"}),
            json!({"id": "ci-3", "category": "GST", "dueDate": "2024-07-20", "ragStatus": null}),
            json!({"id": "ci-4", "category": "GST", "dueDate": "soon", "ragStatus": "Red"}),
            json!("not a record"),
        ];

        let summary = aggregate_values(&values);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.counts.green, 1);
        assert_eq!(summary.counts.red, 1);
        assert_eq!(summary.by_category.len(), 2);
    }
}
