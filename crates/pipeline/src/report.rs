//! Alert rendering: chat digest and tabular export.
//!
//! Ordering is a formatting concern: the evaluator hands entries over in
//! source order, and this module sorts where the output format calls for it.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use shelfwatch_core::record::AlertEntry;

/// Warehouse breakdown is computed over at most this many leading entries
/// to keep digest size predictable on very large runs.
const WAREHOUSE_STAT_LIMIT: usize = 500;

/// How many worst-overdue entries the digest lists.
const TOP_OVERDUE_LIMIT: usize = 5;

/// Fixed column order of the tabular export.
pub const EXPORT_COLUMNS: [&str; 13] = [
    "Item Code",
    "Item Name",
    "Spec",
    "Batch No",
    "Warehouse",
    "Quantity",
    "Inbound Date",
    "Production Date",
    "Expiry Date",
    "Overdue Days",
    "Shelf Life Days",
    "Group Code",
    "Group Desc",
];

/// The short human-readable alert summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

/// The full alert list, sorted by overdue days descending, ready for
/// serialization by an external sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularExport {
    pub rows: Vec<AlertEntry>,
}

impl TabularExport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render the digest message.
///
/// Contains the generation timestamp, the total alert count, a
/// per-warehouse breakdown (first [`WAREHOUSE_STAT_LIMIT`] entries in input
/// order, sorted by warehouse code), and the worst five entries by overdue
/// days. With no entries the digest states zero alerts and skips both
/// sections.
pub fn summarize(entries: &[AlertEntry], generated_at: NaiveDateTime) -> Digest {
    let date = generated_at.format("%Y-%m-%d");
    let subject = if entries.is_empty() {
        format!("Material expiry alert report - {date}")
    } else {
        format!(
            "Material expiry alert report - {date} ({} expired batches)",
            entries.len()
        )
    };

    let mut body = String::from("Material expiry alert\n\n");
    body.push_str(&format!(
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    body.push_str(&format!("Expired batches: {}\n", entries.len()));

    if entries.is_empty() {
        body.push_str("\nNo expired batches found.\n");
        return Digest { subject, body };
    }

    let breakdown = warehouse_breakdown(entries);
    if !breakdown.is_empty() {
        body.push_str("\nWarehouse breakdown:\n");
        for (warehouse, count) in &breakdown {
            body.push_str(&format!("  {warehouse}: {count} batches\n"));
        }
    }

    body.push_str(&format!("\nWorst overdue (top {TOP_OVERDUE_LIMIT}):\n"));
    for (i, entry) in worst_overdue(entries).iter().enumerate() {
        body.push_str(&format!("{}. {}", i + 1, entry.item_code));
        if !entry.item_name.trim().is_empty() {
            body.push_str(&format!(" ({})", entry.item_name));
        }
        body.push('\n');
        body.push_str(&format!(
            "   batch: {}, warehouse: {}\n",
            entry.batch_no, entry.warehouse_code
        ));
        body.push_str(&format!(
            "   expired: {}, overdue: {} days\n",
            entry.expiry_date, entry.overdue_days
        ));
    }

    body.push_str("\nThe full list was sent by email; see the attachment.\nPlease handle promptly.");

    Digest { subject, body }
}

/// Convert entries to export rows, sorted by overdue days descending.
///
/// The sort is stable, so entries with equal overdue counts keep their
/// input order.
pub fn tabulate(entries: Vec<AlertEntry>) -> TabularExport {
    let mut rows = entries;
    rows.sort_by(|a, b| b.overdue_days.cmp(&a.overdue_days));
    TabularExport { rows }
}

/// Per-warehouse alert counts over the leading entries, keyed ascending.
fn warehouse_breakdown(entries: &[AlertEntry]) -> BTreeMap<String, usize> {
    let mut stats = BTreeMap::new();
    for entry in entries.iter().take(WAREHOUSE_STAT_LIMIT) {
        *stats.entry(entry.warehouse_code.clone()).or_insert(0) += 1;
    }
    stats
}

/// The worst entries by overdue days, descending.
fn worst_overdue(entries: &[AlertEntry]) -> Vec<&AlertEntry> {
    let mut refs: Vec<&AlertEntry> = entries.iter().collect();
    refs.sort_by(|a, b| b.overdue_days.cmp(&a.overdue_days));
    refs.truncate(TOP_OVERDUE_LIMIT);
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(item: &str, warehouse: &str, overdue_days: i64) -> AlertEntry {
        AlertEntry {
            item_code: item.into(),
            item_name: String::new(),
            spec: String::new(),
            batch_no: "B001".into(),
            warehouse_code: warehouse.into(),
            quantity: 1.0,
            inbound_date: String::new(),
            production_date: String::new(),
            expiry_date: "2024-05-01".into(),
            overdue_days,
            shelf_life_days: 0,
            group_code: String::new(),
            group_desc: String::new(),
        }
    }

    fn generated_at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn empty_digest_states_zero_and_skips_sections() {
        let digest = summarize(&[], generated_at());
        assert!(digest.body.contains("Expired batches: 0"));
        assert!(!digest.body.contains("Warehouse breakdown"));
        assert!(!digest.body.contains("Worst overdue"));
        assert_eq!(digest.subject, "Material expiry alert report - 2024-06-01");
    }

    #[test]
    fn empty_tabulate_is_empty_export() {
        let export = tabulate(Vec::new());
        assert!(export.is_empty());
    }

    #[test]
    fn digest_counts_and_timestamp() {
        let entries = vec![entry("A", "WH01", 3), entry("B", "WH02", 7)];
        let digest = summarize(&entries, generated_at());
        assert!(digest.body.contains("Generated: 2024-06-01 08:30:00"));
        assert!(digest.body.contains("Expired batches: 2"));
        assert!(digest.subject.contains("(2 expired batches)"));
    }

    #[test]
    fn warehouse_breakdown_sorted_ascending() {
        let entries = vec![
            entry("A", "WH09", 1),
            entry("B", "WH01", 2),
            entry("C", "WH09", 3),
        ];
        let digest = summarize(&entries, generated_at());
        let wh01 = digest.body.find("WH01: 1 batches").unwrap();
        let wh09 = digest.body.find("WH09: 2 batches").unwrap();
        assert!(wh01 < wh09);
    }

    #[test]
    fn warehouse_breakdown_caps_at_500_entries() {
        let mut entries: Vec<AlertEntry> = (0..500).map(|_| entry("A", "WH01", 1)).collect();
        entries.push(entry("B", "WH02", 1));
        let digest = summarize(&entries, generated_at());
        assert!(digest.body.contains("WH01: 500 batches"));
        assert!(!digest.body.contains("WH02"));
    }

    #[test]
    fn top_section_is_overdue_descending() {
        let entries = vec![
            entry("LOW", "WH01", 5),
            entry("HIGH", "WH01", 900),
            entry("MID", "WH01", 50),
        ];
        let digest = summarize(&entries, generated_at());
        let high = digest.body.find("1. HIGH").unwrap();
        let mid = digest.body.find("2. MID").unwrap();
        let low = digest.body.find("3. LOW").unwrap();
        assert!(high < mid && mid < low);
    }

    #[test]
    fn top_section_lists_at_most_five() {
        let entries: Vec<AlertEntry> =
            (0..8).map(|i| entry(&format!("ITM-{i}"), "WH01", i)).collect();
        let digest = summarize(&entries, generated_at());
        assert!(digest.body.contains("5. "));
        assert!(!digest.body.contains("6. "));
    }

    #[test]
    fn item_name_shown_only_when_non_empty() {
        let mut named = entry("NAMED", "WH01", 10);
        named.item_name = "Widget".into();
        let digest = summarize(&[named, entry("BARE", "WH01", 5)], generated_at());
        assert!(digest.body.contains("1. NAMED (Widget)"));
        assert!(digest.body.contains("2. BARE\n"));
    }

    #[test]
    fn tabulate_sorts_overdue_descending() {
        let export = tabulate(vec![
            entry("A", "WH01", 5),
            entry("B", "WH01", 900),
            entry("C", "WH01", 50),
        ]);
        let overdue: Vec<i64> = export.rows.iter().map(|r| r.overdue_days).collect();
        assert_eq!(overdue, vec![900, 50, 5]);
    }

    #[test]
    fn tabulate_is_stable_for_equal_overdue() {
        // Two entries with overdue 100 at positions 3 and 1: position 1's
        // entry must precede position 3's after sorting.
        let export = tabulate(vec![
            entry("P0", "WH01", 200),
            entry("P1", "WH01", 100),
            entry("P2", "WH01", 150),
            entry("P3", "WH01", 100),
        ]);
        let items: Vec<&str> = export.rows.iter().map(|r| r.item_code.as_str()).collect();
        assert_eq!(items, vec!["P0", "P2", "P1", "P3"]);
    }
}
