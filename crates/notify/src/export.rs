//! CSV serialization of the tabular export.
//!
//! The formatter hands over rows already sorted; this sink only turns them
//! into an opaque byte blob the email channel can attach.

use chrono::NaiveDateTime;
use shelfwatch_pipeline::report::{TabularExport, EXPORT_COLUMNS};

use crate::traits::{AttachmentPayload, NotifyError};

pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Serialize the export to CSV bytes with the fixed header row.
pub fn to_csv_bytes(export: &TabularExport) -> Result<Vec<u8>, NotifyError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|e| NotifyError::Export(e.to_string()))?;

    for row in &export.rows {
        writer
            .write_record(&[
                row.item_code.as_str(),
                row.item_name.as_str(),
                row.spec.as_str(),
                row.batch_no.as_str(),
                row.warehouse_code.as_str(),
                &row.quantity.to_string(),
                row.inbound_date.as_str(),
                row.production_date.as_str(),
                row.expiry_date.as_str(),
                &row.overdue_days.to_string(),
                &row.shelf_life_days.to_string(),
                row.group_code.as_str(),
                row.group_desc.as_str(),
            ])
            .map_err(|e| NotifyError::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| NotifyError::Export(e.to_string()))
}

/// Timestamp-derived attachment filename for a run.
pub fn attachment_filename(generated_at: NaiveDateTime) -> String {
    format!("expiry_alerts_{}.csv", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Build the email attachment payload for a non-empty export.
pub fn to_attachment(
    export: &TabularExport,
    generated_at: NaiveDateTime,
) -> Result<AttachmentPayload, NotifyError> {
    Ok(AttachmentPayload {
        filename: attachment_filename(generated_at),
        content_type: EXPORT_CONTENT_TYPE.to_string(),
        bytes: to_csv_bytes(export)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwatch_core::record::AlertEntry;
    use shelfwatch_pipeline::report::tabulate;

    fn entry(item: &str, overdue_days: i64) -> AlertEntry {
        AlertEntry {
            item_code: item.into(),
            item_name: "Widget".into(),
            spec: "10mm".into(),
            batch_no: "B001".into(),
            warehouse_code: "WH01".into(),
            quantity: 12.5,
            inbound_date: "2023-01-01".into(),
            production_date: "2023-01-02".into(),
            expiry_date: "2024-05-01".into(),
            overdue_days,
            shelf_life_days: 365,
            group_code: "G1".into(),
            group_desc: "Raw material".into(),
        }
    }

    #[test]
    fn header_row_matches_fixed_columns() {
        let bytes = to_csv_bytes(&TabularExport::default()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Item Code,Item Name,Spec,Batch No,Warehouse,Quantity"));
    }

    #[test]
    fn rows_serialize_in_export_order() {
        let export = tabulate(vec![entry("A", 5), entry("B", 50)]);
        let bytes = to_csv_bytes(&export).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("B,"), "worst overdue first: {}", lines[1]);
        assert!(lines[2].starts_with("A,"));
    }

    #[test]
    fn row_carries_all_thirteen_fields() {
        let export = TabularExport {
            rows: vec![entry("A", 31)],
        };
        let bytes = to_csv_bytes(&export).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "A,Widget,10mm,B001,WH01,12.5,2023-01-01,2023-01-02,2024-05-01,31,365,G1,Raw material"
        );
    }

    #[test]
    fn filename_derives_from_timestamp() {
        let generated_at = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 30, 15)
            .unwrap();
        assert_eq!(
            attachment_filename(generated_at),
            "expiry_alerts_20240601_083015.csv"
        );
    }

    #[test]
    fn attachment_payload_is_csv() {
        let export = TabularExport {
            rows: vec![entry("A", 31)],
        };
        let generated_at = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let payload = to_attachment(&export, generated_at).unwrap();
        assert_eq!(payload.content_type, "text/csv");
        assert!(!payload.bytes.is_empty());
    }
}
