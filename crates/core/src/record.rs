//! Domain records flowing through the expiry pipeline.
//!
//! `InventoryRecord` → `ValidatedRecord` → `AlertEntry` is a filter chain:
//! each stage either passes a record through (enriched) or drops it with an
//! explicit [`RejectReason`]. Records are immutable once fetched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw batch/expiry row as returned by the data source.
///
/// Optional fields may be absent in the source (left joins against the item
/// master and group tables); the expiry date is a free-form string from a
/// legacy import and may be malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub item_code: String,
    pub warehouse_code: String,
    pub batch_no: String,
    pub quantity: f64,
    pub item_name: Option<String>,
    pub spec: Option<String>,
    pub group_code: Option<String>,
    pub inbound_date: Option<String>,
    pub production_date: Option<String>,
    pub expiry_date: Option<String>,
    pub group_desc: Option<String>,
    pub shelf_life_days: Option<i32>,
}

/// An inventory record whose expiry-date string parsed to a plausible
/// calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub record: InventoryRecord,
    pub expiry: NaiveDate,
}

/// A confirmed-expired batch, coerced to display form.
///
/// Text fields absent at the source are normalized to the empty string,
/// numeric fields to zero. Invariant: `0 < overdue_days <= ceiling`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEntry {
    pub item_code: String,
    pub item_name: String,
    pub spec: String,
    pub batch_no: String,
    pub warehouse_code: String,
    pub quantity: f64,
    pub inbound_date: String,
    pub production_date: String,
    pub expiry_date: String,
    pub overdue_days: i64,
    pub shelf_life_days: i32,
    pub group_code: String,
    pub group_desc: String,
}

/// Why a record was dropped by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// Expiry-date string did not parse as `YYYY-MM-DD`.
    UnparseableDate,
    /// Parsed year outside the plausibility window `[2000, ref_year + 10]`.
    AbnormalYear,
    /// Overdue-day count above the configured ceiling.
    OverdueBeyondCeiling,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::UnparseableDate => "unparseable_date",
            RejectReason::AbnormalYear => "abnormal_year",
            RejectReason::OverdueBeyondCeiling => "overdue_beyond_ceiling",
        }
    }
}

/// A dropped record, kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub item_code: String,
    pub batch_no: String,
    /// The raw expiry-date string as it came from the source.
    pub raw_expiry: String,
    pub reason: RejectReason,
}

impl RejectedRecord {
    pub fn from_record(record: &InventoryRecord, reason: RejectReason) -> Self {
        Self {
            item_code: record.item_code.clone(),
            batch_no: record.batch_no.clone(),
            raw_expiry: record.expiry_date.clone().unwrap_or_default(),
            reason,
        }
    }
}
