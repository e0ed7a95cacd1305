//! Overdue computation and alert construction.
//!
//! Selects validated records that are strictly past expiry, computes the
//! whole-day overdue count, and drops entries whose overdue magnitude is
//! implausible. Surviving records are coerced to display form.

use chrono::NaiveDate;
use shelfwatch_core::record::{
    AlertEntry, RejectReason, RejectedRecord, ValidatedRecord,
};
use tracing::warn;

/// Result of the evaluation stage.
#[derive(Debug, Clone, Default)]
pub struct EvaluationOutcome {
    pub alerts: Vec<AlertEntry>,
    /// Entries dropped for an overdue count above the configured ceiling.
    pub rejected: Vec<RejectedRecord>,
}

/// Build the alert list from validated records.
///
/// A record produces an alert iff its expiry date is strictly earlier than
/// `reference_date` (same-day expiry does not alert) and its overdue-day
/// count is within `max_reasonable_overdue_days`. Counts beyond the ceiling
/// are rejected as probable data-entry errors. Returns an empty outcome,
/// not an error, when there is nothing to alert.
pub fn evaluate(
    records: Vec<ValidatedRecord>,
    reference_date: NaiveDate,
    max_reasonable_overdue_days: i64,
) -> EvaluationOutcome {
    let mut outcome = EvaluationOutcome::default();

    for validated in records {
        if validated.expiry >= reference_date {
            continue;
        }

        let overdue_days = (reference_date - validated.expiry).num_days();
        if overdue_days > max_reasonable_overdue_days {
            outcome.rejected.push(RejectedRecord::from_record(
                &validated.record,
                RejectReason::OverdueBeyondCeiling,
            ));
            continue;
        }

        outcome.alerts.push(to_alert_entry(validated, overdue_days));
    }

    if !outcome.rejected.is_empty() {
        warn!(
            dropped = outcome.rejected.len(),
            ceiling_days = max_reasonable_overdue_days,
            "dropped entries with implausible overdue counts"
        );
    }

    outcome
}

/// Coerce a validated record to display form.
///
/// Absent text fields become empty strings, absent numerics become zero;
/// the coercion is total and never drops a record.
fn to_alert_entry(validated: ValidatedRecord, overdue_days: i64) -> AlertEntry {
    let expiry_date = validated.expiry.format("%Y-%m-%d").to_string();
    let record = validated.record;
    AlertEntry {
        item_code: record.item_code,
        item_name: record.item_name.unwrap_or_default(),
        spec: record.spec.unwrap_or_default(),
        batch_no: record.batch_no,
        warehouse_code: record.warehouse_code,
        quantity: record.quantity,
        inbound_date: record.inbound_date.unwrap_or_default(),
        production_date: record.production_date.unwrap_or_default(),
        expiry_date,
        overdue_days,
        shelf_life_days: record.shelf_life_days.unwrap_or(0),
        group_code: record.group_code.unwrap_or_default(),
        group_desc: record.group_desc.unwrap_or_default(),
    }
}
