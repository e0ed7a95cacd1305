//! Expiry-date sanitation.
//!
//! Parses each record's expiry-date string and drops records whose date is
//! unparseable or implausible. Dropped records are counted and a few samples
//! are logged for operator visibility; diagnostics never affect downstream
//! logic.

use chrono::{Datelike, NaiveDate};
use shelfwatch_core::record::{
    InventoryRecord, RejectReason, RejectedRecord, ValidatedRecord,
};
use tracing::warn;

/// Expiry-date strings must be exact calendar dates in this format.
const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Years before this are treated as data-entry errors.
const MIN_PLAUSIBLE_YEAR: i32 = 2000;

/// Years more than this far past the reference year are treated as
/// data-entry errors.
const MAX_YEARS_AHEAD: i32 = 10;

/// How many rejected records to log as illustrative samples.
const REJECT_SAMPLE_LIMIT: usize = 3;

/// Result of the sanitation stage.
#[derive(Debug, Clone, Default)]
pub struct SanitizeOutcome {
    pub kept: Vec<ValidatedRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl SanitizeOutcome {
    pub fn rejected_count(&self, reason: RejectReason) -> usize {
        self.rejected.iter().filter(|r| r.reason == reason).count()
    }
}

/// Parse and validate every record's expiry date.
///
/// Records whose expiry string does not parse as `YYYY-MM-DD` are rejected
/// as [`RejectReason::UnparseableDate`]; parsed dates with a year outside
/// `[2000, reference_year + 10]` are rejected as
/// [`RejectReason::AbnormalYear`]. Never fatal: an empty input yields an
/// empty outcome.
pub fn sanitize(records: Vec<InventoryRecord>, reference_date: NaiveDate) -> SanitizeOutcome {
    let max_plausible_year = reference_date.year() + MAX_YEARS_AHEAD;
    let mut outcome = SanitizeOutcome::default();

    for record in records {
        let parsed = record
            .expiry_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), EXPIRY_DATE_FORMAT).ok());

        match parsed {
            None => {
                outcome
                    .rejected
                    .push(RejectedRecord::from_record(&record, RejectReason::UnparseableDate));
            }
            Some(expiry) if expiry.year() < MIN_PLAUSIBLE_YEAR || expiry.year() > max_plausible_year => {
                outcome
                    .rejected
                    .push(RejectedRecord::from_record(&record, RejectReason::AbnormalYear));
            }
            Some(expiry) => {
                outcome.kept.push(ValidatedRecord { record, expiry });
            }
        }
    }

    log_rejects(&outcome);
    outcome
}

fn log_rejects(outcome: &SanitizeOutcome) {
    if outcome.rejected.is_empty() {
        return;
    }

    let invalid = outcome.rejected_count(RejectReason::UnparseableDate);
    let abnormal = outcome.rejected_count(RejectReason::AbnormalYear);
    warn!(
        invalid_dates = invalid,
        abnormal_years = abnormal,
        kept = outcome.kept.len(),
        "dropped records with invalid or implausible expiry dates"
    );

    for sample in outcome.rejected.iter().take(REJECT_SAMPLE_LIMIT) {
        warn!(
            item_code = %sample.item_code,
            batch_no = %sample.batch_no,
            raw_expiry = %sample.raw_expiry,
            reason = sample.reason.as_str(),
            "rejected expiry-date sample"
        );
    }
}
