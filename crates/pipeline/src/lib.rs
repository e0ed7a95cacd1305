//! Expiry-detection and anomaly-filtering pipeline.
//!
//! Three pure stages over explicit inputs, no I/O and no clock reads:
//! - [`sanitize`](sanitize::sanitize): parse and validate expiry-date strings
//! - [`evaluate`](evaluate::evaluate): compute overdue days, apply the ceiling
//! - [`report`]: render the digest and the tabular export
//!
//! Each stage returns a best-effort outcome (kept + rejected-with-reason)
//! rather than an error; an empty input yields an empty output.

pub mod evaluate;
pub mod report;
pub mod sanitize;

pub use evaluate::{evaluate, EvaluationOutcome};
pub use report::{summarize, tabulate, Digest, TabularExport};
pub use sanitize::{sanitize, SanitizeOutcome};
