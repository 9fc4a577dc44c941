//! Soft assertion aggregation
//!
//! The web flow compares several independent fields per run. Aborting on the
//! first mismatch would hide the rest, so mismatches are recorded instead and
//! the run fails exactly once, at the end, with every entry in the report.

use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Ordered collector of field-level mismatches.
///
/// `check` never fails; `finalize` consumes the collector and fails the run
/// iff at least one entry was recorded. Entry order is evaluation order.
#[derive(Debug, Default)]
pub struct SoftAssertions {
    failures: Vec<String>,
}

impl SoftAssertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `actual` to `expected` for strict string equality.
    ///
    /// On mismatch, records an entry and keeps going. An unexpected value
    /// from the extraction step (an empty string for a missing element, say)
    /// is an ordinary mismatch, never a crash.
    pub fn check(&mut self, field: &str, actual: &str, expected: &str) {
        if actual == expected {
            debug!("{field}: ok");
            return;
        }
        self.failures.push(format!(
            "{field} Assertion Failed: Actual {field} is \"{actual}\" and Expected {field} is \"{expected}\""
        ));
    }

    /// Number of recorded mismatches so far.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Close out the run. Empty record → success, silently. Otherwise the
    /// single failure report: all entries, in order, joined by newline.
    pub fn finalize(self) -> E2eResult<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(E2eError::AssertionFailed(self.failures.join("\n")))
    }
}
