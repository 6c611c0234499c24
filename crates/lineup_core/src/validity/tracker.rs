//! Rejection accounting for counted validations.

use super::result::ValidationResult;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Counters for validated and rejected states, with a reason histogram.
///
/// Owned by whoever orchestrates one optimisation run and passed by `&mut`
/// into the [`ValidityKernel`](super::ValidityKernel).
///
/// # Examples
///
/// ```
/// use lineup_core::validity::{RejectionTracker, ValidationResult, VetoReason};
///
/// let mut tracker = RejectionTracker::new();
/// tracker.record(&ValidationResult::from_reasons(Vec::new()));
/// tracker.record(&ValidationResult::from_reasons(vec![VetoReason::MissingReason]));
///
/// assert_eq!(tracker.total_validated(), 2);
/// assert_eq!(tracker.total_rejected(), 1);
/// assert_eq!(tracker.rejection_rate(), 0.5);
///
/// tracker.reset();
/// assert_eq!(tracker.total_validated(), 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RejectionTracker {
    total_validated: u64,
    total_rejected: u64,
    reasons: BTreeMap<&'static str, u64>,
}

impl RejectionTracker {
    /// Create a tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one validation outcome.
    pub fn record(&mut self, result: &ValidationResult) {
        self.total_validated += 1;
        if !result.is_valid {
            self.total_rejected += 1;
            for reason in &result.veto_reasons {
                *self.reasons.entry(reason.code()).or_insert(0) += 1;
            }
        }
    }

    /// Number of validations recorded.
    pub fn total_validated(&self) -> u64 {
        self.total_validated
    }

    /// Number of validations that failed.
    pub fn total_rejected(&self) -> u64 {
        self.total_rejected
    }

    /// `total_rejected / total_validated`, or 0 before anything is recorded.
    pub fn rejection_rate(&self) -> f64 {
        if self.total_validated == 0 {
            0.0
        } else {
            self.total_rejected as f64 / self.total_validated as f64
        }
    }

    /// Count of each veto reason code, sorted by code.
    pub fn reason_histogram(&self) -> &BTreeMap<&'static str, u64> {
        &self.reasons
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        self.total_validated = 0;
        self.total_rejected = 0;
        self.reasons.clear();
    }
}

/// Thread-safe handle to a [`RejectionTracker`] shared by parallel runs.
///
/// Cloning the handle shares the same counters.
#[derive(Clone, Debug, Default)]
pub struct SharedRejectionTracker {
    inner: Arc<Mutex<RejectionTracker>>,
}

impl SharedRejectionTracker {
    /// Create a shared tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the tracker.
    ///
    /// A panic in another holder does not invalidate plain counters, so a
    /// poisoned lock is recovered rather than propagated.
    pub fn with<R>(&self, f: impl FnOnce(&mut RejectionTracker) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> RejectionTracker {
        self.with(|tracker| tracker.clone())
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.with(RejectionTracker::reset);
    }
}
