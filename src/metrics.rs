// Metrics tracking for scheduler operations
// Process-wide atomics: `schedule` is called from arbitrary threads, so
// counters aggregate across all transactions.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct SchedulerMetrics {
    /// Items accepted by `schedule` (eligible ones)
    items_scheduled: AtomicU64,
    /// Items rejected by the eligibility policy
    items_ineligible: AtomicU64,
    /// Collectors created for transactional items
    collectors_created: AtomicU64,
    /// Transaction-less items dispatched one-by-one
    immediate_submissions: AtomicU64,
    /// Workpackages handed to the queue
    workpackages_submitted: AtomicU64,
    /// Collectors finalized with no models and no forced enqueue
    empty_collectors_skipped: AtomicU64,
    /// Collectors discarded because their transaction rolled back
    rollback_discards: AtomicU64,
    /// Queue submissions that returned an error
    submission_failures: AtomicU64,
}

static METRICS: SchedulerMetrics = SchedulerMetrics {
    items_scheduled: AtomicU64::new(0),
    items_ineligible: AtomicU64::new(0),
    collectors_created: AtomicU64::new(0),
    immediate_submissions: AtomicU64::new(0),
    workpackages_submitted: AtomicU64::new(0),
    empty_collectors_skipped: AtomicU64::new(0),
    rollback_discards: AtomicU64::new(0),
    submission_failures: AtomicU64::new(0),
};

/// Snapshot of the scheduler counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub items_scheduled: u64,
    pub items_ineligible: u64,
    pub collectors_created: u64,
    pub immediate_submissions: u64,
    pub workpackages_submitted: u64,
    pub empty_collectors_skipped: u64,
    pub rollback_discards: u64,
    pub submission_failures: u64,
}

/// Public interface for metrics tracking
pub mod metrics_api {
    use super::*;

    fn bump(counter: &AtomicU64) {
        if crate::config::metrics_enabled() {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_item_scheduled() {
        bump(&METRICS.items_scheduled);
    }

    pub fn record_item_ineligible() {
        bump(&METRICS.items_ineligible);
    }

    pub fn record_collector_created() {
        bump(&METRICS.collectors_created);
    }

    pub fn record_immediate_submission() {
        bump(&METRICS.immediate_submissions);
    }

    pub fn record_workpackage_submitted() {
        bump(&METRICS.workpackages_submitted);
    }

    pub fn record_empty_collector_skipped() {
        bump(&METRICS.empty_collectors_skipped);
    }

    pub fn record_rollback_discard() {
        bump(&METRICS.rollback_discards);
    }

    pub fn record_submission_failure() {
        bump(&METRICS.submission_failures);
    }

    /// Get a snapshot of the current counters
    pub fn snapshot() -> SchedulerStats {
        SchedulerStats {
            items_scheduled: METRICS.items_scheduled.load(Ordering::Relaxed),
            items_ineligible: METRICS.items_ineligible.load(Ordering::Relaxed),
            collectors_created: METRICS.collectors_created.load(Ordering::Relaxed),
            immediate_submissions: METRICS.immediate_submissions.load(Ordering::Relaxed),
            workpackages_submitted: METRICS.workpackages_submitted.load(Ordering::Relaxed),
            empty_collectors_skipped: METRICS.empty_collectors_skipped.load(Ordering::Relaxed),
            rollback_discards: METRICS.rollback_discards.load(Ordering::Relaxed),
            submission_failures: METRICS.submission_failures.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub fn reset() {
        METRICS.items_scheduled.store(0, Ordering::Relaxed);
        METRICS.items_ineligible.store(0, Ordering::Relaxed);
        METRICS.collectors_created.store(0, Ordering::Relaxed);
        METRICS.immediate_submissions.store(0, Ordering::Relaxed);
        METRICS.workpackages_submitted.store(0, Ordering::Relaxed);
        METRICS.empty_collectors_skipped.store(0, Ordering::Relaxed);
        METRICS.rollback_discards.store(0, Ordering::Relaxed);
        METRICS.submission_failures.store(0, Ordering::Relaxed);
    }
}

/// Serializes tests that flip the metrics toggle or assert on the global
/// counters. Counters are process-wide, so unrelated tests bump them
/// concurrently.
#[cfg(test)]
pub(crate) static METRICS_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
