use std::sync::atomic::{AtomicBool, Ordering};

/// Live-collector count above which the registry logs a warning.
/// A registry that keeps growing means transactions are started but never
/// reach commit or rollback, so their hooks never fire.
pub const COLLECTOR_WARN_THRESHOLD: usize = 1024;

/// Enable verbose per-item scheduling logs (for debugging)
pub const DEBUG_SCHEDULING: bool = false;

static METRICS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Whether metric counters are recorded
pub fn metrics_enabled() -> bool {
    METRICS_ENABLED.load(Ordering::Relaxed)
}

/// Toggle metric recording at runtime
pub fn set_metrics_enabled(enabled: bool) {
    METRICS_ENABLED.store(enabled, Ordering::Relaxed);
}
