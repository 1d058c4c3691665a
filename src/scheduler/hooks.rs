//! External transaction commit/rollback hook interface
//!
//! The scheduler never detects transaction outcomes itself. The host's
//! transaction manager implements [`TransactionHooks`] and guarantees that
//! each registered callback fires exactly once, with the terminal outcome,
//! strictly after that outcome is durable.

use crate::TxBatchResult;

use super::key::CollectorKey;

/// Terminal outcome of a unit-of-work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    Commit,
    Rollback,
}

/// Callback fired once per registered `CollectorKey` when the transaction
/// reaches its terminal outcome. Errors propagate to whatever drives the
/// transaction manager.
pub type TransactionCallback = Box<dyn FnOnce(TransactionOutcome) -> TxBatchResult<()> + Send>;

/// Commit-hook registry supplied by the host transaction infrastructure.
///
/// Contract:
/// - exactly one callback invocation per registered key;
/// - `Commit` is delivered only after the transaction durably committed,
///   `Rollback` only after it was abandoned;
/// - registering the same key twice within one transaction is a caller
///   error and should be rejected.
pub trait TransactionHooks: Send + Sync + 'static {
    fn register_hook(
        &self,
        key: CollectorKey,
        callback: TransactionCallback,
    ) -> TxBatchResult<()>;
}
