//! # txbatch
//!
//! Transaction-scoped work aggregation with commit-time workpackage
//! dispatch.
//!
//! Many independent call sites raise items during one unit-of-work; this
//! crate coalesces everything raised inside the same transaction into one
//! de-duplicated workpackage and hands it to an execution queue exactly
//! once, after the transaction durably committed. Rolled-back transactions
//! submit nothing; items raised outside any transaction are dispatched
//! immediately, one package per item.
//!
//! The transaction manager and the execution queue are external
//! collaborators, injected behind the [`TransactionHooks`] and
//! [`WorkpackageQueue`] traits. Per-use-case behavior (eligibility,
//! context/transaction/model extraction) lives in a [`SchedulerPolicy`]
//! implementation.

pub mod collections;
pub mod config;
pub mod error;
pub mod metrics;
pub mod scheduler;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{TxBatchError, TxBatchResult};
pub use scheduler::{
    Collector, CollectorKey, ProcessorId, Scheduler, SchedulerPolicy, SubmissionHandle,
    TransactionCallback, TransactionHooks, TransactionOutcome, TrxId, UseCaseId, Workpackage,
    WorkpackageQueue,
};

/// Get the version of the txbatch crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
