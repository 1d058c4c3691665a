//! Transaction-scoped work aggregation
//!
//! Call sites feed items into [`Scheduler::schedule`] without caring about
//! batching. All eligible items raised inside one unit-of-work land in one
//! [`Collector`]; when the transaction commits, the collector materializes
//! into a single [`Workpackage`] submitted to the injected
//! [`WorkpackageQueue`], exactly once. A rolled-back transaction submits
//! nothing. Items raised outside any transaction are dispatched
//! immediately, one workpackage per item.

pub mod key;
pub mod persistence;

mod collector;
mod hooks;
mod policy;
mod queue;
mod registry;
mod integration_tests;

pub use collector::Collector;
pub use hooks::{TransactionCallback, TransactionHooks, TransactionOutcome};
pub use key::{CollectorKey, ProcessorId, TrxId, UseCaseId};
pub use policy::SchedulerPolicy;
pub use queue::{SubmissionHandle, Workpackage, WorkpackageQueue};
pub use registry::Scheduler;
