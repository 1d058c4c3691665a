use std::hash::Hash;

use super::collector::Collector;
use super::key::{ProcessorId, TrxId, UseCaseId};

/// Per-use-case scheduling policy.
///
/// One implementation exists per concrete use case ("mail changed invoices",
/// "reindex touched products", ...). The policy is stateless apart from its
/// identities: all mutable state lives in the per-transaction [`Collector`].
///
/// A policy decides, for every incoming item:
/// - whether the item participates at all ([`is_eligible`](Self::is_eligible)),
/// - which unit-of-work it belongs to
///   ([`extract_transaction_id`](Self::extract_transaction_id)),
/// - the context a fresh collector is created with
///   ([`extract_context`](Self::extract_context)),
/// - the model the workpackage will carry for it
///   ([`extract_model`](Self::extract_model)).
pub trait SchedulerPolicy: Sized + Send + Sync + 'static {
    /// Caller-supplied business event fed into `schedule`.
    type Item;

    /// Configuration/environment value threaded through to the workpackage.
    /// Captured once when the collector is created.
    type Context: Clone + Send + 'static;

    /// The de-duplicated object ultimately carried inside a workpackage.
    /// Equality defines de-duplication.
    type Model: Eq + Hash + Clone + Send + 'static;

    /// Identity of this use case; part of the collector/hook key.
    fn use_case_id(&self) -> UseCaseId;

    /// Identity of the processor that will execute the workpackage.
    fn processor_id(&self) -> ProcessorId;

    /// Whether the item participates in scheduling at all.
    ///
    /// Callers invoke `schedule` unconditionally; ineligible items are a
    /// silent no-op. Accepts everything by default.
    fn is_eligible(&self, _item: &Self::Item) -> bool {
        true
    }

    /// Context for a new collector, derived from the first eligible item of
    /// a transaction. Later items in the same transaction do not re-derive
    /// context.
    fn extract_context(&self, item: &Self::Item) -> Self::Context;

    /// The unit-of-work the item belongs to, or `None` for items raised
    /// outside any transaction (dispatched immediately, one workpackage
    /// per item).
    fn extract_transaction_id(&self, item: &Self::Item) -> Option<TrxId>;

    /// The model to add to the collector's set, or `None` if the item
    /// contributes no model (e.g. it only carries a parameter).
    ///
    /// This is the one hook that receives the live collector, so a use case
    /// can annotate the eventual workpackage via
    /// [`Collector::set_parameter`].
    fn extract_model(
        &self,
        collector: &mut Collector<Self::Context, Self::Model>,
        item: &Self::Item,
    ) -> Option<Self::Model>;

    /// Whether a workpackage is submitted even when no models were
    /// collected. Defaults to false: an all-`None` transaction produces
    /// nothing.
    fn enqueue_when_empty(&self) -> bool {
        false
    }
}
