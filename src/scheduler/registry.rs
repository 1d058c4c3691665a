use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config;
use crate::error::{TxBatchError, TxBatchResult};
use crate::internal_error;
use crate::metrics::metrics_api;

use super::collector::Collector;
use super::hooks::{TransactionCallback, TransactionHooks, TransactionOutcome};
use super::key::{CollectorKey, TrxId};
use super::policy::SchedulerPolicy;
use super::queue::WorkpackageQueue;

type CollectorHandle<C, M> = Arc<Mutex<Collector<C, M>>>;
type CollectorMap<C, M> = HashMap<CollectorKey, CollectorHandle<C, M>>;

/// The scheduling engine for one use case.
///
/// Binds a [`SchedulerPolicy`] to the external transaction-hook mechanism:
/// for each (use case, transaction) pair it lazily creates at most one
/// [`Collector`], registers a commit/rollback hook with the transaction,
/// and replays every further eligible item into that collector. When the
/// transaction commits, the collector is finalized exactly once; when it
/// rolls back, the collector is discarded.
///
/// Cloning is cheap and shares the same registry; the queue and transaction
/// manager are injected at construction.
pub struct Scheduler<P, Q>
where
    P: SchedulerPolicy,
    Q: WorkpackageQueue<P::Context, P::Model>,
{
    inner: Arc<SchedulerInner<P, Q>>,
}

impl<P, Q> Clone for Scheduler<P, Q>
where
    P: SchedulerPolicy,
    Q: WorkpackageQueue<P::Context, P::Model>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SchedulerInner<P, Q>
where
    P: SchedulerPolicy,
{
    policy: P,
    queue: Q,
    transactions: Arc<dyn TransactionHooks>,
    collectors: Mutex<CollectorMap<P::Context, P::Model>>,
}

impl<P, Q> Scheduler<P, Q>
where
    P: SchedulerPolicy,
    Q: WorkpackageQueue<P::Context, P::Model>,
{
    /// Create a scheduler for one use case.
    ///
    /// Fails with `InvalidArgument` if the policy reports blank identities:
    /// both ids end up in registry/hook keys and workpackages, where empty
    /// strings only produce collisions and unroutable packages.
    pub fn new(
        policy: P,
        queue: Q,
        transactions: Arc<dyn TransactionHooks>,
    ) -> TxBatchResult<Self> {
        if policy.use_case_id().is_empty() {
            return Err(TxBatchError::invalid_argument(
                "use_case_id",
                "must not be empty",
            ));
        }
        if policy.processor_id().is_empty() {
            return Err(TxBatchError::invalid_argument(
                "processor_id",
                "must not be empty",
            ));
        }

        Ok(Self {
            inner: Arc::new(SchedulerInner {
                policy,
                queue,
                transactions,
                collectors: Mutex::new(HashMap::new()),
            }),
        })
    }

    pub fn policy(&self) -> &P {
        &self.inner.policy
    }

    /// Schedule an item into the workpackage of its owning unit-of-work.
    ///
    /// Fire-and-forget: ineligible items are a silent no-op, and no return
    /// value communicates whether a workpackage will result. Items whose
    /// policy reports no transaction are dispatched immediately, one
    /// workpackage per item.
    pub fn schedule(&self, item: P::Item) -> TxBatchResult<()> {
        if !self.inner.policy.is_eligible(&item) {
            metrics_api::record_item_ineligible();
            return Ok(());
        }
        metrics_api::record_item_scheduled();
        if config::DEBUG_SCHEDULING {
            tracing::trace!(
                use_case = %self.inner.policy.use_case_id(),
                "item accepted for scheduling"
            );
        }

        match self.inner.policy.extract_transaction_id(&item) {
            None => self.inner.collect_immediate(&item),
            Some(trx) => self.collect_transactional(trx, &item),
        }
    }

    /// Number of collectors currently waiting for their transaction to
    /// terminate (for introspection).
    pub fn live_collector_count(&self) -> usize {
        self.inner.lock_collectors().len()
    }

    /// Lookup-or-create the collector for `trx`, then add the item to it.
    fn collect_transactional(&self, trx: TrxId, item: &P::Item) -> TxBatchResult<()> {
        let inner = &self.inner;
        let key = CollectorKey::new(inner.policy.use_case_id(), trx);

        let (handle, created) = {
            let mut map = inner.lock_collectors();
            match map.entry(key.clone()) {
                Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
                Entry::Vacant(entry) => {
                    let context = inner.policy.extract_context(item);
                    let handle = Arc::new(Mutex::new(Collector::new(context)));
                    entry.insert(Arc::clone(&handle));

                    let live = map.len();
                    if live > config::COLLECTOR_WARN_THRESHOLD {
                        tracing::warn!(
                            live,
                            threshold = config::COLLECTOR_WARN_THRESHOLD,
                            "live collector count keeps growing; \
                             are transactions reaching commit or rollback?"
                        );
                    }
                    (handle, true)
                }
            }
        };

        if created {
            metrics_api::record_collector_created();
            tracing::debug!(key = %key, "collector created");

            // Registered outside the registry lock: no lock-order coupling
            // with whatever the transaction manager holds while firing
            // callbacks.
            let callback_inner = Arc::clone(inner);
            let callback_key = key.clone();
            let callback: TransactionCallback = Box::new(move |outcome| {
                callback_inner.on_transaction_complete(&callback_key, outcome)
            });

            if let Err(e) = inner.transactions.register_hook(key.clone(), callback) {
                // Nothing will ever finalize this entry; take it back out.
                inner.lock_collectors().remove(&key);
                let wrapped = match e {
                    TxBatchError::HookRegistrationFailed { .. } => e,
                    other => TxBatchError::HookRegistrationFailed {
                        transaction: key.transaction.to_string(),
                        reason: other.to_string(),
                    },
                };
                return Err(wrapped);
            }
        }

        let mut collector = handle.lock().unwrap_or_else(PoisonError::into_inner);
        collector.add_item(&inner.policy, item)
    }
}

impl<P, Q> SchedulerInner<P, Q>
where
    P: SchedulerPolicy,
    Q: WorkpackageQueue<P::Context, P::Model>,
{
    fn lock_collectors(&self) -> MutexGuard<'_, CollectorMap<P::Context, P::Model>> {
        self.collectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// An item raised outside any unit-of-work: throwaway collector,
    /// single item, immediate submission.
    fn collect_immediate(&self, item: &P::Item) -> TxBatchResult<()> {
        let context = self.policy.extract_context(item);
        let mut collector = Collector::new(context);
        collector.add_item(&self.policy, item)?;

        metrics_api::record_immediate_submission();
        collector
            .create_and_submit_workpackage(&self.policy, &self.queue)
            .map(|_| ())
    }

    /// Fired by the transaction manager, exactly once per key, after the
    /// transaction's terminal outcome. The registry entry is removed for
    /// either outcome, so a reused transaction id starts a fresh collector.
    fn on_transaction_complete(
        &self,
        key: &CollectorKey,
        outcome: TransactionOutcome,
    ) -> TxBatchResult<()> {
        let handle = self
            .lock_collectors()
            .remove(key)
            .ok_or_else(|| internal_error!("no live collector for '{}'", key))?;

        match outcome {
            TransactionOutcome::Commit => {
                let mut collector = handle.lock().unwrap_or_else(PoisonError::into_inner);
                collector
                    .create_and_submit_workpackage(&self.policy, &self.queue)
                    .map(|_| ())
            }
            TransactionOutcome::Rollback => {
                metrics_api::record_rollback_discard();
                tracing::debug!(key = %key, "collector discarded on rollback");
                Ok(())
            }
        }
    }
}
