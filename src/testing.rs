//! Test doubles for the external collaborators
//!
//! `InMemoryTransactionManager` stands in for the host transaction
//! infrastructure and `RecordingQueue` for the execution queue, so the
//! commit/rollback flow can be driven end-to-end from tests (and from host
//! integration code behind the `testing` feature).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{TxBatchError, TxBatchResult};
use crate::scheduler::{
    Collector, CollectorKey, ProcessorId, SchedulerPolicy, SubmissionHandle, TransactionCallback,
    TransactionHooks, TransactionOutcome, TrxId, UseCaseId, Workpackage, WorkpackageQueue,
};

type HookEntry = (CollectorKey, TransactionCallback);

/// Transaction manager that holds registered hooks until the test drives
/// the transaction to `commit` or `rollback`.
#[derive(Default)]
pub struct InMemoryTransactionManager {
    hooks: Mutex<HashMap<TrxId, Vec<HookEntry>>>,
}

impl InMemoryTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit the transaction: every hook registered under it fires with
    /// `Commit`, in registration order.
    pub fn commit(&self, trx: &TrxId) -> TxBatchResult<()> {
        self.finish(trx, TransactionOutcome::Commit)
    }

    /// Roll the transaction back: every hook fires with `Rollback`.
    pub fn rollback(&self, trx: &TrxId) -> TxBatchResult<()> {
        self.finish(trx, TransactionOutcome::Rollback)
    }

    /// Hooks still waiting for the transaction to terminate.
    pub fn pending_hook_count(&self, trx: &TrxId) -> usize {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(trx)
            .map_or(0, Vec::len)
    }

    fn finish(&self, trx: &TrxId, outcome: TransactionOutcome) -> TxBatchResult<()> {
        // Drain under the lock, fire outside it: callbacks re-enter the
        // scheduler, which takes its own locks.
        let drained = self
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(trx)
            .unwrap_or_default();

        for (_key, callback) in drained {
            callback(outcome)?;
        }
        Ok(())
    }
}

impl TransactionHooks for InMemoryTransactionManager {
    fn register_hook(
        &self,
        key: CollectorKey,
        callback: TransactionCallback,
    ) -> TxBatchResult<()> {
        let mut hooks = self.hooks.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = hooks.entry(key.transaction.clone()).or_default();

        if entries.iter().any(|(registered, _)| *registered == key) {
            return Err(TxBatchError::invalid_argument(
                "hook_key",
                format!("'{key}' already registered for this transaction"),
            ));
        }

        entries.push((key, callback));
        Ok(())
    }
}

/// Queue that records every submitted workpackage.
pub struct RecordingQueue<C = String, M = i64> {
    submissions: Mutex<Vec<Workpackage<C, M>>>,
    next_handle: AtomicU64,
    fail_next: Mutex<Option<String>>,
}

impl<C, M> RecordingQueue<C, M> {
    pub fn new() -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
            fail_next: Mutex::new(None),
        }
    }

    /// Make the next `submit` call fail with `QueueSubmissionFailed`.
    pub fn fail_next(&self, reason: &str) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(reason.to_string());
    }

    pub fn submission_count(&self) -> usize {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<C: Clone, M: Clone> RecordingQueue<C, M> {
    /// Everything submitted so far, in submission order.
    pub fn submissions(&self) -> Vec<Workpackage<C, M>> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<C, M> Default for RecordingQueue<C, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, M> WorkpackageQueue<C, M> for RecordingQueue<C, M>
where
    C: Send + 'static,
    M: Send + 'static,
{
    fn submit(&self, workpackage: Workpackage<C, M>) -> TxBatchResult<SubmissionHandle> {
        if let Some(reason) = self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(TxBatchError::QueueSubmissionFailed {
                use_case: workpackage.processor.to_string(),
                reason,
            });
        }

        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(workpackage);
        Ok(SubmissionHandle(
            self.next_handle.fetch_add(1, Ordering::Relaxed),
        ))
    }
}

/// Item fed through `TestPolicy`
#[derive(Debug, Clone)]
pub struct TestItem {
    pub trx: Option<TrxId>,
    pub context: String,
    pub model: Option<i64>,
    pub params: Vec<(String, serde_json::Value)>,
    pub eligible: bool,
}

impl TestItem {
    pub fn with_model(trx: &str, model: i64) -> Self {
        Self {
            trx: Some(trx.into()),
            context: "ctx".to_string(),
            model: Some(model),
            params: Vec::new(),
            eligible: true,
        }
    }

    pub fn without_model(trx: &str) -> Self {
        Self {
            trx: Some(trx.into()),
            context: "ctx".to_string(),
            model: None,
            params: Vec::new(),
            eligible: true,
        }
    }

    /// An item raised outside any unit-of-work.
    pub fn immediate(model: i64) -> Self {
        Self {
            trx: None,
            context: "ctx".to_string(),
            model: Some(model),
            params: Vec::new(),
            eligible: true,
        }
    }

    pub fn with_param(mut self, name: &str, value: serde_json::Value) -> Self {
        self.params.push((name.to_string(), value));
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = context.to_string();
        self
    }

    pub fn ineligible(mut self) -> Self {
        self.eligible = false;
        self
    }
}

/// Policy driven entirely by the fields of [`TestItem`]
pub struct TestPolicy {
    use_case: UseCaseId,
    processor: ProcessorId,
    enqueue_when_empty: bool,
}

impl TestPolicy {
    pub fn new(use_case: &str, processor: &str) -> Self {
        Self {
            use_case: use_case.into(),
            processor: processor.into(),
            enqueue_when_empty: false,
        }
    }

    pub fn with_empty_enqueue(mut self) -> Self {
        self.enqueue_when_empty = true;
        self
    }
}

impl SchedulerPolicy for TestPolicy {
    type Item = TestItem;
    type Context = String;
    type Model = i64;

    fn use_case_id(&self) -> UseCaseId {
        self.use_case.clone()
    }

    fn processor_id(&self) -> ProcessorId {
        self.processor.clone()
    }

    fn is_eligible(&self, item: &TestItem) -> bool {
        item.eligible
    }

    fn extract_context(&self, item: &TestItem) -> String {
        item.context.clone()
    }

    fn extract_transaction_id(&self, item: &TestItem) -> Option<TrxId> {
        item.trx.clone()
    }

    fn extract_model(
        &self,
        collector: &mut Collector<String, i64>,
        item: &TestItem,
    ) -> Option<i64> {
        for (name, value) in &item.params {
            collector
                .set_parameter(name, value.clone())
                .expect("parameter set on a live collector");
        }
        item.model
    }

    fn enqueue_when_empty(&self) -> bool {
        self.enqueue_when_empty
    }
}
