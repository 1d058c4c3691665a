use std::hash::Hash;

use serde_json::Value;

use crate::collections::{OrderedMap, OrderedSet};
use crate::error::{TxBatchError, TxBatchResult};
use crate::metrics::metrics_api;

use super::policy::SchedulerPolicy;
use super::queue::{SubmissionHandle, Workpackage, WorkpackageQueue};

/// Collector lifecycle: `Collecting` accepts items and parameters,
/// `Processed` is terminal. The only transition is performed by
/// [`Collector::create_and_submit_workpackage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectorState {
    Collecting,
    Processed,
}

/// Per-transaction accumulator of models and parameters.
///
/// One collector exists per (use case, transaction) pair for the
/// transaction's lifetime; it is owned by the scheduler's registry entry
/// and materializes into at most one workpackage, at commit.
#[derive(Debug)]
pub struct Collector<C, M> {
    context: C,
    models: OrderedSet<M>,
    parameters: OrderedMap<String, Value>,
    state: CollectorState,
}

impl<C, M> Collector<C, M>
where
    C: Clone,
    M: Eq + Hash + Clone,
{
    pub(crate) fn new(context: C) -> Self {
        Self {
            context,
            models: OrderedSet::new(),
            parameters: OrderedMap::new(),
            state: CollectorState::Collecting,
        }
    }

    fn ensure_collecting(&self, operation: &'static str) -> TxBatchResult<()> {
        if self.state == CollectorState::Processed {
            return Err(TxBatchError::AlreadyProcessed { operation });
        }
        Ok(())
    }

    fn mark_processed(&mut self, operation: &'static str) -> TxBatchResult<()> {
        self.ensure_collecting(operation)?;
        self.state = CollectorState::Processed;
        Ok(())
    }

    /// The context this collector was created with.
    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn is_processed(&self) -> bool {
        self.state == CollectorState::Processed
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Collect one item: the policy extracts the model (and may annotate
    /// parameters); an equal model already present is a silent no-op.
    pub(crate) fn add_item<P>(&mut self, policy: &P, item: &P::Item) -> TxBatchResult<()>
    where
        P: SchedulerPolicy<Context = C, Model = M>,
    {
        self.ensure_collecting("add_item")?;

        if let Some(model) = policy.extract_model(self, item) {
            self.models.insert(model);
        }
        Ok(())
    }

    /// Set a workpackage parameter; the last write for a name wins.
    pub fn set_parameter(&mut self, name: &str, value: Value) -> TxBatchResult<()> {
        self.ensure_collecting("set_parameter")?;
        if name.is_empty() {
            return Err(TxBatchError::invalid_argument(
                "parameter_name",
                "must not be empty",
            ));
        }

        self.parameters.insert(name.to_string(), value);
        Ok(())
    }

    /// Read a previously set parameter. Absent names are `None`, never an
    /// error.
    pub fn get_parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Materialize the accumulated state into a single workpackage and hand
    /// it to the queue.
    ///
    /// Transitions to `Processed` as its first effect, so a second call is
    /// rejected with `AlreadyProcessed` before any build work happens.
    /// Returns `Ok(None)` when nothing was collected and the policy does
    /// not force an empty enqueue; the queue is not contacted in that case.
    pub(crate) fn create_and_submit_workpackage<P, Q>(
        &mut self,
        policy: &P,
        queue: &Q,
    ) -> TxBatchResult<Option<SubmissionHandle>>
    where
        P: SchedulerPolicy<Context = C, Model = M>,
        Q: WorkpackageQueue<C, M> + ?Sized,
    {
        self.mark_processed("create_and_submit_workpackage")?;

        if self.models.is_empty() && !policy.enqueue_when_empty() {
            metrics_api::record_empty_collector_skipped();
            tracing::debug!(
                use_case = %policy.use_case_id(),
                "no models collected, skipping workpackage"
            );
            return Ok(None);
        }

        let workpackage = Workpackage {
            context: self.context.clone(),
            processor: policy.processor_id(),
            parameters: self.parameters.clone(),
            elements: self.models.to_vec(),
        };
        let element_count = workpackage.elements.len();

        match queue.submit(workpackage) {
            Ok(handle) => {
                metrics_api::record_workpackage_submitted();
                tracing::debug!(
                    use_case = %policy.use_case_id(),
                    elements = element_count,
                    handle = handle.0,
                    "workpackage submitted"
                );
                Ok(Some(handle))
            }
            Err(e) => {
                metrics_api::record_submission_failure();
                let wrapped = match e {
                    TxBatchError::QueueSubmissionFailed { .. } => e,
                    other => TxBatchError::QueueSubmissionFailed {
                        use_case: policy.use_case_id().to_string(),
                        reason: other.to_string(),
                    },
                };
                Err(wrapped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::testing::{assert_error_code, assert_error_contains};
    use crate::testing::{RecordingQueue, TestItem, TestPolicy};

    fn policy() -> TestPolicy {
        TestPolicy::new("collector-test", "test-processor")
    }

    #[test]
    fn test_duplicate_models_collapse_in_insertion_order() {
        let policy = policy();
        let mut collector = Collector::new("ctx".to_string());

        collector
            .add_item(&policy, &TestItem::with_model("trx-1", 3))
            .unwrap();
        collector
            .add_item(&policy, &TestItem::with_model("trx-1", 1))
            .unwrap();
        collector
            .add_item(&policy, &TestItem::with_model("trx-1", 3)) // duplicate
            .unwrap();

        assert_eq!(collector.model_count(), 2);

        let queue = RecordingQueue::new();
        let handle = collector
            .create_and_submit_workpackage(&policy, &queue)
            .unwrap();

        assert!(handle.is_some());
        let submitted = queue.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].elements, vec![3, 1]);
    }

    #[test]
    fn test_item_without_model_contributes_nothing() {
        let policy = policy();
        let mut collector = Collector::new("ctx".to_string());

        collector
            .add_item(&policy, &TestItem::without_model("trx-1"))
            .unwrap();

        assert_eq!(collector.model_count(), 0);
    }

    #[test]
    fn test_empty_collector_skips_queue() {
        let policy = policy();
        let queue = RecordingQueue::new();
        let mut collector: Collector<String, i64> = Collector::new("ctx".to_string());

        let handle = collector
            .create_and_submit_workpackage(&policy, &queue)
            .unwrap();

        assert_eq!(handle, None);
        assert!(queue.submissions().is_empty());
        assert!(collector.is_processed());
    }

    #[test]
    fn test_enqueue_when_empty_submits_empty_workpackage() {
        let policy = TestPolicy::new("collector-test", "test-processor").with_empty_enqueue();
        let queue = RecordingQueue::new();
        let mut collector: Collector<String, i64> = Collector::new("ctx".to_string());

        let handle = collector
            .create_and_submit_workpackage(&policy, &queue)
            .unwrap();

        assert!(handle.is_some());
        let submitted = queue.submissions();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].elements.is_empty());
    }

    #[test]
    fn test_second_submission_fails_without_second_queue_call() {
        let policy = policy();
        let queue = RecordingQueue::new();
        let mut collector = Collector::new("ctx".to_string());

        collector
            .add_item(&policy, &TestItem::with_model("trx-1", 7))
            .unwrap();
        collector
            .create_and_submit_workpackage(&policy, &queue)
            .unwrap();

        assert_error_code(
            collector.create_and_submit_workpackage(&policy, &queue),
            "TXB_ALREADY_PROCESSED",
        );
        assert_eq!(queue.submissions().len(), 1);
    }

    #[test]
    fn test_mutation_after_processing_fails() {
        let policy = policy();
        let queue = RecordingQueue::new();
        let mut collector = Collector::new("ctx".to_string());

        collector
            .add_item(&policy, &TestItem::with_model("trx-1", 7))
            .unwrap();
        collector
            .create_and_submit_workpackage(&policy, &queue)
            .unwrap();

        assert_error_code(
            collector.add_item(&policy, &TestItem::with_model("trx-1", 8)),
            "TXB_ALREADY_PROCESSED",
        );
        assert_error_code(
            collector.set_parameter("x", serde_json::json!(1)),
            "TXB_ALREADY_PROCESSED",
        );
    }

    #[test]
    fn test_set_parameter_validation_and_last_write_wins() {
        let mut collector: Collector<String, i64> = Collector::new("ctx".to_string());

        assert_error_contains(
            collector.set_parameter("", serde_json::json!(1)),
            "must not be empty",
        );

        collector.set_parameter("x", serde_json::json!(1)).unwrap();
        collector.set_parameter("x", serde_json::json!(2)).unwrap();

        assert_eq!(collector.get_parameter("x"), Some(&serde_json::json!(2)));
        assert_eq!(collector.get_parameter("absent"), None);
    }

    #[test]
    fn test_parameters_reach_workpackage() {
        let policy = policy();
        let queue = RecordingQueue::new();
        let mut collector = Collector::new("ctx".to_string());

        collector
            .add_item(
                &policy,
                &TestItem::with_model("trx-1", 1).with_param("x", serde_json::json!(42)),
            )
            .unwrap();
        collector
            .create_and_submit_workpackage(&policy, &queue)
            .unwrap();

        let submitted = queue.submissions();
        assert_eq!(
            submitted[0].parameters.get("x"),
            Some(&serde_json::json!(42))
        );
    }

    #[test]
    fn test_queue_failure_wraps_as_submission_error() {
        let policy = policy();
        let queue = RecordingQueue::new();
        queue.fail_next("queue full");
        let mut collector = Collector::new("ctx".to_string());

        collector
            .add_item(&policy, &TestItem::with_model("trx-1", 1))
            .unwrap();

        assert_error_code(
            collector.create_and_submit_workpackage(&policy, &queue),
            "TXB_QUEUE_SUBMISSION_FAILED",
        );
        // the transition happened first, so the collector is spent
        assert!(collector.is_processed());
    }
}
