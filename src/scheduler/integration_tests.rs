#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::testing::assert_error_code;
    use crate::scheduler::{Scheduler, TransactionHooks, TrxId};
    use crate::testing::{InMemoryTransactionManager, RecordingQueue, TestItem, TestPolicy};

    type TestScheduler = Scheduler<TestPolicy, Arc<RecordingQueue>>;

    fn setup(
        policy: TestPolicy,
    ) -> (
        TestScheduler,
        Arc<RecordingQueue>,
        Arc<InMemoryTransactionManager>,
    ) {
        let queue = Arc::new(RecordingQueue::new());
        let manager = Arc::new(InMemoryTransactionManager::new());
        let scheduler = Scheduler::new(
            policy,
            Arc::clone(&queue),
            Arc::clone(&manager) as Arc<dyn TransactionHooks>,
        )
        .unwrap();
        (scheduler, queue, manager)
    }

    fn default_setup() -> (
        TestScheduler,
        Arc<RecordingQueue>,
        Arc<InMemoryTransactionManager>,
    ) {
        setup(TestPolicy::new("it-scheduler", "it-processor"))
    }

    #[test]
    fn test_many_items_one_transaction_one_workpackage() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-1");

        for model in [1, 2, 1, 3, 2] {
            scheduler
                .schedule(TestItem::with_model("trx-1", model))
                .unwrap();
        }

        // nothing reaches the queue before commit
        assert!(queue.submissions().is_empty());
        assert_eq!(scheduler.live_collector_count(), 1);

        manager.commit(&trx).unwrap();

        let submitted = queue.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].elements, vec![1, 2, 3]);
        assert_eq!(scheduler.live_collector_count(), 0);
    }

    #[test]
    fn test_transactionless_items_dispatch_one_by_one() {
        let (scheduler, queue, _manager) = default_setup();

        scheduler.schedule(TestItem::immediate(10)).unwrap();
        scheduler.schedule(TestItem::immediate(10)).unwrap();

        // no batching across transaction-less calls, even for equal models
        let submitted = queue.submissions();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].elements, vec![10]);
        assert_eq!(submitted[1].elements, vec![10]);
        assert_eq!(scheduler.live_collector_count(), 0);
    }

    #[test]
    fn test_all_model_less_items_produce_nothing() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-1");

        scheduler
            .schedule(TestItem::without_model("trx-1"))
            .unwrap();
        scheduler
            .schedule(TestItem::without_model("trx-1"))
            .unwrap();

        manager.commit(&trx).unwrap();

        assert!(queue.submissions().is_empty());
        assert_eq!(scheduler.live_collector_count(), 0);
    }

    #[test]
    fn test_empty_enqueue_policy_submits_empty_workpackage() {
        let (scheduler, queue, manager) = setup(
            TestPolicy::new("it-scheduler", "it-processor").with_empty_enqueue(),
        );
        let trx = TrxId::new("trx-1");

        scheduler
            .schedule(TestItem::without_model("trx-1"))
            .unwrap();
        manager.commit(&trx).unwrap();

        let submitted = queue.submissions();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].elements.is_empty());
    }

    #[test]
    fn test_duplicate_models_and_parameter_overwrites() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-1");

        // A: model M1, x=1; B: model M1 again, x=2; C: model M2
        scheduler
            .schedule(TestItem::with_model("trx-1", 1).with_param("x", serde_json::json!(1)))
            .unwrap();
        scheduler
            .schedule(TestItem::with_model("trx-1", 1).with_param("x", serde_json::json!(2)))
            .unwrap();
        scheduler
            .schedule(TestItem::with_model("trx-1", 2))
            .unwrap();

        manager.commit(&trx).unwrap();

        let submitted = queue.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].elements, vec![1, 2]);
        assert_eq!(
            submitted[0].parameters.get("x"),
            Some(&serde_json::json!(2))
        );
    }

    #[test]
    fn test_rollback_discards_collector() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-1");

        scheduler
            .schedule(TestItem::with_model("trx-1", 1))
            .unwrap();
        scheduler
            .schedule(TestItem::with_model("trx-1", 2))
            .unwrap();

        manager.rollback(&trx).unwrap();

        assert!(queue.submissions().is_empty());
        assert_eq!(scheduler.live_collector_count(), 0);
    }

    #[test]
    fn test_reused_transaction_id_starts_fresh_collector() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-1");

        scheduler
            .schedule(TestItem::with_model("trx-1", 1))
            .unwrap();
        manager.commit(&trx).unwrap();

        // same transaction name again, e.g. a pooled/reused trx object
        scheduler
            .schedule(TestItem::with_model("trx-1", 2))
            .unwrap();
        manager.commit(&trx).unwrap();

        let submitted = queue.submissions();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].elements, vec![1]);
        assert_eq!(submitted[1].elements, vec![2]);
    }

    #[test]
    fn test_ineligible_items_are_silent_noops() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-1");

        scheduler
            .schedule(TestItem::with_model("trx-1", 1).ineligible())
            .unwrap();

        assert_eq!(scheduler.live_collector_count(), 0);
        assert_eq!(manager.pending_hook_count(&trx), 0);
        assert!(queue.submissions().is_empty());
    }

    #[test]
    fn test_context_comes_from_first_item_only() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-1");

        scheduler
            .schedule(TestItem::with_model("trx-1", 1).with_context("first"))
            .unwrap();
        scheduler
            .schedule(TestItem::with_model("trx-1", 2).with_context("second"))
            .unwrap();

        manager.commit(&trx).unwrap();

        let submitted = queue.submissions();
        assert_eq!(submitted[0].context, "first");
    }

    #[test]
    fn test_two_use_cases_share_a_transaction_independently() {
        let manager = Arc::new(InMemoryTransactionManager::new());
        let trx = TrxId::new("trx-1");

        let queue_a = Arc::new(RecordingQueue::new());
        let scheduler_a = Scheduler::new(
            TestPolicy::new("use-case-a", "processor-a"),
            Arc::clone(&queue_a),
            Arc::clone(&manager) as Arc<dyn TransactionHooks>,
        )
        .unwrap();

        let queue_b = Arc::new(RecordingQueue::new());
        let scheduler_b = Scheduler::new(
            TestPolicy::new("use-case-b", "processor-b"),
            Arc::clone(&queue_b),
            Arc::clone(&manager) as Arc<dyn TransactionHooks>,
        )
        .unwrap();

        scheduler_a
            .schedule(TestItem::with_model("trx-1", 1))
            .unwrap();
        scheduler_b
            .schedule(TestItem::with_model("trx-1", 2))
            .unwrap();

        assert_eq!(manager.pending_hook_count(&trx), 2);
        manager.commit(&trx).unwrap();

        assert_eq!(queue_a.submissions().len(), 1);
        assert_eq!(queue_a.submissions()[0].elements, vec![1]);
        assert_eq!(queue_b.submissions().len(), 1);
        assert_eq!(queue_b.submissions()[0].elements, vec![2]);
    }

    #[test]
    fn test_concurrent_first_items_create_one_collector() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-race");

        let threads: Vec<_> = (0..8)
            .map(|i| {
                let scheduler = scheduler.clone();
                std::thread::spawn(move || {
                    scheduler
                        .schedule(TestItem::with_model("trx-race", i))
                        .unwrap();
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        // the lookup-or-create race resolved to a single collector
        assert_eq!(scheduler.live_collector_count(), 1);
        assert_eq!(manager.pending_hook_count(&trx), 1);

        manager.commit(&trx).unwrap();

        let submitted = queue.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].elements.len(), 8);
    }

    #[test]
    fn test_queue_failure_propagates_out_of_commit() {
        let (scheduler, queue, manager) = default_setup();
        let trx = TrxId::new("trx-1");

        scheduler
            .schedule(TestItem::with_model("trx-1", 1))
            .unwrap();
        queue.fail_next("queue full");

        assert_error_code(manager.commit(&trx), "TXB_QUEUE_SUBMISSION_FAILED");

        // the transaction is over either way: the entry is gone
        assert_eq!(scheduler.live_collector_count(), 0);
        assert!(queue.submissions().is_empty());
    }

    #[test]
    fn test_blank_identities_are_rejected() {
        let queue = Arc::new(RecordingQueue::new());
        let manager = Arc::new(InMemoryTransactionManager::new());

        assert_error_code(
            Scheduler::new(
                TestPolicy::new("", "processor"),
                Arc::clone(&queue),
                Arc::clone(&manager) as Arc<dyn TransactionHooks>,
            )
            .map(|_| ()),
            "TXB_INVALID_ARGUMENT",
        );
        assert_error_code(
            Scheduler::new(
                TestPolicy::new("use-case", ""),
                Arc::clone(&queue),
                Arc::clone(&manager) as Arc<dyn TransactionHooks>,
            )
            .map(|_| ()),
            "TXB_INVALID_ARGUMENT",
        );
    }
}
