use serde::{Deserialize, Serialize};

use crate::collections::OrderedMap;
use crate::TxBatchResult;

use super::key::ProcessorId;

/// The single batched job built from a collector's accumulated state.
///
/// `elements` are the collected models in first-insertion order;
/// `parameters` annotate the whole package (last write per name wins).
#[derive(Debug, Clone)]
pub struct Workpackage<C, M> {
    pub context: C,
    pub processor: ProcessorId,
    pub parameters: OrderedMap<String, serde_json::Value>,
    pub elements: Vec<M>,
}

/// Opaque handle returned by a queue for a submitted workpackage.
/// Not interpreted by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionHandle(pub u64);

/// The external execution queue a finalized workpackage is handed to.
///
/// Injected into the scheduler at construction. The call is synchronous
/// from the scheduler's point of view; the queue owns any further
/// asynchrony, persistence and job-level retry.
pub trait WorkpackageQueue<C, M>: Send + Sync + 'static {
    fn submit(&self, workpackage: Workpackage<C, M>) -> TxBatchResult<SubmissionHandle>;
}

impl<C, M, Q> WorkpackageQueue<C, M> for std::sync::Arc<Q>
where
    Q: WorkpackageQueue<C, M> + ?Sized,
{
    fn submit(&self, workpackage: Workpackage<C, M>) -> TxBatchResult<SubmissionHandle> {
        (**self).submit(workpackage)
    }
}
