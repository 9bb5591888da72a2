use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::ModuleError;

/// Result of one module invocation as seen by the executor
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub succeeded: bool,
    pub error: Option<ModuleError>,
}

impl ExecutionOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(error: ModuleError) -> Self {
        Self {
            succeeded: false,
            error: Some(error),
        }
    }

    pub fn failed_without_error() -> Self {
        Self {
            succeeded: false,
            error: None,
        }
    }

    /// Success, or a failure that carried no error. Both pace like a success.
    pub fn is_success_compatible(&self) -> bool {
        self.succeeded || self.error.is_none()
    }
}

impl From<Result<bool, ModuleError>> for ExecutionOutcome {
    fn from(result: Result<bool, ModuleError>) -> Self {
        match result {
            Ok(true) => Self::success(),
            Ok(false) => Self::failed_without_error(),
            Err(e) => Self::failure(e),
        }
    }
}

/// Contiguous slice `[start, end)` of the account pool owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPartition {
    pub worker: usize,
    pub start: usize,
    pub end: usize,
}

impl WorkerPartition {
    /// Single partition over the whole pool
    pub fn whole(pool_size: usize) -> Self {
        Self {
            worker: 0,
            start: 0,
            end: pool_size,
        }
    }

    /// Split `[0, pool_size)` across `worker_count` workers.
    ///
    /// Each worker gets `max(1, pool_size / worker_count)` accounts and the last
    /// worker absorbs the remainder. Bounds are clamped to the pool, so surplus
    /// workers receive empty partitions.
    pub fn split(pool_size: usize, worker_count: usize) -> Vec<Self> {
        let workers = worker_count.max(1);
        let per_worker = (pool_size / workers).max(1);

        (0..workers)
            .map(|worker| {
                let start = (worker * per_worker).min(pool_size);
                let end = if worker == workers - 1 {
                    pool_size
                } else {
                    ((worker + 1) * per_worker).min(pool_size)
                };

                Self { worker, start, end }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.end
    }
}
