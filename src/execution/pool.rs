use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::args::PositiveUsize;
use crate::error::OperationError;
use crate::ops::{Operation, OperationRegistry, Payload};

use super::plan::plan;

#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub operation: String,
    pub iterations: u64,
    pub concurrency: PositiveUsize,
    pub payload: Payload,
}

/// Outcome of one executor. Failed shards report zero completions and no
/// details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardResult {
    pub completed: u64,
    pub error: Option<String>,
    pub details: Payload,
}

impl ShardResult {
    const fn succeeded(completed: u64, details: Payload) -> Self {
        Self {
            completed,
            error: None,
            details,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            completed: 0,
            error: Some(message),
            details: Payload::new(),
        }
    }
}

/// Merged result of every shard of one request.
#[derive(Debug, Clone)]
pub struct PoolOutcome {
    pub operation: String,
    pub requested_iterations: u64,
    pub concurrency: PositiveUsize,
    pub shards: usize,
    pub completed: u64,
    pub error_count: u64,
    pub duration: Duration,
    pub throughput_ops_per_sec: Option<f64>,
    /// Shard details merged by `merge_details`.
    pub details: Payload,
}

/// Runs the shards of one operation concurrently on the blocking thread pool.
#[derive(Clone)]
pub struct ExecutorPool {
    registry: Arc<OperationRegistry>,
}

impl ExecutorPool {
    #[must_use]
    pub const fn new(registry: Arc<OperationRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Splits the request into `concurrency` shards, runs them all and merges
    /// the results. Shard failures are counted, never propagated.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Unknown` before any work starts when the
    /// operation is not registered.
    pub async fn execute(&self, request: OperationRequest) -> Result<PoolOutcome, OperationError> {
        let operation = self.registry.lookup(&request.operation)?;
        let work_plan = plan(request.iterations, request.concurrency);
        let payload = Arc::new(request.payload);

        debug!(
            "Running {} x{} across {} shards",
            request.operation,
            request.iterations,
            work_plan.len()
        );

        let started = Instant::now();
        let mut executors = JoinSet::new();
        for (index, shard) in work_plan.shards().iter().copied().enumerate() {
            let operation = Arc::clone(&operation);
            let payload = Arc::clone(&payload);
            executors.spawn_blocking(move || run_shard(operation.as_ref(), index, shard, &payload));
        }

        let mut results = Vec::with_capacity(work_plan.len());
        while let Some(joined) = executors.join_next().await {
            let result = joined.unwrap_or_else(|err| {
                warn!("Executor for {} did not finish: {}", request.operation, err);
                ShardResult::failed(
                    OperationError::Executor {
                        message: err.to_string(),
                    }
                    .to_string(),
                )
            });
            results.push(result);
        }
        let duration = started.elapsed();

        let (completed, error_count) = merge_shards(&results);
        let details = merge_details(&results);
        Ok(PoolOutcome {
            operation: request.operation,
            requested_iterations: request.iterations,
            concurrency: request.concurrency,
            shards: work_plan.len(),
            completed,
            error_count,
            duration,
            throughput_ops_per_sec: throughput(completed, duration),
            details,
        })
    }
}

fn run_shard(operation: &dyn Operation, index: usize, iterations: u64, payload: &Payload) -> ShardResult {
    match operation.run(index, iterations, payload) {
        Ok(output) => ShardResult::succeeded(output.completed, output.details),
        Err(err) => {
            warn!("Shard {} of {} failed: {}", index, operation.name(), err);
            ShardResult::failed(err.to_string())
        }
    }
}

/// Sums completions and counts failed shards.
pub(super) fn merge_shards(results: &[ShardResult]) -> (u64, u64) {
    results
        .iter()
        .fold((0u64, 0u64), |(completed, errors), result| {
            let errors = if result.error.is_some() {
                errors.saturating_add(1)
            } else {
                errors
            };
            (completed.saturating_add(result.completed), errors)
        })
}

/// Folds the details of successful shards into one block. Unsigned integer
/// values under the same key are summed; any other value keeps the first
/// shard's entry.
pub(super) fn merge_details(results: &[ShardResult]) -> Payload {
    let mut merged = Payload::new();
    for result in results.iter().filter(|result| result.error.is_none()) {
        for (key, value) in &result.details {
            match merged.get_mut(key) {
                Some(existing) => {
                    if let (Some(sum), Some(add)) = (existing.as_u64(), value.as_u64()) {
                        *existing = sum.saturating_add(add).into();
                    }
                }
                None => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }
    merged
}

/// Completed iterations per second, or `None` when no time elapsed.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "Throughput is reported as fractional ops/sec"
)]
pub fn throughput(completed: u64, duration: Duration) -> Option<f64> {
    let seconds = duration.as_secs_f64();
    if seconds > 0.0 {
        Some(completed as f64 / seconds)
    } else {
        None
    }
}
