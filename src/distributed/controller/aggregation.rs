use std::time::Duration;

use serde::Serialize;

use crate::distributed::protocol::WorkerResult;

use super::dispatch::WorkerOutcome;

/// A configured worker that did not contribute to the report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkerFailure {
    pub worker: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AggregateReport {
    pub total_completed: u64,
    pub total_errors: u64,
    /// Sum of per-worker throughput; workers reporting none count as zero.
    pub aggregate_throughput: f64,
    pub wall_time_seconds: f64,
    /// Successful workers in configuration order.
    pub per_worker: Vec<WorkerResult>,
    pub failures: Vec<WorkerFailure>,
}

/// Folds worker outcomes into a report. Outcomes are ordered by worker index
/// first, so the report does not depend on arrival order.
#[expect(
    clippy::float_arithmetic,
    reason = "Aggregate throughput is a float sum"
)]
pub(crate) fn aggregate(mut outcomes: Vec<WorkerOutcome>, wall_time: Duration) -> AggregateReport {
    outcomes.sort_by_key(|outcome| outcome.index);

    let mut per_worker = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(result) => per_worker.push(result),
            Err(err) => failures.push(WorkerFailure {
                worker: outcome.worker,
                error: err.to_string(),
            }),
        }
    }

    let (total_completed, total_errors) =
        per_worker
            .iter()
            .fold((0u64, 0u64), |(completed, errors), result| {
                (
                    completed.saturating_add(result.completed_iterations()),
                    errors.saturating_add(result.errors),
                )
            });
    let aggregate_throughput = per_worker.iter().fold(0.0, |sum, result| {
        sum + result.throughput_ops_per_sec.unwrap_or(0.0)
    });

    AggregateReport {
        total_completed,
        total_errors,
        aggregate_throughput,
        wall_time_seconds: wall_time.as_secs_f64(),
        per_worker,
        failures,
    }
}
