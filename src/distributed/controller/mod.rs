mod aggregation;
mod dispatch;
mod output;


use std::time::{Duration, Instant};

use tracing::info;

use crate::args::PositiveUsize;
use crate::error::AppResult;
use crate::execution::plan;
use crate::ops::Payload;

pub use aggregation::{AggregateReport, WorkerFailure};
pub use output::{banner_line, render_json, render_text};

/// Fully resolved controller settings: config file merged with CLI overrides.
#[derive(Debug, Clone)]
pub struct ControllerRun {
    pub workers: Vec<String>,
    pub op: String,
    pub total_iters: u64,
    pub concurrency_per_worker: PositiveUsize,
    pub payload: Payload,
    /// Upper bound on each worker round-trip.
    pub timeout: Duration,
}

/// Splits `total_iters` across the workers, dispatches every shard at once
/// and aggregates whatever comes back. Unreachable or failing workers end up
/// in `AggregateReport::failures`.
///
/// # Errors
///
/// Returns an error when the worker list is empty or the HTTP client cannot
/// be built.
pub async fn run_controller(run: &ControllerRun) -> AppResult<AggregateReport> {
    let work_plan = plan(run.total_iters, PositiveUsize::try_from(run.workers.len())?);
    let client = reqwest::Client::builder().timeout(run.timeout).build()?;

    let started = Instant::now();
    let outcomes = dispatch::dispatch_all(&client, run, &work_plan).await;
    let wall_time = started.elapsed();

    let report = aggregation::aggregate(outcomes, wall_time);
    info!(
        "Run finished: {} of {} workers answered in {:.3}s",
        report.per_worker.len(),
        run.workers.len(),
        report.wall_time_seconds
    );
    Ok(report)
}
