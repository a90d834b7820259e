use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::distributed::protocol::{DispatchBody, WorkerResult};
use crate::error::WorkerError;
use crate::execution::WorkPlan;

use super::ControllerRun;

/// What one worker produced, tagged with its position in the worker list.
#[derive(Debug)]
pub(crate) struct WorkerOutcome {
    pub(crate) index: usize,
    pub(crate) worker: String,
    pub(crate) result: Result<WorkerResult, WorkerError>,
}

/// Sends one request per worker concurrently and collects the outcomes in
/// completion order. Every worker yields exactly one outcome.
pub(super) async fn dispatch_all(
    client: &reqwest::Client,
    run: &ControllerRun,
    work_plan: &WorkPlan,
) -> Vec<WorkerOutcome> {
    let (result_tx, mut result_rx) =
        mpsc::unbounded_channel::<(usize, Result<WorkerResult, WorkerError>)>();
    let payload = Arc::new(run.payload.clone());
    let concurrency = run.concurrency_per_worker.get();

    let mut handles = Vec::with_capacity(run.workers.len());
    for (index, (worker, iters)) in run
        .workers
        .iter()
        .zip(work_plan.shards().iter().copied())
        .enumerate()
    {
        let client = client.clone();
        let worker = worker.clone();
        let op = run.op.clone();
        let payload = Arc::clone(&payload);
        let result_tx = result_tx.clone();
        handles.push(tokio::spawn(async move {
            let body = DispatchBody {
                op: &op,
                iters,
                concurrency,
                payload: &payload,
            };
            let result = call_worker(&client, &worker, &body).await;
            drop(result_tx.send((index, result)));
        }));
    }
    drop(result_tx);

    let mut answered = vec![false; run.workers.len()];
    let mut outcomes = Vec::with_capacity(run.workers.len());
    while let Some((index, result)) = result_rx.recv().await {
        if let Some(slot) = answered.get_mut(index) {
            *slot = true;
        }
        let worker = run.workers.get(index).cloned().unwrap_or_default();
        match &result {
            Ok(reply) => debug!(
                "Worker {} ({}) finished {} iterations",
                worker,
                reply.hostname,
                reply.completed_iterations()
            ),
            Err(err) => warn!("Worker {} failed: {}", worker, err),
        }
        outcomes.push(WorkerOutcome {
            index,
            worker,
            result,
        });
    }

    // A dispatch task that died before sending still needs an outcome.
    for (index, handle) in handles.into_iter().enumerate() {
        let Err(err) = handle.await else {
            continue;
        };
        if answered.get(index).copied().unwrap_or(true) {
            continue;
        }
        let worker = run.workers.get(index).cloned().unwrap_or_default();
        warn!("Dispatch to {} did not complete: {}", worker, err);
        outcomes.push(WorkerOutcome {
            index,
            worker: worker.clone(),
            result: Err(WorkerError::Dispatch {
                url: worker,
                source: err,
            }),
        });
    }
    outcomes
}

pub(super) async fn call_worker(
    client: &reqwest::Client,
    base: &str,
    body: &DispatchBody<'_>,
) -> Result<WorkerResult, WorkerError> {
    let url = format!("{}/{}", base.trim_end_matches('/'), body.op);
    let response = client
        .post(&url)
        .json(body)
        .send()
        .await
        .map_err(|err| WorkerError::Request {
            url: url.clone(),
            source: err,
        })?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|reply| {
                reply
                    .get("error")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("no reason").to_owned());
        return Err(WorkerError::Status {
            url,
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<WorkerResult>()
        .await
        .map_err(|err| WorkerError::Decode { url, source: err })
}
