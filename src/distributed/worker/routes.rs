use std::sync::Arc;

use serde::Serialize;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::args::PositiveUsize;
use crate::distributed::protocol::{HealthResponse, RunRequest, WorkerResult};
use crate::error::OperationError;
use crate::execution::{OperationRequest, PoolOutcome};

use super::http::{
    HttpRequest, RequestError, read_http_request, write_error_response, write_json_response,
};
use super::{WorkerSettings, WorkerState};

pub(super) const HEALTH_PATH: &str = "/health";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum RouteReply {
    Health(HealthResponse),
    Run(Box<WorkerResult>),
}

pub(super) async fn handle_connection(mut socket: TcpStream, state: Arc<WorkerState>) {
    let written = match read_http_request(&mut socket).await {
        Ok(request) => match route(&state, &request).await {
            Ok(reply) => write_json_response(&mut socket, 200, &reply).await,
            Err(err) => {
                debug!("{} {} rejected: {}", request.method, request.path, err.message);
                write_error_response(&mut socket, err.status, &err.message).await
            }
        },
        Err(err) => write_error_response(&mut socket, err.status, &err.message).await,
    };
    if let Err(err) = written {
        // Peer went away before the response was written.
        debug!("Failed to write response: {}", err);
    }
}

pub(super) async fn route(
    state: &WorkerState,
    request: &HttpRequest,
) -> Result<RouteReply, RequestError> {
    let path = request.path.split('?').next().unwrap_or_default();
    if path == HEALTH_PATH {
        if request.method != "GET" {
            return Err(RequestError::new(405, "Use GET for /health"));
        }
        return Ok(RouteReply::Health(HealthResponse {
            ok: true,
            hostname: state.hostname.clone(),
        }));
    }

    let route_op = path.strip_prefix('/').unwrap_or(path);
    if !state.pool.registry().contains(route_op) {
        return Err(RequestError::new(404, format!("No route for {}", path)));
    }
    if request.method != "POST" {
        return Err(RequestError::new(405, format!("Use POST for {}", path)));
    }

    let body = if request.body.iter().all(u8::is_ascii_whitespace) {
        RunRequest::default()
    } else {
        serde_json::from_slice::<RunRequest>(&request.body)
            .map_err(|err| RequestError::new(400, format!("Invalid JSON: {}", err)))?
    };
    let op_request = resolve_request(&state.settings, body)?;

    let outcome = state.pool.execute(op_request).await.map_err(|err| {
        if matches!(err, OperationError::Unknown { .. }) {
            RequestError::new(400, err.to_string())
        } else {
            RequestError::new(500, err.to_string())
        }
    })?;

    info!(
        "{} iters={} conc={} completed={} errors={} dur={:.3}s",
        outcome.operation,
        outcome.requested_iterations,
        outcome.concurrency.get(),
        outcome.completed,
        outcome.error_count,
        outcome.duration.as_secs_f64()
    );
    Ok(RouteReply::Run(Box::new(worker_result(
        outcome,
        &state.hostname,
    ))))
}

/// Fills request defaults: missing `op` and `iters` come from the worker
/// settings, missing `concurrency` is 1 and anything below 1 is raised to 1.
/// Concurrency above `max_concurrency` is rejected before any shard exists.
pub(super) fn resolve_request(
    settings: &WorkerSettings,
    body: RunRequest,
) -> Result<OperationRequest, RequestError> {
    let operation = body.op.unwrap_or_else(|| settings.default_op.clone());
    let iterations = match body.iters {
        Some(iters) => u64::try_from(iters)
            .map_err(|_negative| RequestError::new(400, "iters must be >= 0"))?,
        None => settings.default_iters,
    };
    let requested = body.concurrency.unwrap_or(1).max(1);
    let concurrency = usize::try_from(requested)
        .ok()
        .filter(|value| *value <= settings.max_concurrency)
        .and_then(|value| PositiveUsize::try_from(value).ok())
        .ok_or_else(|| {
            RequestError::new(
                400,
                format!(
                    "concurrency {} exceeds the worker limit of {}",
                    requested, settings.max_concurrency
                ),
            )
        })?;

    Ok(OperationRequest {
        operation,
        iterations,
        concurrency,
        payload: body.payload.unwrap_or_default(),
    })
}

/// Operation details from the shards plus the shard count.
pub(super) fn worker_result(outcome: PoolOutcome, hostname: &str) -> WorkerResult {
    let mut details = outcome.details;
    details.insert("shards".to_owned(), outcome.shards.into());
    WorkerResult {
        ok: true,
        op: outcome.operation,
        iters: outcome.requested_iterations,
        completed: Some(outcome.completed),
        concurrency: u64::try_from(outcome.concurrency.get()).unwrap_or(u64::MAX),
        duration_sec: outcome.duration.as_secs_f64(),
        throughput_ops_per_sec: outcome.throughput_ops_per_sec,
        errors: outcome.error_count,
        hostname: hostname.to_owned(),
        details,
    }
}
