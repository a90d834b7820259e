use serde::{Deserialize, Serialize};

use crate::ops::Payload;

/// Body of `POST /<operation>`. Every field is optional; the worker fills in
/// its configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunRequest {
    pub op: Option<String>,
    pub iters: Option<i64>,
    pub concurrency: Option<i64>,
    pub payload: Option<Payload>,
}

/// Request body as sent by the controller.
#[derive(Debug, Serialize)]
pub(crate) struct DispatchBody<'run> {
    pub(crate) op: &'run str,
    pub(crate) iters: u64,
    pub(crate) concurrency: usize,
    pub(crate) payload: &'run Payload,
}

/// Result of one worker invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerResult {
    pub ok: bool,
    pub op: String,
    /// Iterations requested from this worker.
    pub iters: u64,
    /// Iterations actually completed; absent from workers that only report
    /// `iters`.
    #[serde(default)]
    pub completed: Option<u64>,
    pub concurrency: u64,
    pub duration_sec: f64,
    pub throughput_ops_per_sec: Option<f64>,
    pub errors: u64,
    pub hostname: String,
    #[serde(default)]
    pub details: Payload,
}

impl WorkerResult {
    #[must_use]
    pub fn completed_iterations(&self) -> u64 {
        self.completed.unwrap_or(self.iters)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub ok: bool,
    pub hostname: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse<'msg> {
    pub(crate) ok: bool,
    pub(crate) error: &'msg str,
}
