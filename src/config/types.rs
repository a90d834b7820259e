use serde::Deserialize;

use crate::ops::Payload;

/// Controller config file as written by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Worker base URLs, one request is sent to each.
    #[serde(default)]
    pub workers: Vec<String>,
    pub op: Option<String>,
    pub total_iters: Option<u64>,
    pub concurrency_per_worker: Option<u64>,
    pub payload: Option<Payload>,
}
