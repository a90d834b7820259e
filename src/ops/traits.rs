use crate::error::OperationError;

/// Operation-specific inputs shared read-only by every shard of a request.
pub type Payload = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationOutput {
    pub completed: u64,
    pub details: Payload,
}

impl OperationOutput {
    #[must_use]
    pub fn completed(completed: u64) -> Self {
        Self {
            completed,
            details: Payload::new(),
        }
    }
}

/// A unit of work that can be run for a number of iterations.
///
/// Implementations are invoked concurrently from several executors of the same
/// process. Anything that must not run in parallel is serialized by the
/// implementation itself.
pub trait Operation: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// Runs `iterations` iterations for shard `shard` of a request and reports
    /// how many completed. Shard indexes start at 0 for every request.
    ///
    /// A zero iteration count must succeed immediately with `completed == 0`.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is unusable or the work itself fails;
    /// partial completion is never reported as success.
    fn run(
        &self,
        shard: usize,
        iterations: u64,
        payload: &Payload,
    ) -> Result<OperationOutput, OperationError>;
}
