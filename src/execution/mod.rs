//! Work splitting and the in-process executor pool.
mod plan;
mod pool;

#[cfg(test)]
mod tests;

pub use plan::{WorkPlan, plan};
pub use pool::{ExecutorPool, OperationRequest, PoolOutcome, ShardResult, throughput};
