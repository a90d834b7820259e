use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::pool::{merge_details, merge_shards};
use serde_json::json;

use super::{ExecutorPool, OperationRequest, ShardResult, plan, throughput};
use crate::args::PositiveUsize;
use crate::error::{AppError, AppResult, OperationError};
use crate::ops::{Operation, OperationOutput, OperationRegistry, Payload};

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn parts(value: usize) -> AppResult<PositiveUsize> {
    Ok(PositiveUsize::try_from(value)?)
}

/// Completes every iteration it is given.
struct Echo {
    calls: Arc<AtomicUsize>,
}

impl Operation for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn description(&self) -> &'static str {
        "test operation"
    }

    fn run(
        &self,
        _shard: usize,
        iterations: u64,
        _payload: &Payload,
    ) -> Result<OperationOutput, OperationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OperationOutput::completed(iterations))
    }
}

/// Fails its first `failures` invocations.
struct Flaky {
    failures: usize,
    calls: AtomicUsize,
}

impl Operation for Flaky {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn description(&self) -> &'static str {
        "test operation"
    }

    fn run(
        &self,
        _shard: usize,
        iterations: u64,
        _payload: &Payload,
    ) -> Result<OperationOutput, OperationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(OperationError::Injected {
                message: "flaky shard",
            });
        }
        Ok(OperationOutput::completed(iterations))
    }
}

struct Panics;

impl Operation for Panics {
    fn name(&self) -> &'static str {
        "panics"
    }

    fn description(&self) -> &'static str {
        "test operation"
    }

    fn run(
        &self,
        _shard: usize,
        iterations: u64,
        _payload: &Payload,
    ) -> Result<OperationOutput, OperationError> {
        if iterations > 1 {
            panic!("executor blew up");
        }
        Ok(OperationOutput::completed(iterations))
    }
}

fn test_pool(calls: &Arc<AtomicUsize>, failures: usize) -> AppResult<ExecutorPool> {
    let mut registry = OperationRegistry::default();
    registry.register(Echo {
        calls: Arc::clone(calls),
    })?;
    registry.register(Flaky {
        failures,
        calls: AtomicUsize::new(0),
    })?;
    registry.register(Panics)?;
    Ok(ExecutorPool::new(Arc::new(registry)))
}

fn request(operation: &str, iterations: u64, concurrency: usize) -> AppResult<OperationRequest> {
    Ok(OperationRequest {
        operation: operation.to_owned(),
        iterations,
        concurrency: parts(concurrency)?,
        payload: Payload::new(),
    })
}

#[test]
fn plan_places_remainder_on_last_shard() -> AppResult<()> {
    if plan(10, parts(3)?).shards() != [3, 3, 4] {
        return Err(AppError::validation("plan(10, 3) should be [3, 3, 4]"));
    }
    if plan(7, parts(4)?).shards() != [1, 1, 1, 4] {
        return Err(AppError::validation("plan(7, 4) should be [1, 1, 1, 4]"));
    }
    Ok(())
}

#[test]
fn plan_preserves_total_and_length() -> AppResult<()> {
    for total in [0u64, 1, 2, 9, 10, 99, 100, 1_000_003, u64::MAX] {
        for count in 1usize..=9 {
            let work_plan = plan(total, parts(count)?);
            if work_plan.len() != count {
                return Err(AppError::validation(format!(
                    "plan({}, {}) has {} shards",
                    total,
                    count,
                    work_plan.len()
                )));
            }
            let shards = work_plan.shards();
            let sum = shards
                .iter()
                .try_fold(0u64, |sum, shard| sum.checked_add(*shard))
                .ok_or_else(|| AppError::validation("Shard sum overflowed"))?;
            if sum != total {
                return Err(AppError::validation(format!(
                    "plan({}, {}) sums to {}",
                    total, count, sum
                )));
            }
            let base = total / count as u64;
            let leading = shards.split_last().map(|(_, rest)| rest).unwrap_or_default();
            if leading.iter().any(|shard| *shard != base) {
                return Err(AppError::validation(format!(
                    "plan({}, {}) has uneven leading shards: {:?}",
                    total,
                    count,
                    shards.get(..count.min(4))
                )));
            }
        }
    }
    Ok(())
}

#[test]
fn plan_of_zero_and_single_part() -> AppResult<()> {
    if plan(0, parts(5)?).shards() != [0, 0, 0, 0, 0] {
        return Err(AppError::validation("plan(0, 5) should be all zero"));
    }
    if plan(42, parts(1)?).shards() != [42] {
        return Err(AppError::validation("plan(42, 1) should be [42]"));
    }
    Ok(())
}

#[test]
fn plan_is_deterministic() -> AppResult<()> {
    let first = plan(1_234_567, parts(7)?);
    let second = plan(1_234_567, parts(7)?);
    if first != second || first.total() != 1_234_567 {
        return Err(AppError::validation("plan should be a pure function"));
    }
    Ok(())
}

#[test]
fn merge_counts_failed_shards() -> AppResult<()> {
    let results = [
        ShardResult {
            completed: 10,
            error: None,
            details: Payload::new(),
        },
        ShardResult {
            completed: 0,
            error: Some("boom".to_owned()),
            details: Payload::new(),
        },
        ShardResult {
            completed: 7,
            error: None,
            details: Payload::new(),
        },
    ];
    if merge_shards(&results) != (17, 1) {
        return Err(AppError::validation("Expected (17, 1)"));
    }
    Ok(())
}

fn shard(completed: u64, error: Option<&str>, details: serde_json::Value) -> ShardResult {
    ShardResult {
        completed,
        error: error.map(str::to_owned),
        details: details.as_object().cloned().unwrap_or_default(),
    }
}

#[test]
fn merge_details_sums_counters_of_successful_shards() -> AppResult<()> {
    let results = [
        shard(2, None, json!({"bytes_written": 130, "last_digest": "aa"})),
        shard(0, Some("boom"), json!({"bytes_written": 1_000})),
        shard(3, None, json!({"bytes_written": 195, "last_digest": "bb"})),
    ];
    let merged = merge_details(&results);
    if merged.get("bytes_written") != Some(&json!(325)) {
        return Err(AppError::validation(format!(
            "Expected bytes_written = 325, got {:?}",
            merged.get("bytes_written")
        )));
    }
    if merged.get("last_digest") != Some(&json!("aa")) {
        return Err(AppError::validation("Non-numeric details keep the first value"));
    }
    Ok(())
}

#[test]
fn throughput_is_none_without_elapsed_time() -> AppResult<()> {
    if throughput(100, Duration::ZERO).is_some() {
        return Err(AppError::validation("Zero duration must yield no throughput"));
    }
    match throughput(100, Duration::from_secs(4)) {
        Some(value) if (value - 25.0).abs() < 1e-9 => Ok(()),
        other => Err(AppError::validation(format!(
            "Unexpected throughput {:?}",
            other
        ))),
    }
}

#[test]
fn pool_completes_every_iteration() -> AppResult<()> {
    run_async_test(async {
        let calls = Arc::new(AtomicUsize::new(0));
        let pool = test_pool(&calls, 0)?;
        let outcome = pool.execute(request("echo", 100, 4)?).await?;
        if outcome.completed != 100 || outcome.error_count != 0 {
            return Err(AppError::validation(format!(
                "Expected 100/0, got {}/{}",
                outcome.completed, outcome.error_count
            )));
        }
        if outcome.shards != 4 || calls.load(Ordering::SeqCst) != 4 {
            return Err(AppError::validation("Expected four executors"));
        }
        if outcome.requested_iterations != 100 || outcome.concurrency.get() != 4 {
            return Err(AppError::validation("Request echo mismatch"));
        }
        Ok(())
    })
}

#[test]
fn pool_isolates_failing_shards() -> AppResult<()> {
    run_async_test(async {
        let calls = Arc::new(AtomicUsize::new(0));
        let pool = test_pool(&calls, 2)?;
        let outcome = pool.execute(request("flaky", 100, 4)?).await?;
        if outcome.error_count != 2 {
            return Err(AppError::validation(format!(
                "Expected 2 errors, got {}",
                outcome.error_count
            )));
        }
        if outcome.completed != 50 {
            return Err(AppError::validation(format!(
                "Expected 50 completed, got {}",
                outcome.completed
            )));
        }
        Ok(())
    })
}

#[test]
fn pool_counts_panicking_executor_as_error() -> AppResult<()> {
    run_async_test(async {
        let calls = Arc::new(AtomicUsize::new(0));
        let pool = test_pool(&calls, 0)?;
        // plan(5, 4) == [1, 1, 1, 2]: only the last shard panics.
        let outcome = pool.execute(request("panics", 5, 4)?).await?;
        if outcome.error_count != 1 || outcome.completed != 3 {
            return Err(AppError::validation(format!(
                "Expected 3/1, got {}/{}",
                outcome.completed, outcome.error_count
            )));
        }
        Ok(())
    })
}

#[test]
fn pool_rejects_unknown_operation_before_running() -> AppResult<()> {
    run_async_test(async {
        let calls = Arc::new(AtomicUsize::new(0));
        let pool = test_pool(&calls, 0)?;
        match pool.execute(request("missing", 100, 4)?).await {
            Err(OperationError::Unknown { name }) if name == "missing" => {}
            Err(err) => return Err(AppError::validation(format!("Unexpected error: {}", err))),
            Ok(_) => return Err(AppError::validation("Expected unknown operation")),
        }
        if calls.load(Ordering::SeqCst) != 0 {
            return Err(AppError::validation("No executor should have run"));
        }
        Ok(())
    })
}

#[test]
fn pool_reports_merged_operation_details() -> AppResult<()> {
    run_async_test(async {
        let pool = ExecutorPool::new(Arc::new(OperationRegistry::with_builtins(None)));
        let outcome = pool.execute(request("sha256_cpu", 10, 3)?).await?;
        // 64 hex characters plus a newline per digest.
        if outcome.details.get("bytes_written") != Some(&json!(650)) {
            return Err(AppError::validation(format!(
                "Expected bytes_written = 650, got {:?}",
                outcome.details
            )));
        }
        let device = pool.execute(request("device_sha256", 4, 2)?).await?;
        let digest_len = device
            .details
            .get("last_digest")
            .and_then(serde_json::Value::as_str)
            .map(str::len);
        if digest_len != Some(64) {
            return Err(AppError::validation("Expected a hex last_digest detail"));
        }
        Ok(())
    })
}

#[test]
fn pool_treats_zero_iterations_as_success() -> AppResult<()> {
    run_async_test(async {
        let pool = ExecutorPool::new(Arc::new(OperationRegistry::with_builtins(None)));
        for name in ["sha256_cpu", "sleep_us", "device_sha256"] {
            let outcome = pool.execute(request(name, 0, 3)?).await?;
            if outcome.completed != 0 || outcome.error_count != 0 || outcome.shards != 3 {
                return Err(AppError::validation(format!(
                    "{} should be a no-op for zero iterations",
                    name
                )));
            }
        }
        Ok(())
    })
}
