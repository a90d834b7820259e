use url::Url;

use crate::args::{PositiveUsize, RunArgs};
use crate::distributed::ControllerRun;
use crate::error::{AppError, AppResult, ConfigError};
use crate::ops::DEFAULT_OPERATION;

use super::types::ConfigFile;

/// Total iterations when neither the config nor the CLI sets them.
pub const DEFAULT_TOTAL_ITERS: u64 = 2_000_000;
/// Executors per worker when neither the config nor the CLI sets them.
pub const DEFAULT_CONCURRENCY_PER_WORKER: usize = 4;

/// Merges the config file with CLI overrides; CLI values win.
///
/// # Errors
///
/// Returns an error when no workers are configured, a worker URL is invalid,
/// or `concurrency_per_worker` is zero.
pub fn resolve_run(file: ConfigFile, args: &RunArgs) -> AppResult<ControllerRun> {
    if file.workers.is_empty() {
        return Err(AppError::config(ConfigError::NoWorkers));
    }
    for worker in &file.workers {
        validate_worker_url(worker)?;
    }

    let concurrency_per_worker = match args.concurrency {
        Some(concurrency) => concurrency,
        None => match file.concurrency_per_worker {
            Some(value) => usize::try_from(value)
                .ok()
                .and_then(|value| PositiveUsize::try_from(value).ok())
                .ok_or_else(|| {
                    AppError::config(ConfigError::FieldMustBePositive {
                        field: "concurrency_per_worker",
                    })
                })?,
            None => PositiveUsize::try_from(DEFAULT_CONCURRENCY_PER_WORKER)?,
        },
    };

    Ok(ControllerRun {
        workers: file.workers,
        op: args
            .op
            .clone()
            .or(file.op)
            .unwrap_or_else(|| DEFAULT_OPERATION.to_owned()),
        total_iters: args
            .iters
            .or(file.total_iters)
            .unwrap_or(DEFAULT_TOTAL_ITERS),
        concurrency_per_worker,
        payload: file.payload.unwrap_or_default(),
        timeout: args.timeout,
    })
}

fn validate_worker_url(worker: &str) -> AppResult<()> {
    let parsed = Url::parse(worker).map_err(|err| {
        AppError::config(ConfigError::InvalidWorkerUrl {
            url: worker.to_owned(),
            source: err,
        })
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(AppError::config(ConfigError::UnsupportedWorkerScheme {
            url: worker.to_owned(),
        })),
    }
}
