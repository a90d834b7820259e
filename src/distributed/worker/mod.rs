mod http;
mod routes;


use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, WorkerError};
use crate::execution::ExecutorPool;
use crate::ops::OperationRegistry;
use crate::shutdown::{ShutdownReason, ShutdownReceiver};
use crate::shutdown_handlers::wait_for_shutdown;

/// Executor count a single request may ask for unless configured otherwise.
pub const DEFAULT_MAX_CONCURRENCY: usize = 512;

/// Defaults applied to requests that leave fields out, and request limits.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub default_op: String,
    pub default_iters: u64,
    /// Requests asking for more executors are rejected with 400.
    pub max_concurrency: usize,
}

pub(super) struct WorkerState {
    pool: ExecutorPool,
    hostname: String,
    settings: WorkerSettings,
}

/// HTTP front of one worker process: `GET /health` plus one
/// `POST /<operation>` route per registered operation.
pub struct WorkerServer {
    listener: TcpListener,
    state: Arc<WorkerState>,
}

impl WorkerServer {
    /// Binds the listener without accepting connections yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be bound.
    pub async fn bind(
        addr: &str,
        settings: WorkerSettings,
        registry: OperationRegistry,
    ) -> AppResult<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|err| {
            AppError::worker(WorkerError::Bind {
                addr: addr.to_owned(),
                source: err,
            })
        })?;
        Ok(Self {
            listener,
            state: Arc::new(WorkerState {
                pool: ExecutorPool::new(Arc::new(registry)),
                hostname: local_hostname(),
                settings,
            }),
        })
    }

    /// # Errors
    ///
    /// Returns an error when the socket address cannot be read.
    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        self.listener.local_addr().map_err(|err| {
            AppError::worker(WorkerError::Io {
                context: "read worker address",
                source: err,
            })
        })
    }

    /// Accepts connections until Ctrl+C, SIGTERM or a message on
    /// `shutdown_rx`, and returns which of them stopped the worker. Each
    /// connection is served on its own task.
    ///
    /// # Errors
    ///
    /// Returns an error when the listening address cannot be read.
    pub async fn serve(self, shutdown_rx: ShutdownReceiver) -> AppResult<ShutdownReason> {
        let addr = self.local_addr()?;
        let operations: Vec<&str> = self
            .state
            .pool
            .registry()
            .describe()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        info!(
            "Worker {} listening on {} (operations: {})",
            self.state.hostname,
            addr,
            operations.join(", ")
        );

        let shutdown = wait_for_shutdown(shutdown_rx);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                reason = &mut shutdown => {
                    info!("Worker on {} stopping on {}", addr, reason);
                    return Ok(reason);
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, _peer)) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(routes::handle_connection(socket, state));
                    }
                    Err(err) => warn!("Failed to accept connection: {}", err),
                },
            }
        }
    }
}

/// Host name reported by workers, `unknown` when it cannot be read.
#[must_use]
pub fn local_hostname() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_owned())
}
