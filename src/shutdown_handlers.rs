use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::shutdown::{ShutdownReason, ShutdownReceiver, ShutdownSender};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// One pending notification is enough; every receiver stops on the first.
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Resolves with the first stop request: Ctrl+C, SIGTERM on unix, or a
/// message on `shutdown_rx`. Once every sender is dropped the channel can no
/// longer stop anything and only signals remain.
pub async fn wait_for_shutdown(mut shutdown_rx: ShutdownReceiver) -> ShutdownReason {
    tokio::select! {
        () = requested(&mut shutdown_rx) => ShutdownReason::Requested,
        () = interrupt() => ShutdownReason::Interrupt,
        () = terminate() => ShutdownReason::Terminate,
    }
}

async fn requested(shutdown_rx: &mut ShutdownReceiver) {
    match shutdown_rx.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => std::future::pending::<()>().await,
    }
}

async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal(SignalKind::terminate()) {
        Ok(mut term_signal) => {
            if term_signal.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
        Err(err) => {
            warn!("Failed to register SIGTERM handler: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use std::future::Future;
    use std::time::Duration;

    const SHUTDOWN_WAIT: Duration = Duration::from_secs(1);
    const IDLE_WAIT: Duration = Duration::from_millis(50);

    fn run_async_test<F>(future: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
        runtime.block_on(future)
    }

    #[test]
    fn channel_message_is_reported_as_request() -> AppResult<()> {
        run_async_test(async {
            let (shutdown_tx, shutdown_rx) = shutdown_channel();
            let waiter = tokio::spawn(wait_for_shutdown(shutdown_rx));
            if shutdown_tx.send(()).is_err() {
                return Err(AppError::validation("Failed to send shutdown"));
            }

            let reason = tokio::time::timeout(SHUTDOWN_WAIT, waiter)
                .await
                .map_err(|err| {
                    AppError::validation(format!("Timed out waiting for shutdown: {}", err))
                })?
                .map_err(|err| AppError::validation(format!("Shutdown task failed: {}", err)))?;
            if reason != ShutdownReason::Requested {
                return Err(AppError::validation(format!("Unexpected reason: {}", reason)));
            }
            Ok(())
        })
    }

    #[test]
    fn dropped_senders_do_not_stop_the_wait() -> AppResult<()> {
        run_async_test(async {
            let (shutdown_tx, shutdown_rx) = shutdown_channel();
            drop(shutdown_tx);
            if tokio::time::timeout(IDLE_WAIT, wait_for_shutdown(shutdown_rx))
                .await
                .is_ok()
            {
                return Err(AppError::validation(
                    "A closed channel must not count as a shutdown request",
                ));
            }
            Ok(())
        })
    }

    #[test]
    fn reasons_render_for_logs() -> AppResult<()> {
        for (reason, expected) in [
            (ShutdownReason::Interrupt, "interrupt (Ctrl+C)"),
            (ShutdownReason::Terminate, "SIGTERM"),
            (ShutdownReason::Requested, "shutdown request"),
        ] {
            if reason.to_string() != expected {
                return Err(AppError::validation(format!(
                    "{:?} rendered as {}",
                    reason, reason
                )));
            }
        }
        Ok(())
    }
}
