use std::fmt;

use tokio::sync::broadcast;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

/// What stopped a long-running command such as `keycrate worker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl+C.
    Interrupt,
    /// SIGTERM (unix only).
    Terminate,
    /// A message on the shutdown channel.
    Requested,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Interrupt => "interrupt (Ctrl+C)",
            Self::Terminate => "SIGTERM",
            Self::Requested => "shutdown request",
        };
        f.write_str(label)
    }
}
