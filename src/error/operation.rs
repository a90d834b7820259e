use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Unknown operation: {name}")]
    Unknown { name: String },
    #[error("Operation already registered: {name}")]
    AlreadyRegistered { name: &'static str },
    #[error("Invalid payload field '{field}' for {operation}: {reason}")]
    InvalidPayload {
        operation: &'static str,
        field: &'static str,
        reason: &'static str,
    },
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Device lock poisoned.")]
    DeviceLockPoisoned,
    #[error("Executor failed: {message}")]
    Executor { message: String },
    #[cfg(test)]
    #[error("Injected failure: {message}")]
    Injected { message: &'static str },
}
