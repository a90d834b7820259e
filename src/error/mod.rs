mod app;
mod config;
mod operation;
mod validation;
mod worker;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use operation::OperationError;
pub use validation::ValidationError;
pub use worker::WorkerError;
