//! Controller configuration loading and CLI override application.
mod apply;
mod loader;
pub mod types;


pub use apply::{DEFAULT_CONCURRENCY_PER_WORKER, DEFAULT_TOTAL_ITERS, resolve_run};
pub use loader::{load_config, load_config_file};
