//! Controller and worker halves of a distributed run, plus the JSON bodies
//! exchanged between them.
pub mod controller;
pub mod protocol;
pub mod worker;

pub use controller::{AggregateReport, ControllerRun, WorkerFailure, run_controller};
pub use worker::{DEFAULT_MAX_CONCURRENCY, WorkerServer, WorkerSettings, local_hostname};
