//! Core library for the `keycrate` CLI.
//!
//! A controller splits a total iteration count across HTTP workers; each
//! worker splits its share again across local executors running a named
//! operation, and the controller aggregates completions, errors and
//! throughput. The binary wires these pieces to the command line; the
//! library exposes them for embedding and tests.
pub mod args;
pub mod config;
pub mod distributed;
pub mod entry;
pub mod error;
pub mod execution;
pub mod ops;
pub mod shutdown;
pub mod shutdown_handlers;
mod system;
