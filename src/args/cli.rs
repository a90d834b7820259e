use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::{OutputFormat, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Distributed load generator: splits an iteration count across HTTP workers and their local executors, then aggregates throughput and errors."
)]
pub struct KeycrateArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (overridden by KEYCRATE_LOG / RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Split work across the configured workers and print the aggregate
    Run(RunArgs),
    /// Serve operations over HTTP
    Worker(WorkerArgs),
    /// List the registered operations
    Ops,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Controller config file (.yaml, .yml, .toml or .json)
    #[arg(long, short, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Directory the config file must live in (defaults to the working directory)
    #[arg(long = "config-root")]
    pub config_root: Option<PathBuf>,

    /// Override the operation name
    #[arg(long)]
    pub op: Option<String>,

    /// Override the total iteration count
    #[arg(long)]
    pub iters: Option<u64>,

    /// Override the executor count per worker
    #[arg(long = "conc", value_parser = parse_positive_usize)]
    pub concurrency: Option<PositiveUsize>,

    /// Per-worker request timeout (supports ms/s/m/h)
    #[arg(long, default_value = "500s", value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Report format
    #[arg(long, default_value = "text", value_enum)]
    pub output: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct WorkerArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "KEYCRATE_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Operation used when a request does not name one
    #[arg(long = "default-op", default_value = crate::ops::DEFAULT_OPERATION)]
    pub default_op: String,

    /// Iteration count used when a request does not set one
    #[arg(long = "default-iters", default_value_t = 1_000_000)]
    pub default_iters: u64,

    /// Largest executor count a single request may ask for
    #[arg(
        long = "max-concurrency",
        default_value = "512",
        value_parser = parse_positive_usize
    )]
    pub max_concurrency: PositiveUsize,

    /// Directory for sha256_cpu digest files (digests are discarded when unset)
    #[arg(long = "hash-output")]
    pub hash_output: Option<PathBuf>,
}
