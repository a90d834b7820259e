use clap::Parser;
use tracing::{error, info};

use crate::args::{Command, KeycrateArgs, OutputFormat, RunArgs, WorkerArgs};
use crate::config::{load_config, resolve_run};
use crate::distributed::controller::{banner_line, render_json, render_text};
use crate::distributed::{WorkerServer, WorkerSettings, run_controller};
use crate::error::{AppError, AppResult, OperationError};
use crate::ops::OperationRegistry;
use crate::shutdown_handlers::shutdown_channel;

/// Parses the command line, installs logging and runs the chosen subcommand
/// on a multi-threaded tokio runtime.
///
/// # Errors
///
/// Returns configuration, bind and runtime errors. Individual worker failures
/// during a run are reported, not returned.
pub fn run() -> AppResult<()> {
    let args = KeycrateArgs::parse();
    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run_async(args));
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}

async fn run_async(args: KeycrateArgs) -> AppResult<()> {
    match args.command {
        Command::Run(run_args) => run_command(&run_args).await,
        Command::Worker(worker_args) => worker_command(worker_args).await,
        Command::Ops => {
            list_operations();
            Ok(())
        }
    }
}

async fn run_command(args: &RunArgs) -> AppResult<()> {
    let file = load_config(&args.config, args.config_root.as_deref())?;
    let run = resolve_run(file, args)?;

    match args.output {
        OutputFormat::Text => {
            println!("{}", banner_line(&run));
            let report = run_controller(&run).await?;
            println!("{}", render_text(&report));
        }
        OutputFormat::Json => {
            let report = run_controller(&run).await?;
            println!("{}", render_json(&report)?);
        }
    }
    Ok(())
}

async fn worker_command(args: WorkerArgs) -> AppResult<()> {
    if let Some(dir) = args.hash_output.as_deref() {
        std::fs::create_dir_all(dir)?;
        info!("Writing sha256_cpu digests to {}", dir.display());
    }
    let registry = OperationRegistry::with_builtins(args.hash_output);
    if !registry.contains(&args.default_op) {
        return Err(AppError::operation(OperationError::Unknown {
            name: args.default_op,
        }));
    }

    let addr = format!("{}:{}", args.host, args.port);
    let settings = WorkerSettings {
        default_op: args.default_op,
        default_iters: args.default_iters,
        max_concurrency: args.max_concurrency.get(),
    };
    let server = WorkerServer::bind(&addr, settings, registry).await?;

    // Only signals stop a standalone worker; the sender stays unused.
    let (_shutdown_tx, shutdown_rx) = shutdown_channel();
    server.serve(shutdown_rx).await?;
    Ok(())
}

fn list_operations() {
    let registry = OperationRegistry::with_builtins(None);
    for (name, description) in registry.describe() {
        println!("{:<14} {}", name, description);
    }
}
