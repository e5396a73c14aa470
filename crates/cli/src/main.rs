// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gridctl — the grid agent CLI: submit cases, run the daemon pair, check
//! status, export the TSV report, and (hidden) run one worker subprocess.

mod commands;
mod exit_error;

use clap::{Parser, Subcommand};
use gridagent_daemon::{init_tracing, Bootstrap};
use std::path::PathBuf;
use std::process::ExitCode;

use exit_error::ExitError;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "gridctl", version, about = "Lightweight distributed compute grid coordinator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit one or more paths for processing by an application
    Submit {
        #[arg(long)]
        app: String,
        paths: Vec<PathBuf>,
    },
    /// Daemon management
    #[command(subcommand)]
    Daemon(DaemonCommand),
    /// List the caller's own open cases
    Status,
    /// Export the fixed 19-column TSV report
    Report {
        #[arg(long)]
        out: PathBuf,
    },
    /// Run one worker subprocess for an already-claimed case (internal use)
    #[command(hide = true)]
    Worker {
        #[arg(long = "case-id")]
        case_id: String,
        #[arg(long)]
        scratch: PathBuf,
    },
}

#[derive(Subcommand)]
enum DaemonCommand {
    /// Run the processing and receiving daemons in the foreground
    Run {
        #[arg(long, default_value_t = 1)]
        concurrency: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            ExitCode::from(err.code.clamp(0, 255) as u8)
        }
    }
}

async fn dispatch(command: Command) -> Result<(), ExitError> {
    let cwd = std::env::current_dir().map_err(|err| ExitError::new(1, format!("cannot read cwd: {err}")))?;

    match command {
        Command::Submit { app, paths } => {
            let bootstrap = Bootstrap::init(&cwd, BUILD_VERSION).await?;
            commands::submit::run(
                bootstrap.catalog,
                bootstrap.blobs,
                bootstrap.plugins,
                &bootstrap.config.user_group,
                &bootstrap.config.instance,
                &bootstrap.config.user,
                &bootstrap.config.machine,
                &app,
                paths,
            )
            .await
        }
        Command::Daemon(DaemonCommand::Run { concurrency }) => {
            init_tracing();
            commands::daemon::run(&cwd, BUILD_VERSION, concurrency).await
        }
        Command::Status => {
            let bootstrap = Bootstrap::init(&cwd, BUILD_VERSION).await?;
            commands::status::run(
                &bootstrap.catalog,
                &bootstrap.config.user_group,
                &bootstrap.config.instance,
                &bootstrap.config.user,
                &bootstrap.config.machine,
            )
            .await
        }
        Command::Report { out } => {
            let bootstrap = Bootstrap::init(&cwd, BUILD_VERSION).await?;
            commands::report::run(&bootstrap.catalog, &bootstrap.config.user_group, &out).await
        }
        Command::Worker { case_id, scratch } => {
            commands::worker::run(&cwd, BUILD_VERSION, &case_id, scratch).await
        }
    }
}
