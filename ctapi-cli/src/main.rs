mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use ctapi::CtApi;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Command};
use crate::commands::Session;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let file_appender = tracing_appender::rolling::daily(&cli.log_dir, "ctapi-cli.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(filter),
        )
        .init();

    tracing::info!(command = ?cli.command, "Starting ctapi-cli");

    let mut stdout = std::io::stdout().lock();

    if let Command::Explain { code } = cli.command {
        return commands::explain(code, &mut stdout);
    }

    let dll_dir = cli
        .dll_dir
        .as_deref()
        .context("--dll-dir (or CTAPI_DLL_DIR) is required to connect")?;
    let api = CtApi::initialize(dll_dir)
        .with_context(|| format!("Failed to load CtAPI from {}", dll_dir.display()))?;

    let session = Session {
        host: cli.host.clone(),
        user: cli.user.clone(),
        password: cli.password.clone(),
        mode: cli.open_mode(),
        buffer_size: cli.buffer_size,
    };

    let res = commands::run(&api, &session, &cli.command, &mut stdout);
    if let Err(err) = &res {
        tracing::error!(error = ?err, "Command failed");
    }
    res
}
