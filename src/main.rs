//! CLI entry point for the Conversion Tools client.

use std::io::{self, IsTerminal};

use anyhow::{Result, anyhow};
use clap::Parser;
use conversiontools::ClientBuilder;
use conversiontools::config::API_TOKEN_ENV;
use tracing::debug;

mod cli;
mod commands;

use cli::{Args, Command};
use commands::ProgressUi;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info,conversiontools=debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(command = ?args.command, "CLI arguments parsed");

    let ui = ProgressUi::new(!args.quiet && io::stderr().is_terminal());

    // The built-in catalog needs no token
    if let Command::Types {
        conversion_type,
        remote: false,
    } = &args.command
    {
        return commands::run_types_command(conversion_type.as_deref());
    }

    let builder = client_builder(args.token, args.base_url, args.retries)?;
    dispatch(args.command, builder, &ui).await
}

async fn dispatch(command: Command, builder: ClientBuilder, ui: &ProgressUi) -> Result<()> {
    match command {
        Command::Convert(convert) => commands::run_convert_command(builder, convert, ui).await,
        Command::Upload { path } => commands::run_upload_command(builder, path, ui).await,
        Command::Info { file_id, json } => {
            commands::run_info_command(builder, &file_id, json).await
        }
        Command::Status { task_id, json } => {
            commands::run_status_command(builder, &task_id, json).await
        }
        Command::List { status, json } => commands::run_list_command(builder, status, json).await,
        Command::Download { file_id, output } => {
            commands::run_download_command(builder, &file_id, output, ui).await
        }
        Command::User => commands::run_user_command(builder).await,
        Command::LegacyRun(legacy) => commands::run_legacy_run_command(builder, legacy).await,
        Command::Types { .. } => commands::run_remote_types_command(builder).await,
    }
}

fn client_builder(
    token: Option<String>,
    base_url: Option<String>,
    retries: Option<u32>,
) -> Result<ClientBuilder> {
    let token = token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| anyhow!("missing API token: pass --token or set {API_TOKEN_ENV}"))?;

    let mut builder = ClientBuilder::new(token);
    if let Some(base_url) = base_url {
        builder = builder.base_url(base_url);
    }
    if let Some(retries) = retries {
        builder = builder.retries(retries);
    }
    Ok(builder)
}
