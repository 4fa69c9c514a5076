mod cli_args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use warden_config::CommandKind;
use warden_runtime::{run_approve, run_autolabel, run_prcheck, GithubApiClient};

use crate::cli_args::Cli;

fn init_tracing(debug: bool) {
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let common = cli.command.common();
    let config_path = common.config.clone();

    let mut config = warden_config::load(config_path.as_deref())?;
    cli.command.merge_into(&mut config);
    init_tracing(config.debug.unwrap_or(false));

    // Captured once: the run processes items relative to this instant
    // and persists it as the next watermark.
    let run_started = Utc::now();
    let kind = cli.command.kind();
    let run_config = config.validate(kind, run_started)?;

    let client = GithubApiClient::new(&run_config.api_base, &run_config.token)
        .context("failed to create API client")?;

    let summary = match kind {
        CommandKind::Approve => run_approve(&client, &run_config, run_started)?,
        CommandKind::Autolabel => run_autolabel(&client, &run_config)?,
        CommandKind::PrCheck => run_prcheck(&client, &run_config)?,
    };
    summary.log();

    warden_config::persist_watermark(config_path.as_deref(), run_config.dry_run, run_started)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            // Tracing may not be initialized yet when config loading
            // itself fails, so errors go to stderr directly.
            eprintln!("error during execution: {failure:#}");
            ExitCode::FAILURE
        }
    }
}
