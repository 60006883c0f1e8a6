mod cli;
mod commands;
mod config;
mod display;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use draftline_logging::{draft_error, draft_info, level_from_verbosity};

use crate::cli::{Cli, Command};
use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log_to, level_from_verbosity(cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            draft_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    draft_info!(
        "environment {:?}, backend {}, pacer {:?}",
        config.environment,
        config.client.base_url,
        config.pacer_mode
    );

    match cli.command {
        Command::Generate(args) => commands::generate(&config, args),
        Command::Query(args) => commands::query(&config, args),
        Command::Render(args) => commands::render(args),
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env(|key| std::env::var(key).ok())?;

    let (path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if let Some(file) = config::load_file(&path, required)? {
        config.apply_file(file)?;
    }

    if let Some(base_url) = &cli.base_url {
        config.client.base_url = base_url.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.client.api_key = api_key.clone();
    }
    if let Some(mode) = cli.pacer {
        config.pacer_mode = mode;
    }
    Ok(config)
}
