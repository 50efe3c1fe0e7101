#![allow(clippy::print_stdout)]

pub mod args;
pub mod commands;

use crate::args::Cli;
use anyhow::{Context, Result};
use clap::Parser;
use pbx::domain::config::LogConfig;
use pbx::kernel::config::load_pbx_config;
use pbx_logger::{FileSink, Logger, parse_level, parse_rotation};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_pbx_config(cli.config.as_deref()).context("Failed to load configuration")?;
    config.modules.disabled.extend(cli.disable.iter().cloned());

    let _logger = init_logger(&config.log, cli.log_level.as_deref())?;

    let registry = pbx::init(&config).await.context("Failed to start the module runtime")?;
    info!(modules = registry.len(), "Module runtime started");
    debug!(command = ?cli.command, "Running shell command");
    commands::run(&registry, cli.command).await
}

fn init_logger(log: &LogConfig, level_override: Option<&str>) -> Result<Logger> {
    let level = parse_level(level_override.unwrap_or(&log.level))?;

    let mut builder = Logger::builder(env!("CARGO_PKG_NAME")).level(level).console(log.console);
    if let Some(directives) = &log.directives {
        builder = builder.directives(directives.as_str());
    }
    if let Some(file) = &log.file {
        builder = builder.file(
            FileSink::new(&file.dir)
                .rotation(parse_rotation(&file.rotation)?)
                .max_files(file.max_files)
                .json(file.json),
        );
    }

    builder.init().context("Failed to initialize logging")
}
