//! picohash CLI Binary
//!
//! Generates and verifies BLAKE3 checksum manifests for a directory tree.

use clap::Parser;
use picohash::cli::{map_error, Cli, RunContext, EXIT_FATAL};
use picohash::config::ConfigLoader;
use picohash::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(EXIT_FATAL);
    }

    info!("picohash starting");

    let context = match RunContext::new(cli.directory.clone(), cli.config.clone()) {
        Ok(ctx) => ctx.with_cli_overrides(&cli),
        Err(e) => {
            error!("Error initializing run: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(EXIT_FATAL);
        }
    };

    match context.execute(&cli) {
        Ok(outcome) => {
            println!("{}", outcome.summary);
            process::exit(outcome.exit_code());
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(EXIT_FATAL);
        }
    }
}

/// Build logging configuration from CLI args and the config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::resolve(&cli.directory, cli.config.as_ref())
        .ok()
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }
    if cli.no_color {
        config.color = false;
    }

    config
}
