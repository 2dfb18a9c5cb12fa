//! xray-audit CLI entry point

use clap::Parser;
use console::style;
use std::path::Path;
use tracing::{debug, error, info};
use xray_audit::{cli, logging};

fn main() {
    let cli = cli::Cli::parse();

    let (config, source) = match cli.load_config() {
        Ok(loaded) => loaded,
        Err(e) => fatal(&e, None),
    };

    let logs_dir = cli.touches_dataset().then(|| config.output.logs_dir.clone());
    match logging::init(&cli.log_level, logs_dir.as_deref()) {
        Ok(Some(log_file)) => debug!("Logging to {}", log_file.display()),
        Ok(None) => {}
        Err(e) => fatal(&e, None),
    }
    match &source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("\n{} Analysis interrupted by user", style("⚠").yellow());
        std::process::exit(130);
    }) {
        debug!("Could not install Ctrl-C handler: {}", e);
    }

    if let Err(e) = cli::run(cli, config) {
        error!("Fatal error: {:#}", e);
        fatal(&e, logs_dir.as_deref());
    }
}

/// Print the error (and where to find the logs) and exit with status 1
fn fatal(e: &anyhow::Error, logs_dir: Option<&Path>) -> ! {
    eprintln!("{} Fatal error: {:#}", style("❌").red(), e);
    if let Some(dir) = logs_dir {
        eprintln!("Check the logs in {}", dir.display());
    }
    std::process::exit(1)
}
