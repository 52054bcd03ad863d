//! Odoo gateway server binary

#![allow(missing_docs)]

use clap::Parser;
use odoo_gateway::{Config, server, utils::logging};
use std::path::PathBuf;
use std::process::ExitCode;

/// Gatekeeping gateway for Odoo
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about)]
struct Cli {
    /// YAML configuration file; environment variables override its values
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "config/gateway.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(Some(cli.config.as_path())).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(config.logging()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match server::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Display, not Debug, to keep bind errors readable
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
