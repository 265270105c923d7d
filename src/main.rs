use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error};

use nexus_admin::cli::{self, Cli, Command};
use nexus_admin::config::{load_config, print_schema};
use nexus_admin::navigation::RouteHistory;
use nexus_admin::startup::build_state;
use nexus_admin::utils::logger::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Schema = cli.command {
        return match print_schema() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Failed to print schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    debug!("Loaded configuration from {}", cli.config.display());

    let history = Arc::new(RouteHistory::new());
    let state = match build_state(Arc::new(config), history.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = cli::run(cli.command, &state).await;

    for route in history.take() {
        eprintln!("-> {}", route);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
