//! Voice recorder CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_recorder::cli::{
    app::{load_merged_config, run_interactive, SessionOptions, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    devices_cmd::handle_devices_command,
    logging::init_logging,
    presenter::Presenter,
};
use voice_recorder::domain::config::{parse_volume, AppConfig};
use voice_recorder::domain::recording::Duration;
use voice_recorder::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Devices) => {
            if let Err(e) = handle_devices_command(&presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    // Validate CLI values before they reach the merged config
    if let Some(interval) = cli.chunk_interval.as_deref() {
        if let Err(e) = interval.parse::<Duration>() {
            presenter.error(&format!("Invalid chunk-interval: {}", e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    }
    let volume = match cli.volume.as_deref().map(parse_volume).transpose() {
        Ok(volume) => volume,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let cli_config = AppConfig {
        device: cli.device.clone(),
        chunk_interval: cli.chunk_interval.clone(),
        volume,
    };

    let config = load_merged_config(cli_config).await;
    run_interactive(SessionOptions::from_config(&config)).await
}
