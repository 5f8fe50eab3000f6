//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// Voice recorder - record from the microphone and play it back
#[derive(Parser, Debug)]
#[command(name = "voice-recorder")]
#[command(version)]
#[command(about = "Record audio from a microphone and play it back")]
#[command(long_about = None)]
pub struct Cli {
    /// Input device name (see `voice-recorder devices`)
    #[arg(short = 'd', long, value_name = "NAME")]
    pub device: Option<String>,

    /// Interval between encoded chunks (e.g., 500ms, 1s; 0s for one chunk at stop)
    #[arg(short = 'i', long, value_name = "TIME")]
    pub chunk_interval: Option<String>,

    /// Playback volume from 0.0 to 2.0
    #[arg(long, value_name = "FLOAT")]
    pub volume: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List audio input devices
    Devices,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["device", "chunk_interval", "volume"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["voice-recorder"]);
        assert!(cli.device.is_none());
        assert!(cli.chunk_interval.is_none());
        assert!(cli.volume.is_none());
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_recording_options() {
        let cli = Cli::parse_from([
            "voice-recorder",
            "-d",
            "USB Mic",
            "-i",
            "250ms",
            "--volume",
            "0.5",
            "-v",
        ]);
        assert_eq!(cli.device.as_deref(), Some("USB Mic"));
        assert_eq!(cli.chunk_interval.as_deref(), Some("250ms"));
        assert_eq!(cli.volume.as_deref(), Some("0.5"));
        assert!(cli.verbose);
    }

    #[test]
    fn cli_parses_devices() {
        let cli = Cli::parse_from(["voice-recorder", "devices"]);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice-recorder", "config", "set", "volume", "0.8"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "volume");
            assert_eq!(value, "0.8");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("device"));
        assert!(is_valid_config_key("chunk_interval"));
        assert!(is_valid_config_key("volume"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
