//! Command-line interface for voxlamp
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Voice-commanded lighting control
#[derive(Parser, Debug)]
#[command(name = "voxlamp", version, about = "Voice-commanded lighting control")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (streams partial recognition text)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Audio input device (e.g., hw:0)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Path to the Vosk model directory
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Lighting bridge base URL
    #[arg(long, value_name = "URL")]
    pub bridge_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
    /// Print the resolved configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_without_arguments() {
        let cli = Cli::parse_from(["voxlamp"]);
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from([
            "voxlamp",
            "--device",
            "pulse",
            "--model",
            "/models/vosk-small",
            "--bridge-url",
            "http://bridge.local:8080",
            "-v",
        ]);

        assert_eq!(cli.device.as_deref(), Some("pulse"));
        assert_eq!(cli.model, Some(PathBuf::from("/models/vosk-small")));
        assert_eq!(cli.bridge_url.as_deref(), Some("http://bridge.local:8080"));
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_parses_devices_subcommand() {
        let cli = Cli::parse_from(["voxlamp", "devices"]);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn test_cli_parses_config_subcommand_with_global_flag() {
        let cli = Cli::parse_from(["voxlamp", "config", "--config", "/tmp/v.toml"]);
        assert!(matches!(cli.command, Some(Commands::Config)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/v.toml")));
    }
}
