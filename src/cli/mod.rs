//! CLI module for Voicebox.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Voicebox - voicemail inbox
///
/// Receives voicemail emails over a webhook, transcribes and titles the audio
/// locally, and serves the recordings back for playback.
#[derive(Parser, Debug)]
#[command(name = "voicebox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the webhook and playback HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List stored recordings, ordered by stored received_at descending
    List,

    /// Check external tools, model files and the title service
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["voicebox", "-vv", "serve", "--port", "9000"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::parse_from(["voicebox", "list", "--config", "/etc/voicebox.toml"]);
        assert_eq!(cli.config.as_deref(), Some("/etc/voicebox.toml"));
        assert!(matches!(cli.command, Commands::List));
    }
}
