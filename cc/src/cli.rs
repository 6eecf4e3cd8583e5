//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use notifystore::NotificationKind;
use std::path::PathBuf;
use tracing::debug;

/// Catalog - movie catalog client with transient status notifications
#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Movie catalog client with transient status notifications",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Raise a notification and follow it until it disappears
    Notify {
        /// Kind (success, error, warning, info)
        kind: NotificationKind,

        /// Notification title
        title: String,

        /// Notification message
        message: String,

        /// Display time before fading; 0 keeps it until dismissed
        #[arg(short, long)]
        duration_ms: Option<u64>,

        /// Submit the same notification this many times
        #[arg(short, long, default_value = "1")]
        repeat: u32,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run a scripted admin session against the in-memory catalog
    Demo {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config,
}

/// Output format for notification lists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => {
                debug!("OutputFormat::from_str: matched Text");
                Ok(Self::Text)
            }
            "json" => {
                debug!("OutputFormat::from_str: matched Json");
                Ok(Self::Json)
            }
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catalog")
        .join("logs")
        .join("catalog.log");
    debug!(?path, "get_log_path: returning path");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_notify() {
        let cli = Cli::parse_from([
            "catalog", "--log-level", "debug", "notify", "warn", "Careful", "Low disk", "-d", "500", "-r", "3",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Notify {
                kind,
                title,
                message,
                duration_ms,
                repeat,
                format,
            } => {
                assert_eq!(kind, NotificationKind::Warning);
                assert_eq!(title, "Careful");
                assert_eq!(message, "Low disk");
                assert_eq!(duration_ms, Some(500));
                assert_eq!(repeat, 3);
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["catalog", "notify", "loud", "t", "m"]).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_log_path_ends_with_catalog_log() {
        assert!(get_log_path().ends_with("catalog/logs/catalog.log"));
    }
}
