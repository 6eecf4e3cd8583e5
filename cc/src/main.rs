//! Catalog - movie catalog client
//!
//! CLI entry point for raising notifications and running the demo session.

use std::fs;
use std::io::Write;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::{debug, info};

use catalogclient::cli::{Cli, Command, OutputFormat, get_log_path};
use catalogclient::config::Config;
use catalogclient::demo::run_demo;
use catalogclient::watch::follow;
use notifystore::{NotificationKind, Notifier};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(format!("Logs are written to: {}", get_log_path().display()));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        default_duration_ms = config.notifications.default_duration_ms,
        fade_window_ms = config.notifications.fade_window_ms,
        base_url = %config.catalog.base_url,
        "Catalog loaded config"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Notify {
            kind,
            title,
            message,
            duration_ms,
            repeat,
            format,
        } => {
            debug!(%kind, %title, ?duration_ms, repeat, "main: matched Notify command");
            cmd_notify(&config, kind, title, message, duration_ms, repeat, format).await
        }
        Command::Demo { format } => {
            debug!(?format, "main: matched Demo command");
            cmd_demo(&config, format).await
        }
        Command::Config => {
            debug!("main: matched Config command");
            cmd_config(&config)
        }
    }
}

/// Submit a notification (possibly repeatedly) and follow it to expiry
async fn cmd_notify(
    config: &Config,
    kind: NotificationKind,
    title: String,
    message: String,
    duration_ms: Option<u64>,
    repeat: u32,
    format: OutputFormat,
) -> Result<()> {
    debug!(%kind, repeat, "cmd_notify: called");
    let notifier = Notifier::new(config.notifications.clone())?;
    let mut view = notifier.mount();
    let duration = duration_ms.map(Duration::from_millis);

    let mut accepted = 0;
    for _ in 0..repeat.max(1) {
        if notifier.notify(kind, title.clone(), message.clone(), duration).is_accepted() {
            accepted += 1;
        }
    }
    let rejected = repeat.max(1) - accepted;
    info!(accepted, rejected, "cmd_notify: submitted");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if format == OutputFormat::Text {
        writeln!(out, "accepted {}, rejected {} as duplicate", accepted, rejected).context("Failed to write output")?;
    }
    follow(&notifier, &mut view, format, &mut out).await?;
    let _ = view.unmount();
    Ok(())
}

/// Run the scripted dashboard session
async fn cmd_demo(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_demo: called");
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = run_demo(config, format, &mut out).await?;
    if format == OutputFormat::Text {
        writeln!(
            out,
            "demo finished: {} steps, {} movies left, {} list updates while expiring",
            summary.steps, summary.movies, summary.snapshots
        )
        .context("Failed to write output")?;
    }
    Ok(())
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    print!("{}", config.to_yaml()?);
    Ok(())
}
