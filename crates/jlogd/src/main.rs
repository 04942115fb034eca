//! jlogd - Log Query Daemon
//!
//! HTTP RPC gateway over journald and the kernel ring buffer.
//!
//! Usage:
//!   jlogd [OPTIONS] [config.toml]
//!
//! Options:
//!   -p, --port <port>  Listen port (overrides the config file)
//!
//! If no config file is provided, defaults are used: port 18090 and the
//! system `journalctl`/`dmesg`/`systemctl` binaries.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jlog_api::{create_router, AppState};
use jlog_journal::{CommandConfig, JournalctlStore, LogGateway, SystemCommandRunner};

const DEFAULT_PORT: u16 = 18090;

/// Daemon configuration (TOML)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DaemonConfig {
    /// Listen port; falls back to 18090
    port: Option<u16>,
    /// External command names, overridable for packaging quirks
    commands: CommandConfig,
}

/// Parsed command-line arguments
struct Args {
    /// Daemon config file (TOML)
    config_path: Option<String>,
    /// Listen port override
    port: Option<u16>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        config_path: None,
        port: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<u16>() {
                        Ok(port) => result.port = Some(port),
                        Err(_) => tracing::error!("Invalid port: {}", args[i + 1]),
                    }
                    i += 2;
                } else {
                    tracing::error!("Missing argument for --port");
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"jlogd - Log Query Daemon

Usage: jlogd [OPTIONS] [config.toml]

Options:
  -p, --port <port>  Listen port (overrides the config file)
  -h, --help         Print this help message

Examples:
  # Run with defaults (port 18090, system binaries)
  jlogd

  # Run with config file
  jlogd /etc/jlogd.toml

  # Override the port
  jlogd -p 8080 /etc/jlogd.toml
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jlogd=info,jlog_api=info,jlog_journal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting jlogd (Log Query Daemon)");

    let args = parse_args();

    let config = if let Some(ref path) = args.config_path {
        tracing::info!("Loading config from: {}", path);
        load_config_file(path)?
    } else {
        tracing::info!("No config file provided, using defaults");
        DaemonConfig::default()
    };

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);

    // Boot listing runs during construction and can take a moment on large
    // journals; keep it off the reactor
    let commands = config.commands;
    let journalctl = commands.journalctl.clone();
    let gateway = tokio::task::spawn_blocking(move || {
        LogGateway::new(
            Arc::new(JournalctlStore::new(journalctl)),
            Arc::new(SystemCommandRunner),
            commands,
        )
    })
    .await?;

    let state = AppState::new(Arc::new(gateway));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load daemon configuration from a TOML file
fn load_config_file(path: &str) -> anyhow::Result<DaemonConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}
