//! # parlor
//!
//! Chat server binary: loads settings, starts the room and the HTTP
//! listener, and runs until Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use parlor_settings::{LoggingSettings, ParlorSettings};

/// Single-room chat server.
#[derive(Parser, Debug)]
#[command(name = "parlor", about = "Single-room WebSocket chat server")]
struct Cli {
    /// Listen address, `host:port` or `:port`. Overrides settings.
    #[arg(long)]
    addr: Option<String>,

    /// JSON settings file, deep-merged over the defaults.
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl Cli {
    fn load_settings(&self) -> Result<ParlorSettings> {
        let mut settings = parlor_settings::load_settings(self.settings.as_deref())
            .context("Failed to load settings")?;
        if let Some(addr) = &self.addr {
            settings
                .server
                .apply_listen_addr(addr)
                .context("Invalid --addr")?;
        }
        Ok(settings)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_subscriber(logging: &LoggingSettings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_filter_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // set_global_default is a no-op if already set
    let _ = if logging.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.load_settings()?;
    init_subscriber(&settings.logging);

    let metrics = parlor_server::metrics::install_recorder()?;
    let server = parlor_server::start(&settings, Some(metrics))
        .await
        .context("Failed to start server")?;
    tracing::info!(addr = %server.local_addr(), "Starting web server");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("shutdown requested");
    server.stop(None).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_flag_overrides_settings() {
        let cli = Cli::parse_from(["parlor", "--addr", ":9999"]);
        let settings = cli.load_settings().unwrap();
        assert_eq!(settings.server.listen_addr(), "0.0.0.0:9999");
    }

    #[test]
    fn bad_addr_is_an_error() {
        let cli = Cli::parse_from(["parlor", "--addr", "nowhere"]);
        assert!(cli.load_settings().is_err());
    }

    #[test]
    fn settings_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parlor.json");
        std::fs::write(&path, r#"{"server": {"maxConnections": 7}}"#).unwrap();

        let cli = Cli::parse_from(["parlor", "--settings", path.to_str().unwrap()]);
        assert_eq!(cli.load_settings().unwrap().server.max_connections, 7);
    }
}
