//! Home alarm simulator client binary.
//!
//! # Usage
//!
//! ```bash
//! # Connect to the default simulator (192.168.0.30:1314)
//! homealarm-client
//!
//! # Local simulator with custom delimiters and verbose logging
//! homealarm-client --host 127.0.0.1 --start-delimiter '{' --stop-delimiter '}' --log-level debug
//!
//! # Settings from a file, flags still win
//! homealarm-client --config alarm.toml --port 1500
//! ```

mod app;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use homealarm_core::Delimiters;
use homealarm_network::{
    CancellationToken, ClientConfig, Session, SessionEnd, SessionReport, SimulatorClient,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::DemoApplication;

/// Home alarm simulator client
#[derive(Parser, Debug)]
#[command(name = "homealarm-client")]
#[command(about = "Keypad-driven demo client for the home alarm simulator")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulator host name or IP address
    #[arg(long)]
    host: Option<String>,

    /// Simulator TCP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Start delimiter of every message
    #[arg(long)]
    start_delimiter: Option<String>,

    /// Stop delimiter of every message
    #[arg(long)]
    stop_delimiter: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Build the client configuration: file (or defaults), then flags.
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ClientConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.start_delimiter.is_some() || self.stop_delimiter.is_some() {
            let start = self
                .start_delimiter
                .as_deref()
                .unwrap_or(config.delimiters.start());
            let stop = self
                .stop_delimiter
                .as_deref()
                .unwrap_or(config.delimiters.stop());
            config.delimiters = Delimiters::new(start, stop).context("invalid delimiter flag")?;
        }

        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<ClientConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
}

/// Run the demo application on `session`, then close the write half.
///
/// The connection is shut down whether the receive loop ended cleanly or
/// not.
async fn drive<R, W>(session: Session<R, W>, cancel: CancellationToken) -> Result<SessionReport>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let sender = session.sender();
    let mut app = DemoApplication::new(sender.clone());
    let outcome = session.run(&mut app, cancel).await;

    if let Err(e) = sender.close().await {
        tracing::warn!("Failed to close connection: {}", e);
    }
    Ok(outcome?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = args.client_config()?;
    tracing::info!(
        "Home alarm client {} starting (delimiters {})",
        homealarm_core::VERSION,
        config.delimiters
    );

    let session = SimulatorClient::new(config)
        .connect()
        .await
        .context("failed to connect to simulator")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            on_signal.cancel();
        }
    });

    let report = drive(session, cancel).await?;

    if report.end == SessionEnd::PeerClosed {
        tracing::warn!("Simulator closed the connection");
    }
    tracing::info!(
        frames = report.stats.frames,
        dispatched = report.stats.dispatched,
        malformed = report.stats.malformed,
        unknown = report.stats.unknown,
        since = %report.stats.connected_at,
        "Session finished"
    );
    Ok(())
}
