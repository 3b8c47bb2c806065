//! TCP client for the home alarm simulator.
//!
//! The client only establishes the connection. Everything after that lives
//! in the [`Session`] it returns: the receive loop and the
//! [`CommandSender`](crate::CommandSender).
//!
//! # Example Usage
//!
//! ```no_run
//! use homealarm_network::{ClientConfig, SimulatorClient};
//! use homealarm_protocol::LoggingHandler;
//! use homealarm_core::{Device, SwitchValue};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SimulatorClient::new(ClientConfig {
//!     host: "127.0.0.1".to_string(),
//!     ..Default::default()
//! });
//!
//! let session = client.connect().await?;
//! let sender = session.sender();
//! sender.set_light(Device::Light, SwitchValue::On).await?;
//!
//! let report = session.run(&mut LoggingHandler, CancellationToken::new()).await?;
//! println!("Session ended: {:?}", report.end);
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: Caller decides whether to reconnect
//! - **One connection**: Each client talks to one simulator
//! - **Simple error handling**: Clear errors, no recovery

use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::session::Session;

/// Client that connects to the simulator
#[derive(Debug, Clone)]
pub struct SimulatorClient {
    config: ClientConfig,
}

impl SimulatorClient {
    /// Create a new client with the given configuration
    ///
    /// No connection is made until [`connect`](SimulatorClient::connect).
    pub fn new(config: ClientConfig) -> Self {
        debug!("Creating simulator client for {}", config.addr());
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect to the simulator
    ///
    /// Resolves the configured host, connects with timeout and sets
    /// TCP_NODELAY so single commands go out immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Connection times out
    /// - The host cannot be resolved
    /// - The simulator refuses the connection
    pub async fn connect(&self) -> Result<Session, TransportError> {
        let addr = self.config.addr();
        let timeout = self.config.connect_timeout();
        info!("Connecting to simulator at {}", addr);

        let stream = match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => {
                info!("Successfully connected to {}", addr);
                stream
            }
            Ok(Err(e)) => {
                error!("Connection failed: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                warn!("Connection timeout after {}ms", timeout.as_millis());
                return Err(TransportError::ConnectionTimeout(timeout.as_millis() as u64));
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {} - commands may be delayed", e);
        }

        let (reader, writer) = stream.into_split();
        Ok(
            Session::new(reader, writer, self.config.delimiters.clone())
                .with_write_timeout(self.config.write_timeout()),
        )
    }
}
