//! Outbound command channel.
//!
//! [`CommandSender`] is a cheap, cloneable handle to the write half of the
//! connection. All clones share one framed writer behind an async mutex, so
//! concurrent callers (including handlers running inside the receive loop)
//! never interleave bytes of two commands.

use futures::SinkExt;
use homealarm_core::{Delimiters, Device, SwitchValue};
use homealarm_protocol::{AlarmCodec, Command};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio_util::codec::FramedWrite;
use tracing::{debug, error, info, trace, warn};

use crate::error::TransportError;

/// Flush and shutdown budget when closing.
const CLOSE_TIMEOUT: Duration = Duration::from_millis(500);

/// Handle for sending commands to the simulator
///
/// # Example
///
/// ```
/// use homealarm_network::CommandSender;
/// use homealarm_core::{Delimiters, Device, SwitchValue};
/// use std::time::Duration;
/// use tokio::io::AsyncReadExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (local, mut peer) = tokio::io::duplex(64);
/// let sender = CommandSender::new(local, Delimiters::default(), Duration::from_secs(1));
///
/// sender.set_led(Device::LedGreen, SwitchValue::On).await?;
/// sender.close().await?;
///
/// let mut wire = String::new();
/// peer.read_to_string(&mut wire).await?;
/// assert_eq!(wire, ">1 27 1<");
/// # Ok(())
/// # }
/// ```
pub struct CommandSender<W = OwnedWriteHalf> {
    /// Framed writer (None once closed)
    framed: Arc<Mutex<Option<FramedWrite<W, AlarmCodec>>>>,

    /// Timeout for a single command write
    pub(crate) write_timeout: Duration,
}

impl<W> Clone for CommandSender<W> {
    fn clone(&self) -> Self {
        Self {
            framed: Arc::clone(&self.framed),
            write_timeout: self.write_timeout,
        }
    }
}

impl<W: AsyncWrite + Unpin> CommandSender<W> {
    /// Wrap a write half with the given delimiters.
    pub fn new(writer: W, delimiters: Delimiters, write_timeout: Duration) -> Self {
        Self {
            framed: Arc::new(Mutex::new(Some(FramedWrite::new(
                writer,
                AlarmCodec::with_delimiters(delimiters),
            )))),
            write_timeout,
        }
    }

    /// Send one command
    ///
    /// Encodes and flushes the command with timeout enforcement.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sender has been closed
    /// - The write times out
    /// - The encoded command exceeds the frame size limit
    /// - The connection fails
    pub async fn send(&self, command: Command) -> Result<(), TransportError> {
        trace!(%command, "Sending command");

        let mut guard = self.framed.lock().await;
        let framed = guard.as_mut().ok_or(TransportError::NotConnected)?;

        match tokio::time::timeout(self.write_timeout, framed.send(command)).await {
            Ok(Ok(())) => {
                trace!("Command sent");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Failed to send command: {}", e);
                Err(e.into())
            }
            Err(_) => {
                warn!("Send timeout after {}ms", self.write_timeout.as_millis());
                Err(TransportError::WriteTimeout(
                    self.write_timeout.as_millis() as u64
                ))
            }
        }
    }

    /// Switch a light on or off.
    pub async fn set_light(&self, light: Device, value: SwitchValue) -> Result<(), TransportError> {
        self.send(Command::switch(light, value)).await
    }

    /// Switch an LED on or off.
    pub async fn set_led(&self, led: Device, value: SwitchValue) -> Result<(), TransportError> {
        self.send(Command::switch(led, value)).await
    }

    /// Set up a phone call: number, call type and area, in that order.
    ///
    /// Stops at the first failed send. Fields already sent are not rolled
    /// back.
    pub async fn set_call(
        &self,
        number: &str,
        call_type: &str,
        area: &str,
    ) -> Result<(), TransportError> {
        self.send(Command::text(Device::PhoneNum, number)).await?;
        self.send(Command::text(Device::PhoneType, call_type)).await?;
        self.send(Command::text(Device::PhoneArea, area)).await
    }

    /// Returns `true` once [`close`](CommandSender::close) has run.
    pub async fn is_closed(&self) -> bool {
        self.framed.lock().await.is_none()
    }

    /// Close the write half gracefully
    ///
    /// Flushes pending bytes and shuts the writer down, so the simulator
    /// sees end of stream. Idempotent; every clone observes the close.
    ///
    /// Flush and shutdown have a 500ms timeout each to prevent hanging if
    /// the network is down or unresponsive.
    pub async fn close(&self) -> Result<(), TransportError> {
        let Some(mut framed) = self.framed.lock().await.take() else {
            return Ok(());
        };
        info!("Closing connection to simulator");

        match tokio::time::timeout(CLOSE_TIMEOUT, framed.flush()).await {
            Ok(Ok(())) => debug!("Flush completed successfully"),
            Ok(Err(e)) => warn!("Error flushing during close: {}", e),
            Err(_) => warn!("Flush timeout during close ({}ms)", CLOSE_TIMEOUT.as_millis()),
        }

        let mut writer = framed.into_inner();
        match tokio::time::timeout(CLOSE_TIMEOUT, writer.shutdown()).await {
            Ok(Ok(())) => debug!("Shutdown completed successfully"),
            Ok(Err(e)) => warn!("Error during shutdown: {}", e),
            Err(_) => warn!("Shutdown timeout during close ({}ms)", CLOSE_TIMEOUT.as_millis()),
        }

        Ok(())
    }
}
