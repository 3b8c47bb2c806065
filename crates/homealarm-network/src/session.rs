//! Transport session: the inbound receive loop.
//!
//! A [`Session`] owns the read half of the connection and a
//! [`CommandSender`] for the write half. [`Session::run`] reads frames until
//! the simulator closes the connection, a read fails, or the cancellation
//! token fires. Each frame is decoded and dispatched inline; a bad message
//! is logged and skipped without affecting the ones after it.
//!
//! # Architecture
//!
//! ```text
//! Simulator ──(TCP)──> FramedRead<AlarmCodec> ──> Command::decode ──> Dispatcher ──> AlarmHandler
//!     ^                                                                                  │
//!     └──────────────────────────── CommandSender <──────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use futures::StreamExt;
use homealarm_core::{Delimiters, Error, constants::DEFAULT_WRITE_TIMEOUT_MS};
use homealarm_protocol::{AlarmCodec, AlarmHandler, Command, Dispatcher, Frame, ReassemblerState};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::error::TransportError;
use crate::sender::CommandSender;

/// Why a receive loop ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The simulator closed the connection.
    PeerClosed,
    /// The cancellation token fired.
    Cancelled,
}

/// Counters collected by the receive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Complete frames read from the connection.
    pub frames: u64,
    /// Frames delivered to the handler.
    pub dispatched: u64,
    /// Frames dropped because they did not decode.
    pub malformed: u64,
    /// Frames dropped because their device type has no inbound handler.
    pub unknown: u64,
    /// When the session was created.
    pub connected_at: DateTime<Utc>,
}

impl SessionStats {
    fn new() -> Self {
        Self {
            frames: 0,
            dispatched: 0,
            malformed: 0,
            unknown: 0,
            connected_at: Utc::now(),
        }
    }
}

/// Outcome of [`Session::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub end: SessionEnd,
    pub stats: SessionStats,
}

/// One connection to the simulator
///
/// Generic over the read and write halves so that tests can run sessions
/// over in-memory pipes; [`SimulatorClient`](crate::SimulatorClient)
/// produces sessions over TCP.
pub struct Session<R = OwnedReadHalf, W = OwnedWriteHalf> {
    reader: FramedRead<R, AlarmCodec>,
    sender: CommandSender<W>,
    stats: SessionStats,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a session over a read half and a write half.
    ///
    /// Both directions use `delimiters`. Outbound writes time out after the
    /// default write timeout; see [`with_write_timeout`](Session::with_write_timeout).
    pub fn new(reader: R, writer: W, delimiters: Delimiters) -> Self {
        Self {
            reader: FramedRead::new(reader, AlarmCodec::with_delimiters(delimiters.clone())),
            sender: CommandSender::new(
                writer,
                delimiters,
                Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
            ),
            stats: SessionStats::new(),
        }
    }

    /// Replace the outbound write timeout.
    ///
    /// Applies to senders obtained after this call.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.sender.write_timeout = write_timeout;
        self
    }

    /// Handle for sending commands on this connection.
    ///
    /// The handle stays valid after the receive loop ends; sends then fail
    /// once the connection is gone.
    pub fn sender(&self) -> CommandSender<W> {
        self.sender.clone()
    }

    /// Counters so far.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Run the receive loop until the peer closes, a read fails, or
    /// `cancel` fires.
    ///
    /// Handler calls are awaited inline: a slow handler delays reception of
    /// the following messages. Malformed and unroutable messages are logged
    /// and skipped.
    ///
    /// # Errors
    ///
    /// - `TransportError::Io` if reading from the connection fails
    /// - `TransportError::ConnectionLost` if the simulator closes the
    ///   connection in the middle of a message
    /// - `TransportError::Protocol` for a failure that is not confined to
    ///   one message
    ///
    /// A clean end of stream and cancellation are not errors.
    pub async fn run<H: AlarmHandler>(
        mut self,
        handler: &mut H,
        cancel: CancellationToken,
    ) -> Result<SessionReport, TransportError> {
        info!("Receive loop started");

        let end = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Receive loop cancelled");
                    break SessionEnd::Cancelled;
                }
                next = self.reader.next() => next,
            };

            match next {
                Some(Ok(frame)) => self.handle_frame(frame, handler).await?,
                Some(Err(e)) => {
                    error!("Read failed: {}", e);
                    return Err(e.into());
                }
                None => {
                    let reassembler = self.reader.decoder().reassembler();
                    if reassembler.state() == ReassemblerState::ReadingPayload {
                        let buffered = reassembler.buffered_len();
                        error!(buffered, "Connection closed in the middle of a message");
                        return Err(TransportError::ConnectionLost(format!(
                            "closed with {buffered} bytes of an incomplete message"
                        )));
                    }
                    info!("Connection closed by simulator");
                    break SessionEnd::PeerClosed;
                }
            }
        };

        debug!(
            frames = self.stats.frames,
            dispatched = self.stats.dispatched,
            malformed = self.stats.malformed,
            unknown = self.stats.unknown,
            "Receive loop finished"
        );

        Ok(SessionReport {
            end,
            stats: self.stats,
        })
    }

    /// Decode and dispatch one frame, recording the outcome.
    ///
    /// Per-message failures are counted and skipped; anything else ends the
    /// receive loop.
    async fn handle_frame<H: AlarmHandler>(
        &mut self,
        frame: Frame,
        handler: &mut H,
    ) -> Result<(), TransportError> {
        self.stats.frames += 1;

        let outcome = match Command::try_from(&frame) {
            Ok(command) => {
                trace!(%command, "Command received");
                Dispatcher::dispatch(&command, handler).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(event) => {
                self.stats.dispatched += 1;
                debug!(%event, "Event dispatched");
                Ok(())
            }
            Err(e) if e.is_per_message() => {
                self.record_dropped(&e);
                warn!("Dropping message: {}", e);
                Ok(())
            }
            Err(e) => {
                error!("Receive loop failed: {}", e);
                Err(e.into())
            }
        }
    }

    fn record_dropped(&mut self, error: &Error) {
        match error {
            Error::UnknownDeviceType(_) => self.stats.unknown += 1,
            _ => self.stats.malformed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homealarm_protocol::AlarmEvent;
    use tokio::io::{AsyncWriteExt, DuplexStream};

    #[derive(Default)]
    struct Recorder(Vec<AlarmEvent>);

    impl AlarmHandler for Recorder {
        async fn on_arm(&mut self) {
            self.0.push(AlarmEvent::Arm);
        }
        async fn on_switch_sensor(&mut self, id: i32, value: i32) {
            self.0.push(AlarmEvent::SwitchSensor { id, value });
        }
    }

    fn session() -> (Session<DuplexStream, DuplexStream>, DuplexStream, DuplexStream) {
        let (read_local, read_peer) = tokio::io::duplex(256);
        let (write_local, write_peer) = tokio::io::duplex(256);
        (
            Session::new(read_local, write_local, Delimiters::default()),
            read_peer,
            write_peer,
        )
    }

    #[tokio::test]
    async fn test_run_until_peer_closes() {
        let (session, mut peer, _out) = session();
        peer.write_all(b">0 12 <>1 26 1<").await.unwrap();
        drop(peer);

        let mut handler = Recorder::default();
        let report = session
            .run(&mut handler, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.end, SessionEnd::PeerClosed);
        assert_eq!(report.stats.frames, 2);
        assert_eq!(report.stats.dispatched, 2);
        assert_eq!(
            handler.0,
            [AlarmEvent::Arm, AlarmEvent::SwitchSensor { id: 26, value: 1 }]
        );
    }

    #[tokio::test]
    async fn test_bad_messages_are_counted_and_skipped() {
        let (session, mut peer, _out) = session();
        peer.write_all(b"><>1<>9 5 x<>3 29 110<>0 12 <").await.unwrap();
        drop(peer);

        let mut handler = Recorder::default();
        let report = session
            .run(&mut handler, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.stats.frames, 5);
        assert_eq!(report.stats.malformed, 2);
        assert_eq!(report.stats.unknown, 2);
        assert_eq!(report.stats.dispatched, 1);
        assert_eq!(handler.0, [AlarmEvent::Arm]);
    }

    #[tokio::test]
    async fn test_close_mid_message_is_connection_lost() {
        let (session, mut peer, _out) = session();
        peer.write_all(b">0 12 <>1 26").await.unwrap();
        drop(peer);

        let mut handler = Recorder::default();
        let result = session.run(&mut handler, CancellationToken::new()).await;

        assert!(matches!(result, Err(TransportError::ConnectionLost(_))));
        // Messages completed before the close were still delivered
        assert_eq!(handler.0, [AlarmEvent::Arm]);
    }

    #[tokio::test]
    async fn test_trailing_noise_is_clean_close() {
        let (session, mut peer, _out) = session();
        peer.write_all(b">0 12 <noise").await.unwrap();
        drop(peer);

        let mut handler = Recorder::default();
        let report = session
            .run(&mut handler, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.end, SessionEnd::PeerClosed);
        assert_eq!(report.stats.dispatched, 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_idle_loop() {
        let (session, _peer, _out) = session();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut handler = Recorder::default();
        let report = session.run(&mut handler, cancel).await.unwrap();

        assert_eq!(report.end, SessionEnd::Cancelled);
        assert_eq!(report.stats.frames, 0);
    }

    #[tokio::test]
    async fn test_sender_writes_to_write_half() {
        let (session, _peer, mut out) = session();
        let sender = session.sender();

        sender.set_call("110", "police", "cn").await.unwrap();
        sender.close().await.unwrap();

        let mut wire = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut out, &mut wire)
            .await
            .unwrap();
        assert_eq!(wire, ">3 29 110<>3 30 police<>3 31 cn<");
    }
}
