use thiserror::Error;

/// Errors that can occur on the simulator connection
#[derive(Debug, Error)]
pub enum TransportError {
    /// Sender was closed before the command was written
    #[error("Not connected to simulator")]
    NotConnected,

    /// Connection attempt timed out
    #[error("Connection timeout after {0}ms")]
    ConnectionTimeout(u64),

    /// Write operation timed out
    #[error("Write timeout after {0}ms")]
    WriteTimeout(u64),

    /// Connection closed in the middle of a message
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Protocol-level error from the codec
    #[error("Protocol error: {0}")]
    Protocol(homealarm_core::Error),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<homealarm_core::Error> for TransportError {
    /// Codec I/O failures surface as `Io`, everything else as `Protocol`.
    fn from(err: homealarm_core::Error) -> Self {
        match err {
            homealarm_core::Error::Io(e) => TransportError::Io(e),
            other => TransportError::Protocol(other),
        }
    }
}
