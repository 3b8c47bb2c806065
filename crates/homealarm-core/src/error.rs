use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Malformed command {body:?}: {reason}")]
    MalformedCommand { reason: String, body: String },

    #[error("Unknown device type: {0}")]
    UnknownDeviceType(i32),

    #[error("Frame too large: {size} bytes (max {max_size})")]
    FrameTooLarge { size: usize, max_size: usize },

    // Configuration errors
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new malformed command error.
    pub fn malformed(reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self::MalformedCommand {
            reason: reason.into(),
            body: body.into(),
        }
    }

    /// Returns `true` if the error only affects a single message.
    ///
    /// Per-message errors are logged and skipped by the receive loop; anything
    /// else means the connection is no longer usable.
    pub fn is_per_message(&self) -> bool {
        matches!(
            self,
            Error::MalformedCommand { .. } | Error::UnknownDeviceType(_) | Error::FrameTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
