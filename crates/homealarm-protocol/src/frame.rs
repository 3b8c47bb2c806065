use crate::command::Command;
use bytes::{BufMut, Bytes, BytesMut};
use homealarm_core::{Delimiters, Error, Result};
use std::borrow::Cow;
use std::fmt;

/// Frame is one complete message body as it travels on the wire.
///
/// A Frame holds the bytes strictly between a matched start/stop delimiter
/// pair. Delimiters are never stored inside the frame: the reassembler strips
/// them on the way in, and [`Frame::delimited`] adds them on the way out.
///
/// # Wire Format
/// ```text
/// >1 26 1<
///  ^^^^^^
///  frame body: TYPE ID VALUE
/// ```
///
/// # Basic Usage
/// ```
/// use homealarm_protocol::{Command, Frame};
/// use homealarm_core::{Delimiters, Device, SwitchValue};
///
/// let cmd = Command::switch(Device::Light, SwitchValue::On);
/// let frame = Frame::from(&cmd);
/// assert_eq!(frame.as_bytes(), b"1 26 1");
///
/// let wire = frame.delimited(&Delimiters::default());
/// assert_eq!(&wire[..], b">1 26 1<");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Body bytes, delimiters excluded
    data: Bytes,
}

impl Frame {
    /// Create a new Frame from body bytes
    pub fn new(data: Bytes) -> Self {
        Frame { data }
    }

    /// Create a Frame from a byte slice
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(bytes))
    }

    /// Create a Frame from a string body
    pub fn from_string(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Get the body bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the body size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if the body is empty (`"><"` on the wire)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the body as text.
    ///
    /// # Errors
    /// Returns `Error::MalformedCommand` if the body is not valid UTF-8.
    pub fn to_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.data)
            .map_err(|e| Error::malformed(format!("body is not UTF-8: {e}"), self.to_lossy()))
    }

    /// Body as text with invalid bytes replaced, for diagnostics
    pub fn to_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Wrap the body in a delimiter pair, producing the bytes to transmit
    pub fn delimited(&self, delimiters: &Delimiters) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.size() + delimiters.overhead());
        buf.put_slice(delimiters.start().as_bytes());
        buf.put_slice(&self.data);
        buf.put_slice(delimiters.stop().as_bytes());
        buf.freeze()
    }
}

impl From<&Command> for Frame {
    fn from(command: &Command) -> Self {
        Frame::new(Bytes::from(command.body()))
    }
}

impl From<Command> for Frame {
    fn from(command: Command) -> Self {
        Frame::from(&command)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homealarm_core::{Device, DeviceType};

    #[test]
    fn test_frame_from_command() {
        let cmd = Command::new(DeviceType::Key, Device::KeyArm.id(), "");
        let frame = Frame::from(&cmd);
        assert_eq!(frame.as_bytes(), b"0 12 ");
        assert_eq!(frame.size(), 5);
    }

    #[test]
    fn test_delimited_default() {
        let frame = Frame::from_string("2 22 21.5");
        assert_eq!(&frame.delimited(&Delimiters::default())[..], b">2 22 21.5<");
    }

    #[test]
    fn test_delimited_custom() {
        let delimiters = Delimiters::new("$$", "##").unwrap();
        let frame = Frame::from_string("1 27 0");
        assert_eq!(&frame.delimited(&delimiters)[..], b"$$1 27 0##");
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::from_bytes(b"");
        assert!(frame.is_empty());
        assert_eq!(frame.to_str().unwrap(), "");
    }

    #[test]
    fn test_non_utf8_body_is_malformed() {
        let frame = Frame::from_bytes(&[b'1', b' ', 0xFF, 0xFE]);
        assert!(matches!(frame.to_str(), Err(Error::MalformedCommand { .. })));
        assert!(frame.to_string().starts_with("1 "));
    }
}
