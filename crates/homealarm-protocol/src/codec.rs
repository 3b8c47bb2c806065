//! Tokio codec for alarm protocol message framing.
//!
//! This module provides a Tokio-compatible codec that plugs the alarm
//! protocol into `Framed` streams.
//!
//! # Overview
//!
//! `AlarmCodec` wraps the [`FrameReassembler`] and implements:
//! - [`Decoder`]: Extracts complete frame bodies from the TCP byte stream
//! - [`Encoder<Command>`]: Writes commands in wire format with delimiters
//!
//! ```text
//! TCP Stream -> Decoder -> Frame (body only)
//! Command -> Encoder -> TCP Stream (START body STOP)
//! ```
//!
//! # Decode Errors
//!
//! A `Framed` stream stops yielding items after the decoder returns an
//! error. A malformed body must only cost that one message, so the decoder
//! never fails on content: it yields raw [`Frame`]s and the receive loop
//! decodes each one into a [`Command`], logging and skipping failures.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//! use homealarm_protocol::{AlarmCodec, Command};
//! use homealarm_core::{Device, SwitchValue};
//! use futures::{SinkExt, StreamExt};
//!
//! # async fn example() -> homealarm_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:1314").await?;
//! let mut framed = Framed::new(stream, AlarmCodec::new());
//!
//! framed.send(Command::switch(Device::Light, SwitchValue::On)).await?;
//!
//! while let Some(frame) = framed.next().await {
//!     match Command::try_from(frame?) {
//!         Ok(cmd) => println!("Received: {cmd}"),
//!         Err(e) => eprintln!("Dropped: {e}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use bytes::BytesMut;
use homealarm_core::{Delimiters, Error, Result, constants::DEFAULT_MAX_FRAME_SIZE};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

use crate::{Command, Frame, FrameReassembler};

/// Tokio codec for alarm protocol messages.
#[derive(Debug)]
pub struct AlarmCodec {
    /// Reassembler for handling partial messages and framing.
    reassembler: FrameReassembler,

    /// Maximum allowed frame size in bytes, delimiters included.
    ///
    /// Inbound frames over the limit are dropped; outbound commands over the
    /// limit are rejected with `Error::FrameTooLarge`.
    max_frame_size: usize,
}

impl AlarmCodec {
    /// Create a codec with the default `>` / `<` delimiters.
    ///
    /// # Example
    ///
    /// ```
    /// use homealarm_protocol::AlarmCodec;
    ///
    /// let codec = AlarmCodec::new();
    /// assert_eq!(codec.delimiters().start(), ">");
    /// ```
    pub fn new() -> Self {
        Self::with_delimiters(Delimiters::default())
    }

    /// Create a codec for a custom delimiter pair.
    pub fn with_delimiters(delimiters: Delimiters) -> Self {
        Self {
            reassembler: FrameReassembler::new(delimiters),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Replace the maximum frame size.
    ///
    /// # Example
    ///
    /// ```
    /// use homealarm_protocol::AlarmCodec;
    ///
    /// let codec = AlarmCodec::new().with_max_frame_size(512);
    /// assert_eq!(codec.max_frame_size(), 512);
    /// ```
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Get the current maximum frame size.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Delimiters used for both directions.
    pub fn delimiters(&self) -> &Delimiters {
        self.reassembler.delimiters()
    }

    /// Read-only view of the underlying reassembler.
    pub fn reassembler(&self) -> &FrameReassembler {
        &self.reassembler
    }
}

impl Default for AlarmCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for AlarmCodec {
    type Item = Frame;
    type Error = Error;

    /// Decode the next frame body from the byte stream.
    ///
    /// Returns `Ok(None)` when more data is needed. Content errors are never
    /// returned from here; oversize frames are logged and skipped.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !src.is_empty() {
            // All bytes now belong to the reassembler buffer
            self.reassembler.feed(src);
            src.clear();
        }

        let overhead = self.delimiters().overhead();
        while let Some(frame) = self.reassembler.next_frame() {
            let size = frame.size() + overhead;
            if size > self.max_frame_size {
                warn!(size, max = self.max_frame_size, "Dropping oversize frame");
                continue;
            }
            return Ok(Some(frame));
        }

        Ok(None)
    }

    /// Drains the remaining frames at end of stream.
    ///
    /// An incomplete trailing message stays in the reassembler, where the
    /// owner of the stream can tell a truncated connection from a clean one.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        if self.reassembler.buffered_len() > 0 {
            debug!(
                buffered = self.reassembler.buffered_len(),
                "Incomplete message at end of stream"
            );
        }
        Ok(None)
    }
}

impl Encoder<Command> for AlarmCodec {
    type Error = Error;

    /// Encode a command as `START TYPE ID VALUE STOP`.
    ///
    /// # Errors
    ///
    /// Returns `Error::FrameTooLarge` if the encoded bytes exceed
    /// `max_frame_size`. Nothing is written in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Encoder;
    /// use homealarm_protocol::{AlarmCodec, Command};
    /// use homealarm_core::{Device, SwitchValue};
    ///
    /// let mut codec = AlarmCodec::new();
    /// let mut buffer = BytesMut::new();
    ///
    /// codec
    ///     .encode(Command::switch(Device::LedRed, SwitchValue::Off), &mut buffer)
    ///     .unwrap();
    /// assert_eq!(&buffer[..], b">1 28 0<");
    /// ```
    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        let framed = Frame::from(&item).delimited(self.delimiters());

        if framed.len() > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                size: framed.len(),
                max_size: self.max_frame_size,
            });
        }

        dst.extend_from_slice(&framed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homealarm_core::{Device, DeviceType, SwitchValue};
    use crate::ReassemblerState;

    #[test]
    fn test_codec_new() {
        let codec = AlarmCodec::new();
        assert_eq!(codec.max_frame_size(), DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(codec.delimiters(), &Delimiters::default());
    }

    #[test]
    fn test_decode_complete_message() {
        let mut codec = AlarmCodec::new();
        let mut buffer = BytesMut::from(&b">1 26 1<"[..]);

        let frame = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(frame.as_bytes(), b"1 26 1");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_partial_message() {
        let mut codec = AlarmCodec::new();
        let mut buffer = BytesMut::from(&b">1 26 "[..]);
        assert!(codec.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"1<");
        let frame = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(frame.as_bytes(), b"1 26 1");
    }

    #[test]
    fn test_decode_multiple_messages_in_buffer() {
        let mut codec = AlarmCodec::new();
        let mut buffer = BytesMut::from(&b">0 12 <>1 26 1<"[..]);

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        let second = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.as_bytes(), b"0 12 ");
        assert_eq!(second.as_bytes(), b"1 26 1");
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_malformed_body_is_still_a_frame() {
        let mut codec = AlarmCodec::new();
        let mut buffer = BytesMut::from(&b">1<>0 12 <"[..]);

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(Command::try_from(&first).is_err());

        let second = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(Command::try_from(&second).unwrap().device(), Some(Device::KeyArm));
    }

    #[test]
    fn test_decode_drops_oversize_frame() {
        let mut codec = AlarmCodec::new().with_max_frame_size(10);
        let mut buffer = BytesMut::from(&b">3 29 0123456789<>0 13 <"[..]);

        let frame = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(frame.as_bytes(), b"0 13 ");
    }

    #[test]
    fn test_decode_eof_keeps_partial() {
        let mut codec = AlarmCodec::new();
        let mut buffer = BytesMut::from(&b">0 12 <>1 26"[..]);

        assert_eq!(codec.decode_eof(&mut buffer).unwrap().unwrap().to_str().unwrap(), "0 12 ");
        assert!(codec.decode_eof(&mut buffer).unwrap().is_none());
        assert_eq!(codec.reassembler().buffered_len(), 5);
        assert_eq!(codec.reassembler().state(), ReassemblerState::ReadingPayload);
    }

    #[test]
    fn test_encode_command() {
        let mut codec = AlarmCodec::new();
        let mut buffer = BytesMut::new();

        codec
            .encode(Command::new(DeviceType::Key, 12, ""), &mut buffer)
            .unwrap();
        codec
            .encode(Command::switch(Device::Light, SwitchValue::On), &mut buffer)
            .unwrap();

        assert_eq!(&buffer[..], b">0 12 <>1 26 1<");
    }

    #[test]
    fn test_encode_custom_delimiters() {
        let mut codec = AlarmCodec::with_delimiters(Delimiters::new("[[", "]]").unwrap());
        let mut buffer = BytesMut::new();

        codec
            .encode(Command::text(Device::PhoneArea, "cn"), &mut buffer)
            .unwrap();
        assert_eq!(&buffer[..], b"[[3 31 cn]]");
    }

    #[test]
    fn test_encode_frame_too_large() {
        let mut codec = AlarmCodec::new().with_max_frame_size(8);
        let mut buffer = BytesMut::new();

        let result = codec.encode(Command::text(Device::PhoneNum, "110110110"), &mut buffer);
        assert!(matches!(
            result,
            Err(Error::FrameTooLarge { size: 16, max_size: 8 })
        ));
        assert!(buffer.is_empty());
    }
}
