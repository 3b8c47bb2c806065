//! Frame reassembler for alarm protocol streams.
//!
//! This module turns a TCP byte stream, read in chunks of arbitrary size and
//! boundary, into complete message bodies. The reassembler accumulates bytes
//! in an internal buffer and extracts every body that sits between a start
//! delimiter and the first stop delimiter after it.
//!
//! # Protocol Framing
//!
//! ```text
//! >0 12 <>1 26 1<
//! ^     ^^      ^
//! start stop    stop
//! ```
//!
//! Delimiters can be any non-empty string and may be split across reads.
//!
//! # Usage
//!
//! ```
//! use homealarm_protocol::FrameReassembler;
//! use homealarm_core::Delimiters;
//!
//! let mut reassembler = FrameReassembler::new(Delimiters::default());
//!
//! // Feed partial data from TCP stream
//! reassembler.feed(b">1 26 ");
//! assert!(reassembler.next_frame().is_none());
//! reassembler.feed(b"1<");
//!
//! let frame = reassembler.next_frame().unwrap();
//! assert_eq!(frame.to_str().unwrap(), "1 26 1");
//! ```
//!
//! # Greedy Framing
//!
//! There is no length prefix, checksum or escaping. A body ends at the first
//! stop delimiter after its start delimiter, so a value containing a
//! delimiter splits or merges frames. Such frames fail to decode later and
//! are dropped; framing of the following messages is unaffected.

use bytes::BytesMut;
use homealarm_core::{Delimiters, constants::MAX_BUFFER_SIZE};
use std::collections::VecDeque;
use tracing::{trace, warn};

use crate::frame::Frame;

/// Initial buffer capacity for incoming TCP data.
const INITIAL_BUFFER_CAPACITY: usize = 1024; // 1 KB

/// Recommended initial capacity for frame queue.
///
/// Simulator traffic is mostly one message per read, with short bursts
/// when several sensors change together.
const INITIAL_FRAME_QUEUE_CAPACITY: usize = 4;

/// Observable state of the reassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblerState {
    /// No message is in flight.
    ///
    /// The buffer is empty, or holds bytes that cannot start a message yet
    /// (a fragment of the start delimiter, or fewer bytes than a minimal
    /// frame).
    WaitingStart,

    /// A start delimiter has been seen and its stop delimiter has not.
    ///
    /// Once scanned, the buffer holds exactly one partial message beginning
    /// with the start delimiter.
    ReadingPayload,
}

/// Stateful reassembler for delimited alarm protocol messages.
///
/// # Algorithm
///
/// On every [`feed`](FrameReassembler::feed) the chunk is appended to the
/// buffer, then, while the buffer holds at least a minimal frame:
///
/// ```text
/// 1. find first START        none  -> drop buffer (keep a START fragment), stop
/// 2. find first STOP after   none  -> drop bytes before START, stop
/// 3. queue bytes between, drop everything through STOP, repeat
/// ```
///
/// A partial message larger than the buffer limit is discarded. The stop
/// search resumes where the previous feed left off, so a message trickled
/// in one byte at a time is scanned once rather than once per feed.
///
/// # Example
///
/// ```
/// use homealarm_protocol::FrameReassembler;
/// use homealarm_core::Delimiters;
///
/// let mut reassembler = FrameReassembler::new(Delimiters::default());
/// reassembler.feed(b">0 12 <>1 26 1<");
///
/// let bodies: Vec<String> = reassembler
///     .drain_frames()
///     .map(|frame| frame.to_string())
///     .collect();
/// assert_eq!(bodies, ["0 12 ", "1 26 1"]);
/// ```
#[derive(Debug)]
pub struct FrameReassembler {
    /// Delimiters framing every message.
    delimiters: Delimiters,

    /// Internal buffer for accumulating incoming bytes.
    buffer: BytesMut,

    /// Queue of complete frames ready for extraction.
    frames: VecDeque<Frame>,

    /// Limit on the partial message held in `buffer`.
    max_buffer_size: usize,

    /// Bytes dropped as noise or overflow since creation.
    discarded_bytes: u64,

    /// Offset in `buffer` up to which the pending partial has been searched
    /// for a stop delimiter.
    scan_from: usize,
}

impl FrameReassembler {
    /// Create a new reassembler for the given delimiters.
    ///
    /// # Example
    ///
    /// ```
    /// use homealarm_protocol::FrameReassembler;
    /// use homealarm_core::Delimiters;
    ///
    /// let reassembler = FrameReassembler::new(Delimiters::default());
    /// assert_eq!(reassembler.frames_available(), 0);
    /// ```
    pub fn new(delimiters: Delimiters) -> Self {
        Self::with_max_buffer_size(delimiters, MAX_BUFFER_SIZE)
    }

    /// Create a new reassembler with a custom buffer limit.
    pub fn with_max_buffer_size(delimiters: Delimiters, max_buffer_size: usize) -> Self {
        Self {
            delimiters,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            frames: VecDeque::with_capacity(INITIAL_FRAME_QUEUE_CAPACITY),
            max_buffer_size,
            discarded_bytes: 0,
            scan_from: 0,
        }
    }

    /// Feed bytes from the transport into the reassembler.
    ///
    /// Appends the bytes and extracts every complete frame they finish.
    /// Multiple frames may be queued by a single call.
    ///
    /// # Example
    ///
    /// ```
    /// use homealarm_protocol::FrameReassembler;
    /// use homealarm_core::Delimiters;
    ///
    /// let mut reassembler = FrameReassembler::new(Delimiters::default());
    /// reassembler.feed(b">2 22 ");
    /// reassembler.feed(b"21.5");
    /// reassembler.feed(b"<");
    ///
    /// assert_eq!(reassembler.frames_available(), 1);
    /// ```
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);

        // Not enough for even the shortest message yet
        if self.buffer.len() < self.delimiters.min_frame_len() {
            return;
        }

        while self.try_extract_frame() {
            // Continue extracting frames while possible
        }

        if self.buffer.len() > self.max_buffer_size {
            warn!(
                buffered = self.buffer.len(),
                max = self.max_buffer_size,
                "Partial message exceeds buffer limit, discarding"
            );
            self.discard(self.buffer.len());
        }
    }

    /// Extract next complete frame if available.
    ///
    /// Returns `None` if no complete frame is available yet.
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Returns current reassembler state.
    ///
    /// # Example
    ///
    /// ```
    /// use homealarm_protocol::{FrameReassembler, ReassemblerState};
    /// use homealarm_core::Delimiters;
    ///
    /// let mut reassembler = FrameReassembler::new(Delimiters::default());
    /// assert_eq!(reassembler.state(), ReassemblerState::WaitingStart);
    ///
    /// reassembler.feed(b">1 26 1");
    /// assert_eq!(reassembler.state(), ReassemblerState::ReadingPayload);
    /// ```
    pub fn state(&self) -> ReassemblerState {
        if find(&self.buffer, self.delimiters.start().as_bytes(), 0).is_some() {
            ReassemblerState::ReadingPayload
        } else {
            ReassemblerState::WaitingStart
        }
    }

    /// Returns number of frames ready for extraction.
    pub fn frames_available(&self) -> usize {
        self.frames.len()
    }

    /// Returns number of bytes currently buffered (not yet framed).
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes dropped as noise or overflow.
    pub fn discarded_bytes(&self) -> u64 {
        self.discarded_bytes
    }

    /// Delimiters this reassembler frames with.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Clear all internal buffers.
    ///
    /// Discards buffered bytes and queued frames. Used when a connection is
    /// reset.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.frames.clear();
        self.scan_from = 0;
    }

    /// Returns an iterator that drains all currently available frames.
    ///
    /// The iterator does NOT read more data: call [`feed()`] first.
    ///
    /// [`feed()`]: FrameReassembler::feed
    pub fn drain_frames(&mut self) -> DrainFrames<'_> {
        DrainFrames { reassembler: self }
    }

    /// Try to extract one complete frame from the buffer.
    ///
    /// Returns `true` if a frame was queued and scanning should continue.
    fn try_extract_frame(&mut self) -> bool {
        let start = self.delimiters.start().len();
        let stop = self.delimiters.stop().len();

        let Some(start_pos) = find(&self.buffer, self.delimiters.start().as_bytes(), 0) else {
            self.discard_noise();
            return false;
        };

        let body_pos = start_pos + start;
        // A stop delimiter may straddle the previous end of the buffer
        let resume = self.scan_from.saturating_sub(stop - 1).max(body_pos);
        let Some(stop_pos) = find(&self.buffer, self.delimiters.stop().as_bytes(), resume) else {
            // Keep the single in-flight message
            self.discard(start_pos);
            self.scan_from = self.buffer.len();
            return false;
        };

        self.discard(start_pos);
        self.scan_from = 0;
        let _ = self.buffer.split_to(start); // Consume start delimiter
        let body = self.buffer.split_to(stop_pos - body_pos).freeze();
        let _ = self.buffer.split_to(stop); // Consume stop delimiter

        let frame = Frame::new(body);
        trace!(size = frame.size(), "Frame extracted");
        self.frames.push_back(frame);
        true
    }

    /// Drop a buffer that holds no start delimiter.
    ///
    /// The tail is kept when it could be the first bytes of a start
    /// delimiter split across reads.
    fn discard_noise(&mut self) {
        let start = self.delimiters.start().as_bytes();
        let keep = (1..start.len())
            .rev()
            .find(|&n| self.buffer.ends_with(&start[..n]))
            .unwrap_or(0);
        self.discard(self.buffer.len() - keep);
    }

    /// Drop `count` bytes from the front of the buffer.
    fn discard(&mut self, count: usize) {
        if count > 0 {
            let _ = self.buffer.split_to(count);
            self.discarded_bytes += count as u64;
            self.scan_from = self.scan_from.saturating_sub(count);
        }
    }
}

/// Position of the first `needle` in `haystack` at or after `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// Iterator that drains frames from a [`FrameReassembler`].
///
/// Created by [`FrameReassembler::drain_frames`].
pub struct DrainFrames<'a> {
    reassembler: &'a mut FrameReassembler,
}

impl Iterator for DrainFrames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        self.reassembler.next_frame()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.reassembler.frames_available();
        (len, Some(len))
    }
}

impl ExactSizeIterator for DrainFrames<'_> {
    fn len(&self) -> usize {
        self.reassembler.frames_available()
    }
}
