//! Core constants for the home-alarm simulator protocol.
//!
//! This module defines the protocol-level constants shared by the encoder,
//! the stream reassembler and the dispatcher. Both endpoints (this client and
//! the host simulator) must agree on every value here; there is no
//! negotiation on the wire.
//!
//! # Protocol Structure
//!
//! Every message on the wire has the form:
//!
//! ```text
//! <START>TYPE ID VALUE<STOP>
//! ```
//!
//! Where:
//! - `<START>` - Start delimiter (default `>`)
//! - `TYPE` - Device type code, base-10 (`0` key, `1` switch, `2` digit, `3` string)
//! - ` ` - Field separator (single ASCII space)
//! - `ID` - Device id, base-10 (see the device registry in [`crate::types::Device`])
//! - `VALUE` - Free text payload, possibly empty
//! - `<STOP>` - Stop delimiter (default `<`)
//!
//! # Usage
//!
//! ```
//! use homealarm_core::constants::*;
//!
//! let wire = format!("{DEFAULT_START_DELIMITER}1{FIELD_SEPARATOR}26{FIELD_SEPARATOR}1{DEFAULT_STOP_DELIMITER}");
//! assert_eq!(wire, ">1 26 1<");
//! ```

// ============================================================================
// Message Framing
// ============================================================================

/// Default start-of-message delimiter.
pub const DEFAULT_START_DELIMITER: &str = ">";

/// Default end-of-message delimiter.
pub const DEFAULT_STOP_DELIMITER: &str = "<";

/// Separator between the type, id and value fields of a message body.
pub const FIELD_SEPARATOR: u8 = b' ';

/// Minimum length of a decodable message body, in bytes.
///
/// The shortest valid body is `"T I "`: a one-digit type, a one-digit id and
/// both separators, with an empty value.
pub const MIN_BODY_LENGTH: usize = 4;

/// Upper bound on the reassembly buffer.
///
/// The protocol itself has no length cap. A partial message that grows past
/// this limit without a stop delimiter is discarded.
pub const MAX_BUFFER_SIZE: usize = 64 * 1024; // 64 KB

/// Default maximum size of a single delimited frame on the wire.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024; // 64 KB

// ============================================================================
// Device Types
// ============================================================================

/// Device type code for keypad keys.
pub const DEVICE_TYPE_KEY: i32 = 0;

/// Device type code for on/off devices (door, infrared and water sensors,
/// light, LEDs).
pub const DEVICE_TYPE_SWITCH: i32 = 1;

/// Device type code for analogue sensors (smoke, temperature, humidity).
pub const DEVICE_TYPE_DIGIT: i32 = 2;

/// Device type code for text fields (phone call setup).
pub const DEVICE_TYPE_STRING: i32 = 3;

/// Sentinel used by an unset command for both type and id.
pub const UNSET_FIELD: i32 = -1;

// ============================================================================
// Reserved Key Ids
// ============================================================================

/// Key id that arms the alarm. Routed to `on_arm` instead of `on_key`.
pub const KEY_ARM_ID: i32 = 12;

/// Key id that disarms the alarm. Routed to `on_disarm` instead of `on_key`.
pub const KEY_DISARM_ID: i32 = 13;

// ============================================================================
// Connection Defaults
// ============================================================================

/// Default simulator host.
pub const DEFAULT_HOST: &str = "192.168.0.30";

/// Default simulator TCP port.
pub const DEFAULT_PORT: u16 = 1314;

/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3000;

/// Default write timeout in milliseconds.
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 3000;
