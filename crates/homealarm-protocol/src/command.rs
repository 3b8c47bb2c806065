//! Alarm protocol command.
//!
//! A [`Command`] is one device operation: a device type, a device id and a
//! free text value. The same type is used in both directions. Outbound
//! commands are built with the typed constructors and encoded with
//! [`Command::encode`]; inbound frame bodies are turned back into commands
//! with [`Command::decode`].
//!
//! # Body Format
//!
//! ```text
//! TYPE ID VALUE
//! ```
//!
//! Type and id are base-10 integers with no leading zeros. The value is
//! everything after the second space, taken verbatim and possibly empty.
//! Values are not escaped: a value containing a delimiter cannot be sent
//! intact.
//!
//! # Examples
//!
//! ```
//! use homealarm_protocol::Command;
//! use homealarm_core::{Delimiters, Device, DeviceType, SwitchValue};
//!
//! let cmd = Command::switch(Device::LedGreen, SwitchValue::On);
//! assert_eq!(cmd.encode(&Delimiters::default()), ">1 27 1<");
//!
//! let parsed = Command::decode("0 12 ").unwrap();
//! assert_eq!(parsed.kind().unwrap(), DeviceType::Key);
//! assert_eq!(parsed.device_id(), Device::KeyArm.id());
//! assert_eq!(parsed.device_value(), "");
//! ```

use crate::frame::Frame;
use homealarm_core::{
    Delimiters, Device, DeviceType, Error, Result, SwitchValue,
    constants::{FIELD_SEPARATOR, MIN_BODY_LENGTH, UNSET_FIELD},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One protocol message unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    device_type: i32,
    device_id: i32,
    device_value: String,
}

impl Command {
    /// Create a command for a known device type.
    pub fn new(device_type: DeviceType, device_id: i32, device_value: impl Into<String>) -> Self {
        Self::from_raw(device_type.code(), device_id, device_value)
    }

    /// Create a command from raw wire codes.
    ///
    /// The device type is not checked against [`DeviceType`]: routing decides
    /// whether an unrecognised type is an error.
    pub fn from_raw(device_type: i32, device_id: i32, device_value: impl Into<String>) -> Self {
        Command {
            device_type,
            device_id,
            device_value: device_value.into(),
        }
    }

    /// Create a command addressed with the device's registry type.
    pub fn for_device(device: Device, device_value: impl Into<String>) -> Self {
        Self::new(device.device_type(), device.id(), device_value)
    }

    /// Create a switch command setting an on/off device.
    pub fn switch(device: Device, value: SwitchValue) -> Self {
        Self::new(DeviceType::Switch, device.id(), value.as_wire())
    }

    /// Create a string-valued command (phone call fields).
    pub fn text(device: Device, value: impl Into<String>) -> Self {
        Self::new(DeviceType::StringValue, device.id(), value)
    }

    /// Raw device type code.
    pub fn device_type(&self) -> i32 {
        self.device_type
    }

    /// Device id.
    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    /// Value field, verbatim.
    pub fn device_value(&self) -> &str {
        &self.device_value
    }

    /// Typed device type.
    ///
    /// # Errors
    /// Returns `Error::UnknownDeviceType` if the code is not a known type.
    pub fn kind(&self) -> Result<DeviceType> {
        DeviceType::from_code(self.device_type)
    }

    /// Registry entry for the device id, if any.
    pub fn device(&self) -> Option<Device> {
        Device::from_id(self.device_id)
    }

    /// Returns `true` for a command that was never populated.
    pub fn is_unset(&self) -> bool {
        self.device_type == UNSET_FIELD && self.device_id == UNSET_FIELD
    }

    /// Body text without delimiters: `TYPE ID VALUE`.
    pub fn body(&self) -> String {
        let sep = FIELD_SEPARATOR as char;
        format!(
            "{}{sep}{}{sep}{}",
            self.device_type, self.device_id, self.device_value
        )
    }

    /// Full wire text: `START TYPE ID VALUE STOP`.
    pub fn encode(&self, delimiters: &Delimiters) -> String {
        format!("{}{}{}", delimiters.start(), self.body(), delimiters.stop())
    }

    /// Parse a frame body (delimiters already stripped).
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedCommand` if:
    /// - The body is shorter than 4 bytes
    /// - The type field is not followed by a space, or nothing follows it
    /// - The id field is not followed by a space
    /// - Either field is not a base-10 integer
    pub fn decode(body: &str) -> Result<Self> {
        if body.len() < MIN_BODY_LENGTH {
            return Err(Error::malformed(
                format!("body shorter than {MIN_BODY_LENGTH} bytes"),
                body,
            ));
        }

        let sep = FIELD_SEPARATOR as char;

        let (type_field, rest) = body
            .split_once(sep)
            .ok_or_else(|| Error::malformed("missing separator after device type", body))?;
        if rest.is_empty() {
            return Err(Error::malformed("missing device id", body));
        }

        let (id_field, value) = rest
            .split_once(sep)
            .ok_or_else(|| Error::malformed("missing separator after device id", body))?;

        let device_type = parse_field(type_field, "device type", body)?;
        let device_id = parse_field(id_field, "device id", body)?;

        Ok(Command::from_raw(device_type, device_id, value))
    }
}

/// Parse one numeric header field. Only ASCII digits are accepted, so signs,
/// padding and empty fields are all rejected.
fn parse_field(field: &str, name: &str, body: &str) -> Result<i32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed(
            format!("{name} {field:?} is not a non-negative integer"),
            body,
        ));
    }

    field
        .parse()
        .map_err(|_| Error::malformed(format!("{name} {field:?} is out of range"), body))
}

impl Default for Command {
    /// Unset command: `(-1, -1, "")`.
    fn default() -> Self {
        Command::from_raw(UNSET_FIELD, UNSET_FIELD, "")
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Command::decode(s)
    }
}

impl TryFrom<&Frame> for Command {
    type Error = Error;

    fn try_from(frame: &Frame) -> Result<Self> {
        Command::decode(frame.to_str()?)
    }
}

impl TryFrom<Frame> for Command {
    type Error = Error;

    fn try_from(frame: Frame) -> Result<Self> {
        Command::try_from(&frame)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body())
    }
}
