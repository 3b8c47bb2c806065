use crate::{
    Result,
    constants::{
        DEFAULT_START_DELIMITER, DEFAULT_STOP_DELIMITER, DEVICE_TYPE_DIGIT, DEVICE_TYPE_KEY,
        DEVICE_TYPE_STRING, DEVICE_TYPE_SWITCH, MIN_BODY_LENGTH,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a device, carried as the first field of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DeviceType {
    Key = DEVICE_TYPE_KEY,
    Switch = DEVICE_TYPE_SWITCH,
    Digit = DEVICE_TYPE_DIGIT,
    StringValue = DEVICE_TYPE_STRING,
}

impl DeviceType {
    /// Create a device type from its wire code.
    ///
    /// # Errors
    /// Returns `Error::UnknownDeviceType` if the code is not 0-3.
    #[inline]
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            DEVICE_TYPE_KEY => Ok(DeviceType::Key),
            DEVICE_TYPE_SWITCH => Ok(DeviceType::Switch),
            DEVICE_TYPE_DIGIT => Ok(DeviceType::Digit),
            DEVICE_TYPE_STRING => Ok(DeviceType::StringValue),
            _ => Err(Error::UnknownDeviceType(code)),
        }
    }

    /// Wire code of this device type.
    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceType::Key => write!(f, "Key"),
            DeviceType::Switch => write!(f, "Switch"),
            DeviceType::Digit => write!(f, "Digit"),
            DeviceType::StringValue => write!(f, "String"),
        }
    }
}

/// Device registry shared with the host simulator.
///
/// Ids are a fixed contract: the simulator uses the same numbering, so the
/// discriminants here must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Device {
    // Keypad
    Key0 = 0,
    Key1 = 1,
    Key2 = 2,
    Key3 = 3,
    Key4 = 4,
    Key5 = 5,
    Key6 = 6,
    Key7 = 7,
    Key8 = 8,
    Key9 = 9,
    KeyHash = 10,
    KeyStar = 11,
    KeyArm = 12,
    KeyDisarm = 13,

    // Switch sensors
    Door1 = 14,
    Door2 = 15,
    Infrared1 = 16,
    Infrared2 = 17,
    Water1 = 18,
    Water2 = 19,

    // Digit sensors
    Smoke1 = 20,
    Smoke2 = 21,
    Temperature1 = 22,
    Temperature2 = 23,
    Humidity1 = 24,
    Humidity2 = 25,

    // Switch outputs
    Light = 26,
    LedGreen = 27,
    LedRed = 28,

    // Phone call fields
    PhoneNum = 29,
    PhoneType = 30,
    PhoneArea = 31,
}

impl Device {
    /// Every registered device, ordered by id.
    pub const ALL: [Device; 32] = [
        Device::Key0,
        Device::Key1,
        Device::Key2,
        Device::Key3,
        Device::Key4,
        Device::Key5,
        Device::Key6,
        Device::Key7,
        Device::Key8,
        Device::Key9,
        Device::KeyHash,
        Device::KeyStar,
        Device::KeyArm,
        Device::KeyDisarm,
        Device::Door1,
        Device::Door2,
        Device::Infrared1,
        Device::Infrared2,
        Device::Water1,
        Device::Water2,
        Device::Smoke1,
        Device::Smoke2,
        Device::Temperature1,
        Device::Temperature2,
        Device::Humidity1,
        Device::Humidity2,
        Device::Light,
        Device::LedGreen,
        Device::LedRed,
        Device::PhoneNum,
        Device::PhoneType,
        Device::PhoneArea,
    ];

    /// Look up a device by its registry id.
    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Registry id of this device.
    #[inline]
    #[must_use]
    pub fn id(self) -> i32 {
        self as i32
    }

    /// The device type this device is addressed with on the wire.
    #[must_use]
    pub fn device_type(self) -> DeviceType {
        match self.id() {
            0..=13 => DeviceType::Key,
            14..=19 | 26..=28 => DeviceType::Switch,
            20..=25 => DeviceType::Digit,
            _ => DeviceType::StringValue,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}({})", self, self.id())
    }
}

/// State of an on/off device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum SwitchValue {
    Off = 0,
    On = 1,
    Unknown = 2,
}

impl SwitchValue {
    /// Map a numeric switch reading to a value. Anything other than 0 or 1 is
    /// `Unknown`.
    #[inline]
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => SwitchValue::Off,
            1 => SwitchValue::On,
            _ => SwitchValue::Unknown,
        }
    }

    /// Text sent in the value field of a switch command.
    #[inline]
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            SwitchValue::Off => "0",
            SwitchValue::On => "1",
            SwitchValue::Unknown => "2",
        }
    }
}

impl fmt::Display for SwitchValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SwitchValue::Off => write!(f, "Off"),
            SwitchValue::On => write!(f, "On"),
            SwitchValue::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Start/stop delimiter pair framing every message.
///
/// Both sides of a connection must use the same pair. The pair is passed
/// explicitly to the codec and the reassembler; there is no process-wide
/// setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDelimiters")]
pub struct Delimiters {
    start: String,
    stop: String,
}

#[derive(Deserialize)]
struct RawDelimiters {
    start: String,
    stop: String,
}

impl TryFrom<RawDelimiters> for Delimiters {
    type Error = Error;

    fn try_from(raw: RawDelimiters) -> Result<Self> {
        Delimiters::new(raw.start, raw.stop)
    }
}

impl Delimiters {
    /// Create a delimiter pair.
    ///
    /// # Errors
    /// Returns `Error::InvalidDelimiter` if either delimiter is empty or
    /// contains the field separator.
    pub fn new(start: impl Into<String>, stop: impl Into<String>) -> Result<Self> {
        let start = start.into();
        let stop = stop.into();

        for (name, value) in [("start", &start), ("stop", &stop)] {
            if value.is_empty() {
                return Err(Error::InvalidDelimiter(format!("{name} delimiter is empty")));
            }
            if value.contains(' ') {
                return Err(Error::InvalidDelimiter(format!(
                    "{name} delimiter {value:?} contains the field separator"
                )));
            }
        }

        Ok(Delimiters { start, stop })
    }

    /// Start delimiter.
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Stop delimiter.
    #[must_use]
    pub fn stop(&self) -> &str {
        &self.stop
    }

    /// Bytes added around every body.
    #[must_use]
    pub fn overhead(&self) -> usize {
        self.start.len() + self.stop.len()
    }

    /// Shortest byte sequence that can hold a decodable message.
    #[must_use]
    pub fn min_frame_len(&self) -> usize {
        self.overhead() + MIN_BODY_LENGTH
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            start: DEFAULT_START_DELIMITER.to_string(),
            stop: DEFAULT_STOP_DELIMITER.to_string(),
        }
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}...{}", self.start, self.stop)
    }
}
