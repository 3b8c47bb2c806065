//! Routing of decoded commands to handler callbacks.
//!
//! Routing is stateless and follows the device registry:
//!
//! | Device type   | Device id            | Handler call                  |
//! |---------------|----------------------|-------------------------------|
//! | `Key`         | 12 (arm)             | `on_arm()`                    |
//! | `Key`         | 13 (disarm)          | `on_disarm()`                 |
//! | `Key`         | any other            | `on_key(id)`                  |
//! | `Switch`      | any                  | `on_switch_sensor(id, int)`   |
//! | `Digit`       | any                  | `on_digit_sensor(id, float)`  |
//! | `StringValue` | any                  | rejected, outbound only       |
//! | unknown       | any                  | rejected                      |
//!
//! Rejected commands fail with `Error::UnknownDeviceType`; the caller drops
//! them and keeps reading.

use crate::Command;
use crate::handler::AlarmHandler;
use crate::lenient::{parse_float, parse_int};
use homealarm_core::{
    DeviceType, Error, Result,
    constants::{KEY_ARM_ID, KEY_DISARM_ID},
};
use std::fmt;

/// One routed inbound event, the argument list of a handler call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlarmEvent {
    /// Arm key.
    Arm,
    /// Disarm key.
    Disarm,
    /// Any other key.
    Key(i32),
    /// Switch sensor with its integer state.
    SwitchSensor { id: i32, value: i32 },
    /// Digital sensor with its reading.
    DigitSensor { id: i32, value: f64 },
}

impl AlarmEvent {
    /// Invoke the matching handler method.
    pub async fn deliver<H: AlarmHandler>(self, handler: &mut H) {
        match self {
            AlarmEvent::Arm => handler.on_arm().await,
            AlarmEvent::Disarm => handler.on_disarm().await,
            AlarmEvent::Key(id) => handler.on_key(id).await,
            AlarmEvent::SwitchSensor { id, value } => handler.on_switch_sensor(id, value).await,
            AlarmEvent::DigitSensor { id, value } => handler.on_digit_sensor(id, value).await,
        }
    }
}

impl TryFrom<&Command> for AlarmEvent {
    type Error = Error;

    fn try_from(command: &Command) -> Result<Self> {
        let id = command.device_id();
        let event = match command.kind()? {
            DeviceType::Key => match id {
                KEY_ARM_ID => AlarmEvent::Arm,
                KEY_DISARM_ID => AlarmEvent::Disarm,
                _ => AlarmEvent::Key(id),
            },
            DeviceType::Switch => AlarmEvent::SwitchSensor {
                id,
                value: parse_int(command.device_value()),
            },
            DeviceType::Digit => AlarmEvent::DigitSensor {
                id,
                value: parse_float(command.device_value()),
            },
            DeviceType::StringValue => {
                return Err(Error::UnknownDeviceType(command.device_type()));
            }
        };
        Ok(event)
    }
}

impl fmt::Display for AlarmEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmEvent::Arm => write!(f, "arm"),
            AlarmEvent::Disarm => write!(f, "disarm"),
            AlarmEvent::Key(id) => write!(f, "key {id}"),
            AlarmEvent::SwitchSensor { id, value } => write!(f, "switch {id} = {value}"),
            AlarmEvent::DigitSensor { id, value } => write!(f, "digit {id} = {value}"),
        }
    }
}

/// Stateless command router.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dispatcher;

impl Dispatcher {
    /// Route one command to exactly one handler call.
    ///
    /// Returns the event that was delivered.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDeviceType` for `StringValue` and unrecognised
    /// device types. The handler is not called in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use homealarm_protocol::{AlarmEvent, AlarmHandler, Command, Dispatcher};
    ///
    /// struct Lights(Vec<i32>);
    ///
    /// impl AlarmHandler for Lights {
    ///     async fn on_switch_sensor(&mut self, _id: i32, value: i32) {
    ///         self.0.push(value);
    ///     }
    /// }
    ///
    /// # futures::executor::block_on(async {
    /// let mut handler = Lights(Vec::new());
    /// let cmd = Command::decode("1 26 1").unwrap();
    ///
    /// let event = Dispatcher::dispatch(&cmd, &mut handler).await.unwrap();
    /// assert_eq!(event, AlarmEvent::SwitchSensor { id: 26, value: 1 });
    /// assert_eq!(handler.0, [1]);
    /// # });
    /// ```
    pub async fn dispatch<H: AlarmHandler>(command: &Command, handler: &mut H) -> Result<AlarmEvent> {
        let event = AlarmEvent::try_from(command)?;
        event.deliver(handler).await;
        Ok(event)
    }
}
