//! Demo application: keypad-driven lights, LEDs and phone call.
//!
//! | Key | Action                          |
//! |-----|---------------------------------|
//! | 0   | light on                        |
//! | 1   | light off                       |
//! | 2   | green LED on                    |
//! | 3   | green LED off                   |
//! | 4   | red LED on                      |
//! | 5   | red LED off                     |
//! | #   | call 110, police, area cn       |
//! | *   | clear call                      |

use homealarm_core::{Device, SwitchValue};
use homealarm_network::{CommandSender, TransportError};
use homealarm_protocol::AlarmHandler;
use tokio::io::AsyncWrite;
use tokio::net::tcp::OwnedWriteHalf;
use tracing::{error, info};

/// Outbound reaction to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Light(SwitchValue),
    Led(Device, SwitchValue),
    Call {
        number: &'static str,
        call_type: &'static str,
        area: &'static str,
    },
}

impl KeyAction {
    /// Action bound to a key, if any.
    pub fn for_key(key: Device) -> Option<Self> {
        let action = match key {
            Device::Key0 => KeyAction::Light(SwitchValue::On),
            Device::Key1 => KeyAction::Light(SwitchValue::Off),
            Device::Key2 => KeyAction::Led(Device::LedGreen, SwitchValue::On),
            Device::Key3 => KeyAction::Led(Device::LedGreen, SwitchValue::Off),
            Device::Key4 => KeyAction::Led(Device::LedRed, SwitchValue::On),
            Device::Key5 => KeyAction::Led(Device::LedRed, SwitchValue::Off),
            Device::KeyHash => KeyAction::Call {
                number: "110",
                call_type: "police",
                area: "cn",
            },
            Device::KeyStar => KeyAction::Call {
                number: "",
                call_type: "",
                area: "",
            },
            _ => return None,
        };
        Some(action)
    }

    async fn perform<W: AsyncWrite + Unpin>(
        self,
        sender: &CommandSender<W>,
    ) -> Result<(), TransportError> {
        match self {
            KeyAction::Light(value) => sender.set_light(Device::Light, value).await,
            KeyAction::Led(led, value) => sender.set_led(led, value).await,
            KeyAction::Call {
                number,
                call_type,
                area,
            } => sender.set_call(number, call_type, area).await,
        }
    }
}

/// Handler that logs every event and drives outputs from the keypad.
pub struct DemoApplication<W = OwnedWriteHalf> {
    sender: CommandSender<W>,
}

impl<W: AsyncWrite + Unpin> DemoApplication<W> {
    pub fn new(sender: CommandSender<W>) -> Self {
        Self { sender }
    }
}

impl<W: AsyncWrite + Unpin> AlarmHandler for DemoApplication<W> {
    async fn on_arm(&mut self) {
        info!("Armed");
    }

    async fn on_disarm(&mut self) {
        info!("Disarmed");
    }

    async fn on_key(&mut self, id: i32) {
        info!(id, "Key pressed");

        let Some(action) = Device::from_id(id).and_then(KeyAction::for_key) else {
            return;
        };
        if let Err(e) = action.perform(&self.sender).await {
            error!(?action, "Failed to send key reaction: {}", e);
        }
    }

    async fn on_switch_sensor(&mut self, id: i32, value: i32) {
        info!(id, state = %SwitchValue::from_i32(value), "Switch sensor changed");
    }

    async fn on_digit_sensor(&mut self, id: i32, value: f64) {
        info!(id, value, "Digit sensor changed");
    }
}
