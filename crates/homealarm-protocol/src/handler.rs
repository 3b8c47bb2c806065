//! Alarm event handler trait.
//!
//! [`AlarmHandler`] is the capability set an application implements to react
//! to inbound events. Every method has a default body that only logs at
//! debug level, so an implementation overrides just the events it cares
//! about.
//!
//! Handlers are awaited inline by the receive loop: a slow handler delays
//! reception of the following messages. Handlers may send commands (through
//! a `CommandSender`) from inside a callback.
//!
//! All methods use native `async fn` (Rust 1.90 + Edition 2024 RPITIT).

#![allow(async_fn_in_trait)]

use tracing::debug;

/// Reaction to inbound alarm events.
///
/// # Example
///
/// ```
/// use homealarm_protocol::AlarmHandler;
///
/// #[derive(Default)]
/// struct ArmCounter {
///     armed: usize,
/// }
///
/// impl AlarmHandler for ArmCounter {
///     async fn on_arm(&mut self) {
///         self.armed += 1;
///     }
/// }
/// ```
pub trait AlarmHandler {
    /// The arm key was pressed.
    async fn on_arm(&mut self) {
        debug!("Arm");
    }

    /// The disarm key was pressed.
    async fn on_disarm(&mut self) {
        debug!("Disarm");
    }

    /// Any other key was pressed (digits, `#`, `*`).
    async fn on_key(&mut self, id: i32) {
        debug!(id, "Key pressed");
    }

    /// A switch sensor changed. `value` is parsed leniently, `0` when the
    /// value text is not numeric.
    async fn on_switch_sensor(&mut self, id: i32, value: i32) {
        debug!(id, value, "Switch sensor changed");
    }

    /// A digital sensor reported a reading. `value` is `0.0` when the value
    /// text is not numeric.
    async fn on_digit_sensor(&mut self, id: i32, value: f64) {
        debug!(id, value, "Digit sensor changed");
    }
}

/// Handler that ignores every event beyond the default debug log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl AlarmHandler for LoggingHandler {}
