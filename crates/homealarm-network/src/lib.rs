//! Network layer for the home alarm simulator client
//!
//! This crate owns the TCP connection to the simulator: connecting, the
//! inbound receive loop that feeds the protocol dispatcher, and the
//! outbound command channel.
//!
//! # Components
//!
//! - **SimulatorClient**: Connects and hands out a session
//! - **Session**: Cancellable receive loop dispatching to an `AlarmHandler`
//! - **CommandSender**: Cloneable handle for outbound commands

mod client;
mod config;
mod error;
mod sender;
mod session;

pub use client::SimulatorClient;
pub use config::ClientConfig;
pub use error::TransportError;
pub use sender::CommandSender;
pub use session::{Session, SessionEnd, SessionReport, SessionStats};

/// Token accepted by [`Session::run`].
pub use tokio_util::sync::CancellationToken;
