pub mod codec;
pub mod command;
pub mod dispatch;
pub mod frame;
pub mod handler;
pub mod lenient;
pub mod reassembler;

pub use codec::AlarmCodec;
pub use command::Command;
pub use dispatch::{AlarmEvent, Dispatcher};
pub use frame::Frame;
pub use handler::{AlarmHandler, LoggingHandler};
pub use reassembler::{DrainFrames, FrameReassembler, ReassemblerState};
