//! Common test utilities for protocol integration tests.
//!
//! Provides a handler that records every event it receives and a helper
//! that pushes raw chunks through reassembly, decoding and dispatch the way
//! the receive loop does.

#![allow(dead_code)]

use homealarm_core::{Delimiters, Error};
use homealarm_protocol::{AlarmEvent, AlarmHandler, Command, Dispatcher, FrameReassembler};

/// Handler that records events in arrival order.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub events: Vec<AlarmEvent>,
}

impl AlarmHandler for RecordingHandler {
    async fn on_arm(&mut self) {
        self.events.push(AlarmEvent::Arm);
    }

    async fn on_disarm(&mut self) {
        self.events.push(AlarmEvent::Disarm);
    }

    async fn on_key(&mut self, id: i32) {
        self.events.push(AlarmEvent::Key(id));
    }

    async fn on_switch_sensor(&mut self, id: i32, value: i32) {
        self.events.push(AlarmEvent::SwitchSensor { id, value });
    }

    async fn on_digit_sensor(&mut self, id: i32, value: f64) {
        self.events.push(AlarmEvent::DigitSensor { id, value });
    }
}

/// Outcome of pushing a byte stream through the inbound pipeline.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub events: Vec<AlarmEvent>,
    pub errors: Vec<Error>,
}

/// Feed `chunks` one at a time, decoding and dispatching every frame.
pub async fn run_pipeline(delimiters: Delimiters, chunks: &[&[u8]]) -> PipelineOutcome {
    let mut reassembler = FrameReassembler::new(delimiters);
    let mut handler = RecordingHandler::default();
    let mut errors = Vec::new();

    for chunk in chunks {
        reassembler.feed(chunk);
        for frame in reassembler.drain_frames() {
            let result = match Command::try_from(&frame) {
                Ok(cmd) => Dispatcher::dispatch(&cmd, &mut handler).await.map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                errors.push(e);
            }
        }
    }

    PipelineOutcome {
        events: handler.events,
        errors,
    }
}

/// Collect frame bodies after feeding `chunks` one at a time.
pub fn reassemble(delimiters: Delimiters, chunks: &[&[u8]]) -> Vec<Vec<u8>> {
    let mut reassembler = FrameReassembler::new(delimiters);
    let mut bodies = Vec::new();
    for chunk in chunks {
        reassembler.feed(chunk);
        bodies.extend(reassembler.drain_frames().map(|f| f.as_bytes().to_vec()));
    }
    bodies
}
