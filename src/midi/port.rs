use super::{MidiMessage, Result};
use std::time::Instant;

/// A message to be emitted no earlier than `deadline`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedPacket {
    pub deadline: Instant,
    pub message: MidiMessage,
}

/// Output side of a clock: the port/endpoint pair acquired from the platform.
pub trait ClockPort: Send + 'static {
    /// Human readable endpoint name
    fn name(&self) -> &str;

    /// Emits a message immediately
    fn send_now(&mut self, message: MidiMessage) -> Result<()>;

    /// Queues messages for delivery at their deadlines
    fn schedule(&mut self, packets: Vec<TimedPacket>) -> Result<()>;

    /// Drops everything queued but not yet delivered, returning how many
    /// packets were discarded.
    fn cancel_pending(&mut self) -> usize {
        0
    }
}
