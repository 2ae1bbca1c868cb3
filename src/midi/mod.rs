//! MIDI clock output for grooveclock
//!
//! This module provides:
//! - System real-time message types and error handling
//! - The [`ClockPort`] trait, the boundary to a platform MIDI output
//! - [`MidirPort`] for real (or virtual) MIDI endpoints via midir
//! - [`RecordingPort`] for tests and dry runs
//!
mod message;
pub mod midir_port;
pub mod mock_port;
mod port;

pub use message::{MidiError, MidiMessage, Result};
pub use midir_port::MidirPort;
pub use mock_port::{RecordedMessage, RecordingLog, RecordingPort};
pub use port::{ClockPort, TimedPacket};

// Set default port type
pub type DefaultClockPort = MidirPort;
