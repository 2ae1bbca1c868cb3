pub mod cli;
pub mod clock;
pub mod config;
pub mod control;
pub mod logging;
pub mod midi;
pub mod state;
pub mod ui;

pub use cli::{handle_device_list, validate_device, Args};
pub use clock::{ClockSettings, MidiClockOut, Tempo};
pub use crate::config::Settings;
pub use control::{Button, ControlActions, ControlEvents};
pub use midi::{ClockPort, DefaultClockPort, MidiError, MidiMessage};
pub use state::{ClockSnapshot, ClockState};
