//! Terminal user interface
//!
//! This module provides the terminal front end for grooveclock:
//! - A transport panel of buttons wired to the clock
//! - Interactive prompts for the panel, tempo and output port
//! - A live status display while the clock runs
//!
//! Prompts use dialoguer; the status display uses indicatif.

mod panel;
mod progress;
pub mod prompt;
mod status;

pub use panel::{PanelButton, TransportPanel};
pub use progress::{create_beat_progress, create_transport_spinner};
pub use status::{format_status, run_status_display, StatusDisplay};
