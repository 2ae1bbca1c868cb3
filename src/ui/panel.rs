use crate::clock::MidiClockOut;
use crate::control::{Button, ControlEvents};
use crate::midi::{ClockPort, Result};
use log::{error, info};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelButton {
    Start,
    Stop,
    Continue,
    Reset,
}

impl PanelButton {
    pub const ALL: [PanelButton; 4] = [
        PanelButton::Start,
        PanelButton::Stop,
        PanelButton::Continue,
        PanelButton::Reset,
    ];

    pub fn title(self) -> &'static str {
        match self {
            PanelButton::Start => "Start",
            PanelButton::Stop => "Stop",
            PanelButton::Continue => "Continue",
            PanelButton::Reset => "Reset",
        }
    }
}

/// Transport buttons whose primary actions drive a shared clock
pub struct TransportPanel {
    buttons: Vec<(PanelButton, Button)>,
}

fn with_clock<P, F>(clock: &Mutex<MidiClockOut<P>>, label: &str, f: F)
where
    P: ClockPort,
    F: FnOnce(&mut MidiClockOut<P>) -> Result<()>,
{
    match clock.lock() {
        Ok(mut clock) => {
            if let Err(e) = f(&mut clock) {
                error!("{} failed: {}", label, e);
            }
        }
        Err(_) => error!("{} failed: clock lock poisoned", label),
    }
}

impl TransportPanel {
    pub fn new<P: ClockPort>(clock: Arc<Mutex<MidiClockOut<P>>>) -> Self {
        let mut buttons = Vec::with_capacity(PanelButton::ALL.len());

        for kind in PanelButton::ALL {
            let mut button = Button::new(kind.title());
            let clock = Arc::clone(&clock);
            let registered = button.add_action(ControlEvents::PRIMARY_ACTION_TRIGGERED, move |_| {
                info!("{} pressed", kind.title());
                match kind {
                    PanelButton::Start => with_clock(&clock, "Start", |c| c.start()),
                    PanelButton::Stop => with_clock(&clock, "Stop", |c| c.stop()),
                    PanelButton::Continue => with_clock(&clock, "Continue", |c| c.resume()),
                    PanelButton::Reset => with_clock(&clock, "Reset", |c| {
                        c.reset();
                        Ok(())
                    }),
                }
            });
            if let Err(e) = registered {
                error!("Could not wire {} button: {}", kind.title(), e);
            }
            buttons.push((kind, button));
        }

        let mut panel = Self { buttons };
        panel.refresh(false, false);
        panel
    }

    pub fn button(&self, which: PanelButton) -> Option<&Button> {
        self.buttons
            .iter()
            .find(|(kind, _)| *kind == which)
            .map(|(_, button)| button)
    }

    /// Taps a button, returning how many actions ran. Disabled buttons run
    /// nothing.
    pub fn press(&mut self, which: PanelButton) -> usize {
        self.buttons
            .iter_mut()
            .find(|(kind, _)| *kind == which)
            .map(|(_, button)| button.tap())
            .unwrap_or(0)
    }

    /// Enables the buttons that make sense for the current transport state
    pub fn refresh(&mut self, started: bool, paused: bool) {
        for (kind, button) in &mut self.buttons {
            let enabled = match kind {
                PanelButton::Start => !started,
                PanelButton::Stop => started,
                PanelButton::Continue | PanelButton::Reset => paused,
            };
            button.set_enabled(enabled);
        }
    }

    pub fn enabled_buttons(&self) -> Vec<PanelButton> {
        self.buttons
            .iter()
            .filter(|(_, button)| button.is_enabled())
            .map(|(kind, _)| *kind)
            .collect()
    }
}
