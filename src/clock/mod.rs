//! MIDI clock output
//!
//! [`MidiClockOut`] owns a [`ClockPort`] and, while started, a clock thread
//! that schedules clock messages on it in batches of `list_size`.
mod schedule;
mod tempo;

pub use schedule::BatchScheduler;
pub use tempo::Tempo;

use crate::config::{Settings, DEFAULT_BPM, DEFAULT_LIST_SIZE, MAX_LIST_SIZE};
use crate::midi::{ClockPort, MidiError, MidiMessage, Result};
use crate::state::ClockState;
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSettings {
    pub bpm: f64,
    pub list_size: usize,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            list_size: DEFAULT_LIST_SIZE,
        }
    }
}

impl From<&Settings> for ClockSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            bpm: settings.bpm,
            list_size: settings.list_size,
        }
    }
}

enum ClockCommand {
    SetTempo(Tempo),
    Shutdown,
}

/// A MIDI clock source with start/stop and tempo control
pub struct MidiClockOut<P: ClockPort> {
    port: Arc<Mutex<P>>,
    state: Arc<ClockState>,
    tempo: Tempo,
    list_size: usize,
    command_tx: Option<Sender<ClockCommand>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl<P: ClockPort> MidiClockOut<P> {
    pub fn new(port: P, settings: &ClockSettings) -> Result<Self> {
        let tempo = Tempo::new(settings.bpm)?;
        if !(1..=MAX_LIST_SIZE).contains(&settings.list_size) {
            return Err(MidiError::InvalidListSize(settings.list_size));
        }

        info!(
            "Creating MIDI clock on '{}' at {} BPM, {} clocks per batch",
            port.name(),
            tempo.bpm(),
            settings.list_size
        );

        Ok(Self {
            port: Arc::new(Mutex::new(port)),
            state: Arc::new(ClockState::new(tempo.bpm())),
            tempo,
            list_size: settings.list_size,
            command_tx: None,
            thread_handle: None,
        })
    }

    /// Sends Start and begins emitting clock from tick zero. Does nothing if
    /// the clock is already running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_started() {
            debug!("Clock already started");
            return Ok(());
        }

        debug!("Sending start message, setting ticks to 0 and starting clock thread");
        self.send_now(MidiMessage::Start)?;
        self.state.reset_ticks();
        self.spawn_clock_thread();
        info!("MIDI clock started at {} BPM", self.tempo.bpm());
        Ok(())
    }

    /// Sends Continue and resumes emitting clock without resetting ticks.
    pub fn resume(&mut self) -> Result<()> {
        if self.is_started() {
            debug!("Clock already running, ignoring resume");
            return Ok(());
        }

        debug!("Sending continue message and starting clock thread");
        self.send_now(MidiMessage::Continue)?;
        self.spawn_clock_thread();
        info!("MIDI clock resumed at tick {}", self.ticks());
        Ok(())
    }

    /// Stops the clock thread, discards clocks not yet delivered and sends
    /// Stop. Does nothing if the clock is not running.
    pub fn stop(&mut self) -> Result<()> {
        if !self.is_started() {
            debug!("Clock not running, ignoring stop");
            return Ok(());
        }

        debug!("Stopping clock thread and sending stop message");
        self.shutdown_clock_thread();

        let discarded = self
            .port
            .lock()
            .map(|mut port| port.cancel_pending())
            .unwrap_or(0);
        if discarded > 0 {
            debug!("Discarded {} undelivered clocks", discarded);
        }

        self.state.set_started(false);
        self.send_now(MidiMessage::Stop)?;
        info!("MIDI clock stopped after {} ticks", self.ticks());
        Ok(())
    }

    /// Sets ticks back to zero. Only allowed while stopped; returns whether
    /// the reset happened.
    pub fn reset(&mut self) -> bool {
        if self.is_started() {
            warn!("Cannot reset a running clock");
            return false;
        }
        debug!("Setting ticks to 0");
        self.state.reset_ticks();
        true
    }

    pub fn set_bpm(&mut self, bpm: f64) -> Result<()> {
        let tempo = Tempo::new(bpm)?;
        self.tempo = tempo;
        self.state.set_bpm(tempo.bpm());

        if let Some(tx) = &self.command_tx {
            if tx.send(ClockCommand::SetTempo(tempo)).is_err() {
                warn!("Clock thread gone, tempo change applies on next start");
            }
        }
        info!("Clock tempo set to {} BPM", tempo.bpm());
        Ok(())
    }

    pub fn bpm(&self) -> f64 {
        self.tempo.bpm()
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn is_started(&self) -> bool {
        self.state.is_started()
    }

    /// Stopped part way through, so a resume would continue from `ticks`
    pub fn is_paused(&self) -> bool {
        !self.is_started() && self.ticks() > 0
    }

    /// Clock messages scheduled since the last start or reset
    pub fn ticks(&self) -> u64 {
        self.state.ticks()
    }

    pub fn list_size(&self) -> usize {
        self.list_size
    }

    pub fn port_name(&self) -> String {
        self.port
            .lock()
            .map(|port| port.name().to_string())
            .unwrap_or_else(|_| "<unavailable>".to_string())
    }

    pub fn state(&self) -> Arc<ClockState> {
        Arc::clone(&self.state)
    }

    fn send_now(&self, message: MidiMessage) -> Result<()> {
        self.port
            .lock()
            .map_err(|_| MidiError::SendError("clock port lock poisoned".to_string()))?
            .send_now(message)
    }

    fn spawn_clock_thread(&mut self) {
        let (tx, rx) = unbounded();
        let scheduler =
            BatchScheduler::new(Instant::now(), self.tempo.tick_interval(), self.list_size);
        let port = Arc::clone(&self.port);
        let state = Arc::clone(&self.state);

        self.state.set_started(true);
        self.command_tx = Some(tx);
        self.thread_handle = Some(thread::spawn(move || {
            run_clock_thread(port, state, rx, scheduler);
        }));
    }

    fn shutdown_clock_thread(&mut self) {
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(ClockCommand::Shutdown);
        }
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                error!("Clock thread panicked");
            }
        }
    }
}

impl<P: ClockPort> Drop for MidiClockOut<P> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Failed to stop clock on drop: {}", e);
        }
    }
}

fn run_clock_thread<P: ClockPort>(
    port: Arc<Mutex<P>>,
    state: Arc<ClockState>,
    commands: Receiver<ClockCommand>,
    mut scheduler: BatchScheduler,
) {
    info!(
        "Clock thread started, tick interval {:?}",
        scheduler.tick_interval()
    );

    loop {
        let now = Instant::now();
        if scheduler.is_due(now) {
            let batch = scheduler.next_batch(now);
            let count = batch.len() as u64;
            let Ok(mut output) = port.lock() else {
                error!("Clock port lock poisoned, stopping clock thread");
                break;
            };
            match output.schedule(batch) {
                Ok(()) => state.advance(count),
                Err(e) => error!("Failed to schedule clock batch: {}", e),
            }
            continue;
        }

        let timeout = scheduler.wake_at().saturating_duration_since(now);
        match commands.recv_timeout(timeout) {
            Ok(ClockCommand::SetTempo(tempo)) => {
                debug!("Clock thread switching to {:?} per tick", tempo.tick_interval());
                scheduler.set_tick_interval(tempo.tick_interval());
            }
            Ok(ClockCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    info!("Clock thread stopping");
}
