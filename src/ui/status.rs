use super::progress::{create_beat_progress, create_transport_spinner};
use crate::state::{ClockSnapshot, ClockState};
use indicatif::{MultiProgress, ProgressDrawTarget};
use log::error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub fn format_status(snapshot: &ClockSnapshot) -> String {
    let transport = if snapshot.started {
        match snapshot.started_at {
            Some(at) => format!("running since {}", at.format("%H:%M:%S")),
            None => "running".to_string(),
        }
    } else if snapshot.ticks > 0 {
        "paused".to_string()
    } else {
        "stopped".to_string()
    };

    format!(
        "BPM: {:.1}, Ticks: {}, Bar: {}, Beat: {}, {}",
        snapshot.bpm, snapshot.ticks, snapshot.bar, snapshot.beat, transport
    )
}

/// Redraws the clock status every 100ms until `running` is cleared.
pub fn run_status_display(state: Arc<ClockState>, running: Arc<AtomicBool>) {
    let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());
    let beat_pb = create_beat_progress(&multi_progress);
    let transport_pb = create_transport_spinner(&multi_progress);

    while running.load(Ordering::SeqCst) {
        let snapshot = state.snapshot();
        beat_pb.set_position(snapshot.beat);
        transport_pb.set_message(format_status(&snapshot));
        transport_pb.tick();
        thread::sleep(Duration::from_millis(100));
    }

    beat_pb.finish_and_clear();
    transport_pb.finish_with_message(format_status(&state.snapshot()));
}

/// A status display running on its own thread
pub struct StatusDisplay {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl StatusDisplay {
    pub fn spawn(state: Arc<ClockState>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let handle = {
            let running = Arc::clone(&running);
            thread::spawn(move || run_status_display(state, running))
        };
        Self { running, handle }
    }

    /// Stops the display and waits for it. Returns false if the display
    /// thread panicked.
    pub fn finish(self) -> bool {
        self.running.store(false, Ordering::SeqCst);
        if self.handle.join().is_err() {
            error!("Status display thread panicked");
            return false;
        }
        true
    }
}
