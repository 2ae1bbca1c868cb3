use crate::midi::{ClockPort, MidiError, MidiMessage, Result, TimedPacket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// A message observed by a [`RecordingPort`]. `deadline` is `None` for
/// messages sent immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    pub message: MidiMessage,
    pub deadline: Option<Instant>,
    pub recorded_at: Instant,
}

/// Shared view of everything a [`RecordingPort`] has emitted
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    entries: Arc<Mutex<Vec<RecordedMessage>>>,
    fail_sends: Arc<AtomicBool>,
}

impl RecordingLog {
    pub fn entries(&self) -> Vec<RecordedMessage> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<MidiMessage> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    pub fn count(&self, message: MidiMessage) -> usize {
        self.messages().iter().filter(|m| **m == message).count()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Makes every subsequent send or schedule fail
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    fn record(&self, message: MidiMessage, deadline: Option<Instant>) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MidiError::SendError("recording port set to fail".to_string()));
        }
        self.entries
            .lock()
            .map_err(|_| MidiError::SendError("recording log poisoned".to_string()))?
            .push(RecordedMessage {
                message,
                deadline,
                recorded_at: Instant::now(),
            });
        Ok(())
    }

    /// Removes scheduled messages whose deadline has not passed yet
    fn discard_pending(&self, now: Instant) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|e| e.deadline.map_or(true, |deadline| deadline <= now));
        before - entries.len()
    }
}

/// In-memory clock port used by tests and dry runs
pub struct RecordingPort {
    name: String,
    log: RecordingLog,
}

impl RecordingPort {
    pub fn new(name: &str) -> Self {
        RecordingPort {
            name: name.to_string(),
            log: RecordingLog::default(),
        }
    }

    pub fn log(&self) -> RecordingLog {
        self.log.clone()
    }
}

impl ClockPort for RecordingPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_now(&mut self, message: MidiMessage) -> Result<()> {
        self.log.record(message, None)
    }

    fn schedule(&mut self, packets: Vec<TimedPacket>) -> Result<()> {
        for packet in packets {
            self.log.record(packet.message, Some(packet.deadline))?;
        }
        Ok(())
    }

    /// Scheduled messages count as emitted once their deadline passes, so
    /// cancelling drops the ones still in the future.
    fn cancel_pending(&mut self) -> usize {
        self.log.discard_pending(Instant::now())
    }
}
