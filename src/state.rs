use crate::config::{BEATS_PER_BAR, TICKS_PER_BEAT};
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Clock state shared between the clock thread and its readers.
pub struct ClockState {
    bpm_bits: AtomicU64,
    ticks: AtomicU64,
    started: AtomicBool,
    started_at: Mutex<Option<DateTime<Local>>>,
}

/// Point-in-time copy of [`ClockState`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSnapshot {
    pub bpm: f64,
    pub ticks: u64,
    pub beat: u64,
    pub bar: u64,
    pub started: bool,
    pub started_at: Option<DateTime<Local>>,
}

impl ClockState {
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm_bits: AtomicU64::new(bpm.to_bits()),
            ticks: AtomicU64::new(0),
            started: AtomicBool::new(false),
            started_at: Mutex::new(None),
        }
    }

    pub fn set_bpm(&self, bpm: f64) {
        self.bpm_bits.store(bpm.to_bits(), Ordering::SeqCst);
    }

    pub fn bpm(&self) -> f64 {
        f64::from_bits(self.bpm_bits.load(Ordering::SeqCst))
    }

    pub fn set_started(&self, started: bool) {
        self.started.store(started, Ordering::SeqCst);
        if started {
            if let Ok(mut started_at) = self.started_at.lock() {
                *started_at = Some(Local::now());
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Time of the most recent start or resume
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at.lock().ok().and_then(|s| *s)
    }

    pub fn advance(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::SeqCst);
    }

    pub fn reset_ticks(&self) {
        self.ticks.store(0, Ordering::SeqCst);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Beat within the current bar, 1-based, assuming 4/4
    pub fn beat(&self) -> u64 {
        (self.ticks() / TICKS_PER_BEAT) % BEATS_PER_BAR + 1
    }

    /// Bar number, 1-based
    pub fn bar(&self) -> u64 {
        self.ticks() / (TICKS_PER_BEAT * BEATS_PER_BAR) + 1
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        let ticks = self.ticks();
        ClockSnapshot {
            bpm: self.bpm(),
            ticks,
            beat: (ticks / TICKS_PER_BEAT) % BEATS_PER_BAR + 1,
            bar: ticks / (TICKS_PER_BEAT * BEATS_PER_BAR) + 1,
            started: self.is_started(),
            started_at: self.started_at(),
        }
    }
}
