use crate::config::{MAX_BPM, MIN_BPM, TICKS_PER_BEAT};
use crate::midi::{MidiError, Result};
use std::time::Duration;

/// A validated tempo and the clock timing derived from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    pub fn new(bpm: f64) -> Result<Self> {
        if !bpm.is_finite() || !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return Err(MidiError::InvalidTempo(bpm));
        }
        Ok(Tempo { bpm })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn microseconds_per_beat(&self) -> u64 {
        (60_000_000.0 / self.bpm).round() as u64
    }

    pub fn beat_duration(&self) -> Duration {
        Duration::from_micros(self.microseconds_per_beat())
    }

    /// Interval between two clock messages (24 per beat), truncated to
    /// whole microseconds to keep every interval identical.
    pub fn tick_interval(&self) -> Duration {
        let micros = 60_000_000.0 / (self.bpm * TICKS_PER_BEAT as f64);
        Duration::from_micros(micros as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval_at_120() {
        let tempo = Tempo::new(120.0).unwrap();
        // (60 seconds / 120 BPM) / 24 ticks per beat
        assert_eq!(tempo.tick_interval(), Duration::from_micros(20_833));
        assert_eq!(tempo.beat_duration(), Duration::from_millis(500));
        assert_eq!(tempo.microseconds_per_beat(), 500_000);
    }

    #[test]
    fn test_tick_interval_truncates() {
        // 27_777.78µs per tick
        let tempo = Tempo::new(90.0).unwrap();
        assert_eq!(tempo.tick_interval(), Duration::from_micros(27_777));
    }

    #[test]
    fn test_fractional_tempo() {
        let tempo = Tempo::new(97.5).unwrap();
        assert_eq!(tempo.bpm(), 97.5);
        assert_eq!(tempo.tick_interval(), Duration::from_micros(25_641));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(Tempo::new(0.0), Err(MidiError::InvalidTempo(_))));
        assert!(matches!(Tempo::new(-10.0), Err(MidiError::InvalidTempo(_))));
        assert!(Tempo::new(MAX_BPM + 1.0).is_err());
        assert!(Tempo::new(f64::INFINITY).is_err());
        assert!(Tempo::new(f64::NAN).is_err());
    }

    #[test]
    fn test_accepts_range_bounds() {
        assert!(Tempo::new(MIN_BPM).is_ok());
        assert!(Tempo::new(MAX_BPM).is_ok());
    }
}
