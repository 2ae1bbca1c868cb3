use crate::midi::{MidiMessage, TimedPacket};
use log::warn;
use std::time::{Duration, Instant};

/// Lays out clock messages in batches of `list_size`, each stamped with the
/// instant it should be emitted. Stays at most one batch ahead of real time.
#[derive(Debug)]
pub struct BatchScheduler {
    tick_interval: Duration,
    list_size: usize,
    next_deadline: Instant,
}

impl BatchScheduler {
    pub fn new(origin: Instant, tick_interval: Duration, list_size: usize) -> Self {
        Self {
            tick_interval,
            list_size: list_size.max(1),
            next_deadline: origin,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Takes effect from the next packet produced
    pub fn set_tick_interval(&mut self, tick_interval: Duration) {
        self.tick_interval = tick_interval;
    }

    pub fn batch_duration(&self) -> Duration {
        self.tick_interval * self.list_size as u32
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// A batch is due once its first deadline is within one batch of `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_deadline <= now + self.batch_duration()
    }

    /// When the next batch becomes due
    pub fn wake_at(&self) -> Instant {
        self.next_deadline
            .checked_sub(self.batch_duration())
            .unwrap_or(self.next_deadline)
    }

    /// Produces the next batch. If the schedule has fallen more than a batch
    /// behind `now`, it restarts from `now` rather than bursting the backlog.
    pub fn next_batch(&mut self, now: Instant) -> Vec<TimedPacket> {
        if self.next_deadline + self.batch_duration() < now {
            warn!(
                "Clock fell behind by {:?}, resynchronising",
                now.duration_since(self.next_deadline)
            );
            self.next_deadline = now;
        }

        let mut batch = Vec::with_capacity(self.list_size);
        for _ in 0..self.list_size {
            batch.push(TimedPacket {
                deadline: self.next_deadline,
                message: MidiMessage::Clock,
            });
            self.next_deadline += self.tick_interval;
        }
        batch
    }
}
