//! Tick timing utilities

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

/// Rolling tick clock: averages the last N ticks and keeps the most
/// recent one around, so a log line can show both the trend and the
/// spike that just happened.
pub struct TickTimer {
    tick_start: Instant,
    last_tick: Duration,
    tick_times: RingBuffer<Duration>,
}

impl TickTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            tick_start: Instant::now(),
            last_tick: Duration::ZERO,
            tick_times: RingBuffer::new(capacity),
        }
    }

    pub fn begin(&mut self) {
        self.tick_start = Instant::now();
    }

    pub fn end(&mut self) {
        self.last_tick = self.tick_start.elapsed();
        self.tick_times.push(self.last_tick);
    }

    pub fn ticks_per_second(&self) -> f64 {
        let avg = self.tick_times.average();
        if avg.as_secs_f64() > 0.0 {
            1.0 / avg.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Rolling average over the tracked window.
    pub fn tick_time_ms(&self) -> f64 {
        self.tick_times.average().as_secs_f64() * 1000.0
    }

    /// The tick that just finished, unsmoothed.
    pub fn last_tick_ms(&self) -> f64 {
        self.last_tick.as_secs_f64() * 1000.0
    }
}
