//! Per-stage profiler for timing named pipeline stages

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct StageProfiler {
    timings: HashMap<String, Duration>,
}

impl StageProfiler {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
        }
    }

    pub fn time_stage<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        *self.timings.entry(name.to_string()).or_insert(Duration::ZERO) += elapsed;
        result
    }

    /// Accumulate an externally measured duration for `name`.
    pub fn record(&mut self, name: &str, elapsed: Duration) {
        *self.timings.entry(name.to_string()).or_insert(Duration::ZERO) += elapsed;
    }

    pub fn get_timing(&self, name: &str) -> Duration {
        self.timings.get(name).copied().unwrap_or(Duration::ZERO)
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Duration)> {
        self.timings.iter()
    }
}

impl Default for StageProfiler {
    fn default() -> Self {
        Self::new()
    }
}
