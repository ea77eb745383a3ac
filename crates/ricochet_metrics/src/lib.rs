//! Ricochet Metrics - Common utilities for performance tracking
//!
//! Provides zero-cost abstractions for metrics collection that completely
//! vanish in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use ricochet_metrics::TickTimer;
//!
//! let mut timer = TickTimer::new(60); // Track last 60 ticks
//! timer.begin();
//! // ... step the simulation ...
//! timer.end();
//! println!("TPS: {:.1}", timer.ticks_per_second());
//! ```
//!
//! In production builds (without `metrics` feature), all instrumentation
//! is compiled out to zero overhead.

#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod stage_profiler;
#[cfg(feature = "metrics")]
mod tick_timer;

#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use stage_profiler::StageProfiler;
#[cfg(feature = "metrics")]
pub use tick_timer::TickTimer;

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct TickTimer;

#[cfg(not(feature = "metrics"))]
impl TickTimer {
    pub fn new(_capacity: usize) -> Self {
        Self
    }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn ticks_per_second(&self) -> f64 {
        0.0
    }
    pub fn tick_time_ms(&self) -> f64 {
        0.0
    }
    pub fn last_tick_ms(&self) -> f64 {
        0.0
    }
}

#[cfg(not(feature = "metrics"))]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self {
        Self(std::marker::PhantomData)
    }
    pub fn push(&mut self, _value: T) {}
    pub fn len(&self) -> usize {
        0
    }
    pub fn is_empty(&self) -> bool {
        true
    }
}

#[cfg(not(feature = "metrics"))]
pub struct StageProfiler;

#[cfg(not(feature = "metrics"))]
impl StageProfiler {
    pub fn new() -> Self {
        Self
    }
    pub fn time_stage<F, R>(&mut self, _name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        f()
    }
    pub fn record(&mut self, _name: &str, _elapsed: std::time::Duration) {}
    pub fn get_timing(&self, _name: &str) -> std::time::Duration {
        std::time::Duration::ZERO
    }
    pub fn reset(&mut self) {}
}

#[cfg(not(feature = "metrics"))]
impl Default for StageProfiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_compiles_without_metrics() {
        // Ensure the API is present whichever way the feature lands
        let mut _timer = super::TickTimer::new(60);
        let mut _buffer = super::RingBuffer::<f64>::new(10);
        let mut _profiler = super::StageProfiler::new();
    }
}
