use std::time::Instant;

/// Monotonic-enough time source feeding every `now_ms` parameter in the crate.
///
/// The engine never reads a clock ambiently; callers sample one of these and
/// pass the tick down so tests stay deterministic.
pub trait MonotonicClock {
    /// Returns the current timestamp in milliseconds.
    fn now_ms(&mut self) -> u64;
}

/// System clock backed by `Instant`, anchored at process start.
#[derive(Clone)]
pub struct SystemMonotonicClock {
    start: Instant,
}

impl Default for SystemMonotonicClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl SystemMonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MonotonicClock for SystemMonotonicClock {
    fn now_ms(&mut self) -> u64 {
        self.start.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
    }
}

/// Hand-driven clock for tests and replay.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ms: u64,
}

impl ManualClock {
    pub fn at(now_ms: u64) -> Self {
        Self { now_ms }
    }

    /// Moves the clock forward; going backwards is not supported.
    pub fn advance(&mut self, delta_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(delta_ms);
    }
}

impl MonotonicClock for ManualClock {
    fn now_ms(&mut self) -> u64 {
        self.now_ms
    }
}
