use std::collections::HashMap;

/// Request-deduplication cache.
///
/// Maps an operation fingerprint to its last-seen timestamp and suppresses
/// repeats inside the active window. Markers self-expire via the periodic
/// sweep; the lookup path also expires lazily so a stale marker never
/// suppresses a fresh operation between sweeps.
pub struct DedupCache {
    window_ms: u64,
    markers: HashMap<String, u64>,
    suppressed_total: u64,
}

impl DedupCache {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms: window_ms.max(1),
            markers: HashMap::new(),
            suppressed_total: 0,
        }
    }

    /// Returns true (recording the fingerprint) the first time it is seen
    /// within the window, false for any repeat inside the window.
    ///
    /// A repeat does not refresh the marker: suppression is anchored to the
    /// first sighting, so a steady trickle of duplicates cannot extend the
    /// window indefinitely.
    pub fn should_process(&mut self, fingerprint: &str, now_ms: u64) -> bool {
        if let Some(last_seen) = self.markers.get(fingerprint) {
            if now_ms.saturating_sub(*last_seen) <= self.window_ms {
                self.suppressed_total = self.suppressed_total.saturating_add(1);
                return false;
            }
        }
        self.markers.insert(fingerprint.to_string(), now_ms);
        true
    }

    /// Drops markers older than the window; returns how many were removed.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let window_ms = self.window_ms;
        let before = self.markers.len();
        self.markers
            .retain(|_, last_seen| now_ms.saturating_sub(*last_seen) <= window_ms);
        before - self.markers.len()
    }

    /// Markers currently held.
    pub fn occupancy(&self) -> usize {
        self.markers.len()
    }

    /// Duplicates suppressed since construction.
    pub fn suppressed_total(&self) -> u64 {
        self.suppressed_total
    }
}
