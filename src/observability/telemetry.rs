use crate::pending::MatchStrategy;
use serde::Serialize;

/// Counters accumulated by the correlator since init.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorrelatorTelemetry {
    pub submissions_total: u64,
    pub duplicates_suppressed_total: u64,
    pub empty_payloads_total: u64,
    pub matched_direct_total: u64,
    pub matched_content_total: u64,
    pub matched_recency_total: u64,
    pub unmatched_total: u64,
    pub timeouts_total: u64,
    pub working_evictions_total: u64,
    pub persistence_failures_total: u64,
}

impl CorrelatorTelemetry {
    pub fn record_match(&mut self, strategy: MatchStrategy) {
        let counter = match strategy {
            MatchStrategy::DirectToken => &mut self.matched_direct_total,
            MatchStrategy::Content => &mut self.matched_content_total,
            MatchStrategy::Recency => &mut self.matched_recency_total,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn matched_total(&self) -> u64 {
        self.matched_direct_total
            .saturating_add(self.matched_content_total)
            .saturating_add(self.matched_recency_total)
    }
}
