use crate::archive::FileSnapshotSink;
use crate::clock::{MonotonicClock, SystemMonotonicClock};
use crate::config::RetentionConfig;
use crate::correlator::Correlator;
use anyhow::Result;

/// Default directory for the persisted tier buckets.
pub const DATA_DIRECTORY: &str = "ackline_data";

/// Standalone entrypoint: restores persisted tiers, prints a summary of the
/// reconciled history, and flushes on the way out. The embedding collaborator
/// normally constructs [`Correlator`] directly instead.
pub fn run() -> Result<()> {
    let mut clock = SystemMonotonicClock::new();
    let sink = FileSnapshotSink::new(DATA_DIRECTORY);
    let mut correlator = Correlator::new(RetentionConfig::default(), sink)?;

    let now_ms = clock.now_ms();
    correlator.load(now_ms);

    let snapshot = correlator.export_snapshot(clock.now_ms());
    println!(
        "ackline: {} records ({} confirmed, {} awaiting, {} timed out, {} with attachments)",
        snapshot.summary.total,
        snapshot.summary.confirmed,
        snapshot.summary.awaiting,
        snapshot.summary.timed_out,
        snapshot.summary.with_attachments,
    );

    correlator.shutdown(clock.now_ms());
    Ok(())
}
