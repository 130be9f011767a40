use crate::config::RetentionConfig;
use crate::record::{EventRecord, RecordStatus};
use serde::Serialize;

/// Which retention tier an export was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceTier {
    Archive,
    WorkingSet,
}

/// Aggregate counts over the exported records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub total: usize,
    pub confirmed: usize,
    pub awaiting: usize,
    pub timed_out: usize,
    pub with_attachments: usize,
    pub attachments_total: usize,
}

impl ExportSummary {
    fn tally(records: &[EventRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            confirmed: 0,
            awaiting: 0,
            timed_out: 0,
            with_attachments: 0,
            attachments_total: 0,
        };
        for record in records {
            match record.status {
                RecordStatus::Confirmed => summary.confirmed += 1,
                RecordStatus::AwaitingConfirmation => summary.awaiting += 1,
                RecordStatus::ConfirmationTimedOut => summary.timed_out += 1,
            }
            if record.has_attachments() {
                summary.with_attachments += 1;
            }
            summary.attachments_total += record.attachments.len();
        }
        summary
    }
}

/// Serializable export shape handed to the collaborator for file export.
/// The record field set is stable: content, created_at_ms, correlation_token,
/// confirmed_id, status, attachments, context.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSnapshot {
    pub exported_at_ms: u64,
    pub source_tier: SourceTier,
    pub config: RetentionConfig,
    pub summary: ExportSummary,
    pub records: Vec<EventRecord>,
}

impl ExportSnapshot {
    pub fn build(
        records: Vec<EventRecord>,
        source_tier: SourceTier,
        config: RetentionConfig,
        exported_at_ms: u64,
    ) -> Self {
        let summary = ExportSummary::tally(&records);
        Self {
            exported_at_ms,
            source_tier,
            config,
            summary,
            records,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
