//! ackline — event correlation and bounded-retention engine.
//!
//! Reconciles user submissions with their asynchronously arriving
//! confirmations into a single durable record per event, suppresses duplicate
//! triggering of the same logical operation, and bounds memory with FIFO
//! eviction at two retention tiers (in-memory working set and a larger
//! persisted archive).

pub mod archive;
pub mod clock;
pub mod config;
pub mod correlator;
pub mod dedup;
pub mod export;
pub mod fingerprint;
pub mod observability;
pub mod payload;
pub mod pending;
pub mod record;
pub mod runtime;
pub mod store;

pub mod app;

pub use archive::{
    merge_archive, FileSnapshotSink, MemorySnapshotSink, SnapshotError, SnapshotSink,
    TierSnapshot, ARCHIVE_BUCKET, SNAPSHOT_FORMAT, WORKING_BUCKET,
};
pub use clock::{ManualClock, MonotonicClock, SystemMonotonicClock};
pub use config::{ConfigError, RetentionConfig};
pub use correlator::{ConfirmationOutcome, Correlator, SubmissionOutcome};
pub use dedup::DedupCache;
pub use export::{ExportSnapshot, ExportSummary, SourceTier};
pub use fingerprint::{operation_fingerprint, FINGERPRINT_PAYLOAD_PREFIX};
pub use observability::{
    CorrelatorTelemetry, JsonLineLogger, LogFile, LogLevel, LogRotationPolicy, LoggingError,
};
pub use payload::{
    extract_attachments, normalize_confirmation, parse_submission, strip_reply_quote,
    SubmissionPayload,
};
pub use pending::{
    MatchStrategy, PendingEntry, PendingTable, ResolvedMatch, TokenGenerator, MATCH_STRATEGIES,
};
pub use record::{ContextMap, EventRecord, MediaAttachment, RecordStatus};
pub use runtime::{ScheduledTask, TimerQueue};
pub use store::EventStore;
