use crate::archive::{
    merge_archive, SnapshotError, SnapshotSink, TierSnapshot, ARCHIVE_BUCKET, WORKING_BUCKET,
};
use crate::config::{ConfigError, RetentionConfig};
use crate::dedup::DedupCache;
use crate::export::{ExportSnapshot, SourceTier};
use crate::fingerprint::operation_fingerprint;
use crate::observability::{CorrelatorTelemetry, JsonLineLogger, LogLevel};
use crate::payload::parse_submission;
use crate::pending::{MatchStrategy, PendingEntry, PendingTable, TokenGenerator};
use crate::record::{ContextMap, EventRecord};
use crate::runtime::{ScheduledTask, TimerQueue};
use crate::store::EventStore;

const COMPONENT: &str = "correlator";

/// Result of offering a raw submission to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// A pending entry and store record were created.
    Captured { correlation_token: String },
    /// The operation fingerprint was seen within the dedup window; nothing
    /// was mutated. A deliberate no-op, not an error.
    SuppressedDuplicate,
    /// The payload decoded to empty text and was ignored.
    EmptyPayload,
}

/// Result of offering a confirmation to the engine. Fire-and-forget: an
/// unmatched confirmation is logged and dropped, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Matched {
        correlation_token: String,
        strategy: MatchStrategy,
    },
    Unmatched,
}

/// Orchestrates the dedup cache, pending table, event store, and timer queue.
///
/// All operations run on the caller's single logical thread; timed work
/// (confirmation timeouts, dedup sweeps) is drained by [`Correlator::tick`].
pub struct Correlator<S: SnapshotSink> {
    config: RetentionConfig,
    dedup: DedupCache,
    pending: PendingTable,
    store: EventStore,
    archive: Vec<EventRecord>,
    timers: TimerQueue,
    tokens: TokenGenerator,
    sink: S,
    logger: JsonLineLogger,
    telemetry: CorrelatorTelemetry,
}

impl<S: SnapshotSink> Correlator<S> {
    /// Builds the engine and schedules the first dedup sweep.
    pub fn new(config: RetentionConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut timers = TimerQueue::new();
        timers.schedule(config.dedup_sweep_interval_ms, ScheduledTask::DedupSweep);
        Ok(Self {
            dedup: DedupCache::new(config.dedup_window_ms),
            pending: PendingTable::new(config.pending_ttl_ms),
            store: EventStore::new(config.working_set_limit),
            archive: Vec::new(),
            timers,
            tokens: TokenGenerator::new(),
            sink,
            logger: JsonLineLogger::default(),
            telemetry: CorrelatorTelemetry::default(),
            config,
        })
    }

    /// Restores both retention tiers from the sink's persisted buckets.
    /// Missing or corrupt buckets degrade to an empty tier with a warning.
    pub fn load(&mut self, now_ms: u64) {
        match self.read_tier(WORKING_BUCKET) {
            Ok(Some(snapshot)) => {
                let count = snapshot.records.len();
                for record in snapshot.records {
                    self.store.append(record);
                }
                self.log(now_ms, LogLevel::Info, "working_tier_loaded", &count.to_string());
            }
            Ok(None) => {}
            Err(err) => self.log(now_ms, LogLevel::Warn, "working_tier_unreadable", &err.to_string()),
        }
        match self.read_tier(ARCHIVE_BUCKET) {
            Ok(Some(snapshot)) => {
                self.archive = snapshot.records;
                let cap = self.config.archive_limit;
                if self.archive.len() > cap {
                    let excess = self.archive.len() - cap;
                    self.archive.drain(..excess);
                }
                let detail = self.archive.len().to_string();
                self.log(now_ms, LogLevel::Info, "archive_tier_loaded", &detail);
            }
            Ok(None) => {}
            Err(err) => self.log(now_ms, LogLevel::Warn, "archive_tier_unreadable", &err.to_string()),
        }
    }

    /// Captures a raw submission observed by the external collaborator.
    pub fn record_submission(
        &mut self,
        target: &str,
        raw_payload: &[u8],
        context: ContextMap,
        now_ms: u64,
    ) -> SubmissionOutcome {
        let fingerprint =
            operation_fingerprint(target, raw_payload, now_ms, self.config.dedup_window_ms);
        if !self.dedup.should_process(&fingerprint, now_ms) {
            self.telemetry.duplicates_suppressed_total += 1;
            self.log(now_ms, LogLevel::Debug, "duplicate_suppressed", target);
            return SubmissionOutcome::SuppressedDuplicate;
        }

        let payload = parse_submission(raw_payload);
        if payload.content.is_empty() {
            self.telemetry.empty_payloads_total += 1;
            self.log(now_ms, LogLevel::Debug, "empty_payload_ignored", target);
            return SubmissionOutcome::EmptyPayload;
        }

        let correlation_token = self.tokens.next_token(now_ms);
        self.pending.insert(PendingEntry {
            correlation_token: correlation_token.clone(),
            content: payload.content.clone(),
            created_at_ms: now_ms,
            context: context.clone(),
        });
        let record = EventRecord::awaiting(
            correlation_token.clone(),
            payload.content,
            now_ms,
            payload.attachments,
            context,
        );
        let evicted = self.store.append(record);
        if evicted > 0 {
            self.telemetry.working_evictions_total += evicted as u64;
            self.log(
                now_ms,
                LogLevel::Info,
                "working_set_size_exceeded",
                &evicted.to_string(),
            );
        }
        self.timers.schedule(
            now_ms.saturating_add(self.config.pending_ttl_ms),
            ScheduledTask::PendingTimeout {
                correlation_token: correlation_token.clone(),
            },
        );
        self.telemetry.submissions_total += 1;
        self.log(now_ms, LogLevel::Info, "submission_captured", &correlation_token);
        self.mirror(now_ms);
        SubmissionOutcome::Captured { correlation_token }
    }

    /// Applies an asynchronous confirmation carrying the server-assigned id.
    pub fn record_confirmation(
        &mut self,
        confirmed_id: &str,
        raw_content: &str,
        hinted_token: Option<&str>,
        now_ms: u64,
    ) -> ConfirmationOutcome {
        match self.pending.resolve(raw_content, hinted_token, now_ms) {
            Some(resolved) => {
                let token = resolved.entry.correlation_token;
                // The record may already be evicted from the working set;
                // the update is then a legitimate no-op.
                self.store.update_in_place(&token, |record| {
                    record.confirm(confirmed_id);
                });
                self.telemetry.record_match(resolved.strategy);
                self.log(
                    now_ms,
                    LogLevel::Info,
                    match resolved.strategy {
                        MatchStrategy::DirectToken => "confirmation_matched_direct",
                        MatchStrategy::Content => "confirmation_matched_content",
                        MatchStrategy::Recency => "confirmation_matched_recency",
                    },
                    &token,
                );
                self.mirror(now_ms);
                ConfirmationOutcome::Matched {
                    correlation_token: token,
                    strategy: resolved.strategy,
                }
            }
            None => {
                self.telemetry.unmatched_total += 1;
                self.log(now_ms, LogLevel::Warn, "confirmation_unmatched", confirmed_id);
                ConfirmationOutcome::Unmatched
            }
        }
    }

    /// Drains every scheduled task due at or before `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        let mut mutated = false;
        while let Some((due_ms, task)) = self.timers.pop_due(now_ms) {
            match task {
                ScheduledTask::PendingTimeout { correlation_token } => {
                    // Resolution already removed the entry when the timer
                    // loses the race; the existence check fails silently.
                    if self.pending.remove(&correlation_token).is_some() {
                        self.store.update_in_place(&correlation_token, |record| {
                            record.time_out();
                        });
                        self.telemetry.timeouts_total += 1;
                        self.log(
                            now_ms,
                            LogLevel::Info,
                            "confirmation_timed_out",
                            &correlation_token,
                        );
                        mutated = true;
                    }
                }
                ScheduledTask::DedupSweep => {
                    let removed = self.dedup.sweep(due_ms);
                    if removed > 0 {
                        self.log(now_ms, LogLevel::Debug, "dedup_swept", &removed.to_string());
                    }
                    self.timers.schedule(
                        due_ms.saturating_add(self.config.dedup_sweep_interval_ms),
                        ScheduledTask::DedupSweep,
                    );
                }
            }
        }
        if mutated {
            self.mirror(now_ms);
        }
    }

    /// Display-ordered snapshots, most-recent first.
    pub fn list_recent(&self, limit: usize) -> Vec<EventRecord> {
        self.store.list_recent(limit)
    }

    /// Builds the exportable snapshot. Reads the archive tier; falls back to
    /// the working set when the archive is missing or unreadable.
    pub fn export_snapshot(&mut self, now_ms: u64) -> ExportSnapshot {
        let (records, source_tier) = match self.read_tier(ARCHIVE_BUCKET) {
            Ok(Some(snapshot)) => (snapshot.records, SourceTier::Archive),
            Ok(None) => (self.store.snapshot(), SourceTier::WorkingSet),
            Err(err) => {
                self.log(now_ms, LogLevel::Warn, "export_fallback", &err.to_string());
                (self.store.snapshot(), SourceTier::WorkingSet)
            }
        };
        ExportSnapshot::build(records, source_tier, self.config.clone(), now_ms)
    }

    /// Discards all working-set and archive state and persists the empty
    /// tiers. Already-scheduled timeouts fire into nothing.
    pub fn clear_all(&mut self, now_ms: u64) {
        self.store.clear();
        self.pending.clear();
        self.archive.clear();
        self.log(now_ms, LogLevel::Info, "cleared", "");
        self.mirror(now_ms);
    }

    /// Flushes both tiers; call before dropping the engine.
    pub fn shutdown(&mut self, now_ms: u64) {
        self.mirror(now_ms);
        self.log(now_ms, LogLevel::Info, "shutdown", "");
    }

    pub fn config(&self) -> &RetentionConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &CorrelatorTelemetry {
        &self.telemetry
    }

    pub fn logger(&self) -> &JsonLineLogger {
        &self.logger
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.logger.set_level(level);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn working_set_len(&self) -> usize {
        self.store.len()
    }

    pub fn archive_len(&self) -> usize {
        self.archive.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mirrors the working set into both persisted buckets. Failures are
    /// counted and logged; the working set stays authoritative.
    fn mirror(&mut self, now_ms: u64) {
        let working = self.store.snapshot();
        let working_doc = TierSnapshot::new(now_ms, working.clone()).to_bytes();
        if let Err(err) = self.sink.write_bucket(WORKING_BUCKET, &working_doc) {
            self.persistence_failure(now_ms, &err);
        }
        let archived = std::mem::take(&mut self.archive);
        self.archive = merge_archive(archived, &working, self.config.archive_limit);
        let archive_doc = TierSnapshot::new(now_ms, self.archive.clone()).to_bytes();
        if let Err(err) = self.sink.write_bucket(ARCHIVE_BUCKET, &archive_doc) {
            self.persistence_failure(now_ms, &err);
        }
    }

    fn persistence_failure(&mut self, now_ms: u64, err: &SnapshotError) {
        self.telemetry.persistence_failures_total += 1;
        self.log(now_ms, LogLevel::Warn, "persistence_failure", &err.to_string());
    }

    fn read_tier(&self, bucket: &str) -> Result<Option<TierSnapshot>, SnapshotError> {
        match self.sink.read_bucket(bucket)? {
            Some(payload) => Ok(Some(TierSnapshot::from_bytes(bucket, &payload)?)),
            None => Ok(None),
        }
    }

    fn log(&mut self, ts_ms: u64, level: LogLevel, event: &str, detail: &str) {
        let _ = self.logger.log(ts_ms, level, COMPONENT, event, detail);
    }
}
