use ackline::{
    merge_archive, ContextMap, Correlator, EventRecord, MemorySnapshotSink, RecordStatus,
    RetentionConfig, SnapshotError, SnapshotSink, SourceTier, SubmissionOutcome, TierSnapshot,
    ARCHIVE_BUCKET, WORKING_BUCKET,
};

const TARGET: &str = "/reply/add";

fn record(token: &str, content: &str, created_at_ms: u64) -> EventRecord {
    EventRecord::awaiting(token, content, created_at_ms, Vec::new(), ContextMap::new())
}

fn submit(correlator: &mut Correlator<impl SnapshotSink>, text: &str, now_ms: u64) -> String {
    let body = format!("message={text}");
    match correlator.record_submission(TARGET, body.as_bytes(), ContextMap::new(), now_ms) {
        SubmissionOutcome::Captured { correlation_token } => correlation_token,
        other => panic!("expected capture, got {other:?}"),
    }
}

#[test]
fn merge_prefers_working_set_copies_and_keeps_history() {
    let mut old_a = record("a", "first", 0);
    old_a.confirm("stale-id");
    let archived = vec![old_a, record("b", "evicted history", 1)];
    let mut new_a = record("a", "first", 0);
    new_a.confirm("fresh-id");
    let working = vec![new_a, record("c", "live", 2)];

    let merged = merge_archive(archived, &working, 10);
    let tokens: Vec<&str> = merged
        .iter()
        .map(|r| r.correlation_token.as_str())
        .collect();
    assert_eq!(tokens, vec!["b", "a", "c"]);
    let a = merged.iter().find(|r| r.correlation_token == "a").unwrap();
    assert_eq!(a.confirmed_id.as_deref(), Some("fresh-id"));
}

#[test]
fn merge_truncates_oldest_beyond_capacity() {
    let archived = vec![record("a", "1", 0), record("b", "2", 1)];
    let working = vec![record("c", "3", 2)];
    let merged = merge_archive(archived, &working, 2);
    let tokens: Vec<&str> = merged
        .iter()
        .map(|r| r.correlation_token.as_str())
        .collect();
    assert_eq!(tokens, vec!["b", "c"]);
}

#[test]
fn archive_retains_records_evicted_from_working_set() {
    let mut correlator = Correlator::new(
        RetentionConfig {
            working_set_limit: 2,
            archive_limit: 5,
            ..RetentionConfig::default()
        },
        MemorySnapshotSink::new(),
    )
    .expect("valid config");

    let token_one = submit(&mut correlator, "one", 0);
    submit(&mut correlator, "two", 1_000);
    submit(&mut correlator, "three", 2_000);

    assert_eq!(correlator.working_set_len(), 2);
    assert_eq!(correlator.archive_len(), 3);

    let snapshot = correlator.export_snapshot(3_000);
    assert_eq!(snapshot.source_tier, SourceTier::Archive);
    assert!(snapshot
        .records
        .iter()
        .any(|r| r.correlation_token == token_one));
}

#[test]
fn archive_cap_is_enforced_independently() {
    let mut correlator = Correlator::new(
        RetentionConfig {
            working_set_limit: 2,
            archive_limit: 3,
            ..RetentionConfig::default()
        },
        MemorySnapshotSink::new(),
    )
    .expect("valid config");

    for (idx, text) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        submit(&mut correlator, text, idx as u64 * 1_000);
    }
    assert_eq!(correlator.working_set_len(), 2);
    assert_eq!(correlator.archive_len(), 3);
}

/// Sink that accepts working-tier writes but rejects the archive bucket,
/// modeling quota/storage errors on the larger tier.
struct RejectingSink {
    inner: MemorySnapshotSink,
    reject_archive: bool,
}

impl SnapshotSink for RejectingSink {
    fn write_bucket(&mut self, bucket: &str, payload: &[u8]) -> Result<(), SnapshotError> {
        if self.reject_archive && bucket == ARCHIVE_BUCKET {
            return Err(SnapshotError::Write {
                bucket: bucket.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.inner.write_bucket(bucket, payload)
    }

    fn read_bucket(&self, bucket: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        self.inner.read_bucket(bucket)
    }
}

#[test]
fn archive_write_failure_leaves_working_set_authoritative() {
    let sink = RejectingSink {
        inner: MemorySnapshotSink::new(),
        reject_archive: true,
    };
    let mut correlator =
        Correlator::new(RetentionConfig::default(), sink).expect("valid config");

    submit(&mut correlator, "hello", 0);
    assert_eq!(correlator.telemetry().persistence_failures_total, 1);
    assert_eq!(correlator.working_set_len(), 1);

    // The working bucket was still mirrored.
    let working = correlator
        .sink()
        .inner
        .read_bucket(WORKING_BUCKET)
        .unwrap()
        .expect("working bucket written");
    let snapshot = TierSnapshot::from_bytes(WORKING_BUCKET, &working).unwrap();
    assert_eq!(snapshot.records.len(), 1);

    // Subsequent operations keep flowing.
    let outcome = correlator.record_confirmation("1", "hello", None, 1_000);
    assert!(matches!(
        outcome,
        ackline::ConfirmationOutcome::Matched { .. }
    ));
}

#[test]
fn persisted_tiers_survive_a_restart() {
    let mut correlator =
        Correlator::new(RetentionConfig::default(), MemorySnapshotSink::new())
            .expect("valid config");
    let token = submit(&mut correlator, "hello", 0);
    submit(&mut correlator, "other", 1_000);
    correlator.record_confirmation("123", "hello", Some(&token), 2_000);
    correlator.shutdown(3_000);

    let sink = correlator.sink().clone();
    let mut restarted =
        Correlator::new(RetentionConfig::default(), sink).expect("valid config");
    restarted.load(4_000);

    assert_eq!(restarted.working_set_len(), 2);
    assert_eq!(restarted.archive_len(), 2);
    let restored = restarted
        .list_recent(10)
        .into_iter()
        .find(|r| r.correlation_token == token)
        .expect("confirmed record restored");
    assert_eq!(restored.status, RecordStatus::Confirmed);
    assert_eq!(restored.confirmed_id.as_deref(), Some("123"));
}

#[test]
fn corrupt_buckets_degrade_to_empty_state() {
    let mut sink = MemorySnapshotSink::new();
    sink.write_bucket(WORKING_BUCKET, b"{not json").unwrap();
    sink.write_bucket(ARCHIVE_BUCKET, b"[1, 2, 3]").unwrap();

    let mut correlator =
        Correlator::new(RetentionConfig::default(), sink).expect("valid config");
    correlator.load(0);
    assert_eq!(correlator.working_set_len(), 0);
    assert_eq!(correlator.archive_len(), 0);

    // Export cannot read the corrupt archive and falls back.
    let snapshot = correlator.export_snapshot(1_000);
    assert_eq!(snapshot.source_tier, SourceTier::WorkingSet);
}

#[test]
fn load_reapplies_capacity_caps() {
    let records: Vec<EventRecord> = (0..6)
        .map(|idx| record(&format!("t{idx}"), "x", idx))
        .collect();
    let mut sink = MemorySnapshotSink::new();
    let doc = TierSnapshot::new(0, records).to_bytes();
    sink.write_bucket(ARCHIVE_BUCKET, &doc).unwrap();

    let mut correlator = Correlator::new(
        RetentionConfig {
            working_set_limit: 2,
            archive_limit: 4,
            ..RetentionConfig::default()
        },
        sink,
    )
    .expect("valid config");
    correlator.load(0);
    assert_eq!(correlator.archive_len(), 4);
}
