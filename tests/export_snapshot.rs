use ackline::{
    ConfirmationOutcome, ContextMap, Correlator, MemorySnapshotSink, RetentionConfig, SourceTier,
    SubmissionOutcome,
};

const TARGET: &str = "/reply/add";

fn engine() -> Correlator<MemorySnapshotSink> {
    Correlator::new(RetentionConfig::default(), MemorySnapshotSink::new()).expect("valid config")
}

fn submit(correlator: &mut Correlator<MemorySnapshotSink>, body: &str, now_ms: u64) -> String {
    match correlator.record_submission(TARGET, body.as_bytes(), ContextMap::new(), now_ms) {
        SubmissionOutcome::Captured { correlation_token } => correlation_token,
        other => panic!("expected capture, got {other:?}"),
    }
}

#[test]
fn summary_counts_match_the_record_list() {
    let mut correlator = engine();
    let token = submit(&mut correlator, "message=confirmed+one", 0);
    submit(&mut correlator, "message=never+confirmed", 1_000);

    let outcome = correlator.record_confirmation("42", "confirmed one", Some(&token), 2_000);
    assert!(matches!(outcome, ConfirmationOutcome::Matched { .. }));
    correlator.tick(31_000);

    let snapshot = correlator.export_snapshot(32_000);
    assert_eq!(snapshot.source_tier, SourceTier::Archive);
    assert_eq!(snapshot.summary.total, 2);
    assert_eq!(snapshot.summary.confirmed, 1);
    assert_eq!(snapshot.summary.timed_out, 1);
    assert_eq!(snapshot.summary.awaiting, 0);
    assert_eq!(snapshot.records.len(), snapshot.summary.total);
    assert_eq!(snapshot.exported_at_ms, 32_000);
}

#[test]
fn attachment_counts_are_aggregated() {
    let mut correlator = engine();
    let pictures = serde_json::json!([
        { "img_src": "https://cdn.example/a.png", "img_width": 10, "img_height": 10, "img_size": 5 },
        { "img_src": "https://cdn.example/b.png", "img_width": 20, "img_height": 20, "img_size": 9 }
    ])
    .to_string();
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("message", "with images")
        .append_pair("pictures", &pictures)
        .finish();
    submit(&mut correlator, &body, 0);
    submit(&mut correlator, "message=plain", 6_000);

    let snapshot = correlator.export_snapshot(7_000);
    assert_eq!(snapshot.summary.with_attachments, 1);
    assert_eq!(snapshot.summary.attachments_total, 2);
}

#[test]
fn export_falls_back_to_working_set_when_archive_is_missing() {
    let mut correlator = engine();
    let snapshot = correlator.export_snapshot(0);
    assert_eq!(snapshot.source_tier, SourceTier::WorkingSet);
    assert_eq!(snapshot.summary.total, 0);
}

#[test]
fn exported_records_carry_the_stable_field_set() {
    let mut correlator = engine();
    submit(&mut correlator, "message=hello", 0);

    let snapshot = correlator.export_snapshot(1_000);
    let value = serde_json::to_value(&snapshot).expect("serializable");
    for field in [
        "exported_at_ms",
        "source_tier",
        "config",
        "summary",
        "records",
    ] {
        assert!(value.get(field).is_some(), "missing {field}");
    }
    let record = &value["records"][0];
    for field in [
        "content",
        "created_at_ms",
        "correlation_token",
        "confirmed_id",
        "status",
        "attachments",
        "context",
    ] {
        assert!(record.get(field).is_some(), "missing record field {field}");
    }
    // Unconfirmed records serialize an explicit null id.
    assert!(record["confirmed_id"].is_null());
    assert_eq!(record["status"], "AwaitingConfirmation");
}
