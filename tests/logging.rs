use ackline::{JsonLineLogger, LogLevel, LogRotationPolicy};
use serde_json::Value;

#[test]
fn serializes_structured_entries() {
    let mut logger = JsonLineLogger::new(LogRotationPolicy {
        max_bytes: 1024,
        max_files: 2,
    });
    logger
        .log(100, LogLevel::Info, "correlator", "submission_captured", "tok-1")
        .unwrap();

    let lines: Vec<&str> = logger.lines().collect();
    assert_eq!(lines.len(), 1);
    let parsed: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(parsed["ts"], 100);
    assert_eq!(parsed["level"], "INFO");
    assert_eq!(parsed["component"], "correlator");
    assert_eq!(parsed["event"], "submission_captured");
    assert_eq!(parsed["detail"], "tok-1");
}

#[test]
fn level_override_filters_entries() {
    let mut logger = JsonLineLogger::default();
    logger.set_level(LogLevel::Warn);
    logger
        .log(0, LogLevel::Info, "correlator", "suppressed", "")
        .unwrap();
    logger
        .log(1, LogLevel::Warn, "correlator", "visible", "")
        .unwrap();

    let lines: Vec<&str> = logger.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("visible"));
}

#[test]
fn rotation_caps_retained_segments() {
    let mut logger = JsonLineLogger::new(LogRotationPolicy {
        max_bytes: 120,
        max_files: 2,
    });
    for idx in 0..50u32 {
        logger
            .log(idx as u64, LogLevel::Info, "correlator", "event", &format!("line-{idx}"))
            .unwrap();
    }
    // Rotated history plus the active segment.
    assert!(logger.files().count() <= 3);
    let total_lines: usize = logger.files().map(|file| file.lines().len()).sum();
    assert!(total_lines < 50);
    // Newest line is always retained.
    assert!(logger.lines().last().unwrap().contains("line-49"));
}
