use ackline::DedupCache;

#[test]
fn suppresses_repeat_within_window() {
    let mut cache = DedupCache::new(5_000);
    assert!(cache.should_process("fp-1", 1_000));
    assert!(!cache.should_process("fp-1", 3_000));
    assert_eq!(cache.suppressed_total(), 1);
}

#[test]
fn processes_again_after_window_elapses() {
    let mut cache = DedupCache::new(5_000);
    assert!(cache.should_process("fp-1", 0));
    assert!(!cache.should_process("fp-1", 4_999));
    assert!(cache.should_process("fp-1", 5_001));
}

#[test]
fn repeat_does_not_refresh_the_marker() {
    let mut cache = DedupCache::new(5_000);
    assert!(cache.should_process("fp-1", 0));
    // Duplicates at 3s and 4.5s must not slide the window forward.
    assert!(!cache.should_process("fp-1", 3_000));
    assert!(!cache.should_process("fp-1", 4_500));
    assert!(cache.should_process("fp-1", 5_200));
}

#[test]
fn sweep_drops_only_expired_markers() {
    let mut cache = DedupCache::new(5_000);
    cache.should_process("old", 0);
    cache.should_process("fresh", 8_000);
    assert_eq!(cache.occupancy(), 2);
    let removed = cache.sweep(10_000);
    assert_eq!(removed, 1);
    assert_eq!(cache.occupancy(), 1);
    assert!(!cache.should_process("fresh", 10_500));
}

#[test]
fn distinct_fingerprints_do_not_interfere() {
    let mut cache = DedupCache::new(5_000);
    assert!(cache.should_process("fp-a", 100));
    assert!(cache.should_process("fp-b", 100));
    assert!(!cache.should_process("fp-a", 200));
    assert!(!cache.should_process("fp-b", 200));
}
