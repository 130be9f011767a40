use ackline::{ScheduledTask, TimerQueue};

fn timeout(token: &str) -> ScheduledTask {
    ScheduledTask::PendingTimeout {
        correlation_token: token.to_string(),
    }
}

#[test]
fn pops_tasks_in_due_order() {
    let mut timers = TimerQueue::new();
    timers.schedule(3_000, timeout("late"));
    timers.schedule(1_000, timeout("early"));
    timers.schedule(2_000, ScheduledTask::DedupSweep);

    let (due, task) = timers.pop_due(5_000).expect("first");
    assert_eq!(due, 1_000);
    assert_eq!(task, timeout("early"));
    let (due, task) = timers.pop_due(5_000).expect("second");
    assert_eq!(due, 2_000);
    assert_eq!(task, ScheduledTask::DedupSweep);
    let (due, _) = timers.pop_due(5_000).expect("third");
    assert_eq!(due, 3_000);
    assert!(timers.pop_due(5_000).is_none());
}

#[test]
fn does_not_pop_tasks_that_are_not_yet_due() {
    let mut timers = TimerQueue::new();
    timers.schedule(10_000, timeout("future"));
    assert!(timers.pop_due(9_999).is_none());
    assert_eq!(timers.len(), 1);
    assert!(timers.pop_due(10_000).is_some());
    assert!(timers.is_empty());
}

#[test]
fn equal_due_times_fire_in_scheduling_order() {
    let mut timers = TimerQueue::new();
    timers.schedule(1_000, timeout("first"));
    timers.schedule(1_000, timeout("second"));
    let (_, task) = timers.pop_due(1_000).expect("first scheduled");
    assert_eq!(task, timeout("first"));
    let (_, task) = timers.pop_due(1_000).expect("second scheduled");
    assert_eq!(task, timeout("second"));
}
