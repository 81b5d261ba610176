use mipdrive_monitor::{
    SolveEvent, SolveMonitor, SolveTracker, TrackerOptions, TrackerOutcome,
};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const COLUMNS: &str = "     Proc. InQueue |  Leaves   Expl. | BestBound       BestSol              Gap |   Cuts   InLp Confl. | LpIters     Time";
const FIRST_ROW: &str = "         0       0         0   0.00%   0               inf                  inf        0      0      2        57     0.0s";
const LAST_ROW: &str = " L       0       0         0 100.00%   0               0                  0.00%     2228     30     80       339     0.2s";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn append(path: &std::path::Path, text: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
}

fn options(path: &std::path::Path) -> TrackerOptions {
    TrackerOptions::new(path).with_poll_interval(Duration::from_millis(5))
}

#[test]
fn test_tracker_publishes_progress_then_done() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();
    let monitor = SolveMonitor::new();
    let events = monitor.subscribe();

    let tracker = SolveTracker::spawn(options(file.path()), monitor).unwrap();
    append(file.path(), "Presolving model\n");
    append(file.path(), &format!("{COLUMNS}\n\n{FIRST_ROW}\n"));
    append(file.path(), &format!("{LAST_ROW}\nSolving report\nModel status : Optimal\n"));

    assert_eq!(
        tracker.wait_timeout(Duration::from_secs(10)),
        Some(TrackerOutcome::Completed)
    );
    tracker.shutdown();

    let received: Vec<SolveEvent> = events.try_iter().collect();
    assert_eq!(received.len(), 3);
    assert!(matches!(received[0], SolveEvent::Progress(p) if p.lp_iteration_count == 57));
    assert!(matches!(
        received[1],
        SolveEvent::Progress(p) if p.cut_count == 2228 && p.lp_iteration_count == 339
    ));
    assert_eq!(received[2], SolveEvent::Done);
}

#[test]
fn test_tracker_follows_source_column_table() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();
    let monitor = SolveMonitor::new();
    let events = monitor.subscribe();

    let tracker = SolveTracker::spawn(options(file.path()), monitor).unwrap();
    append(
        file.path(),
        "Src  Proc. InQueue |  Leaves   Expl. | BestBound       BestSol              Gap |   Cuts   InLp Confl. | LpIters     Time\n\n",
    );
    append(
        file.path(),
        " T       0       0         0   0.00%   -inf            inf                  inf        0      0      0         0     0.0s\n",
    );
    append(
        file.path(),
        " J       0       0         0   0.00%   21              21                 0.00%        0      0      0         4     0.0s\n",
    );
    append(file.path(), "Solving report\n");

    assert_eq!(
        tracker.wait_timeout(Duration::from_secs(10)),
        Some(TrackerOutcome::Completed)
    );
    tracker.shutdown();

    let received: Vec<SolveEvent> = events.try_iter().collect();
    assert_eq!(received.len(), 3);
    assert!(matches!(received[0], SolveEvent::Progress(p) if p.dual_bound == f64::NEG_INFINITY));
    assert!(matches!(
        received[1],
        SolveEvent::Progress(p) if p.primal_bound == 21.0 && p.lp_iteration_count == 4
    ));
    assert_eq!(received[2], SolveEvent::Done);
}

#[test]
fn test_tracker_skips_existing_content_by_default() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();
    append(file.path(), &format!("{COLUMNS}\n{FIRST_ROW}\n"));

    let monitor = SolveMonitor::new();
    let events = monitor.subscribe();
    let tracker = SolveTracker::spawn(options(file.path()), monitor).unwrap();
    append(file.path(), &format!("{LAST_ROW}\n"));
    tracker.shutdown();

    // The header was before the starting offset, so the new row is not part
    // of an iteration table.
    let received: Vec<SolveEvent> = events.try_iter().collect();
    assert_eq!(received, vec![SolveEvent::Done]);
    assert_eq!(tracker.outcome(), Some(TrackerOutcome::Shutdown));
}

#[test]
fn test_tracker_reads_from_beginning_when_asked() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();
    append(file.path(), &format!("{COLUMNS}\n{FIRST_ROW}\nSolving report\n"));

    let monitor = SolveMonitor::new();
    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&progress);
    monitor.on_progress(move |p| sink.lock().unwrap().push(*p));

    let tracker =
        SolveTracker::spawn(options(file.path()).with_from_beginning(true), monitor).unwrap();
    assert_eq!(tracker.wait(), TrackerOutcome::Completed);
    assert_eq!(progress.lock().unwrap().len(), 1);
}

#[test]
fn test_shutdown_drains_remaining_lines() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();
    let monitor = SolveMonitor::new();
    let events = monitor.subscribe();
    let tracker = SolveTracker::spawn(
        TrackerOptions::new(file.path()).with_poll_interval(Duration::from_secs(60)),
        monitor,
    )
    .unwrap();

    append(file.path(), &format!("{COLUMNS}\n{FIRST_ROW}\n{LAST_ROW}\n"));
    tracker.shutdown();

    let received: Vec<SolveEvent> = events.try_iter().collect();
    assert_eq!(received.len(), 3);
    assert_eq!(received[2], SolveEvent::Done);
}

#[test]
fn test_done_is_published_once() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();
    let monitor = SolveMonitor::new();
    let done = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&done);
    monitor.on_done(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let tracker = SolveTracker::spawn(options(file.path()), monitor).unwrap();
    append(file.path(), "Solving report\n");
    assert_eq!(tracker.wait(), TrackerOutcome::Completed);

    tracker.shutdown();
    tracker.shutdown();
    drop(tracker);
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[test]
fn test_late_waiters_see_cached_outcome() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();
    let tracker = Arc::new(SolveTracker::spawn(options(file.path()), SolveMonitor::new()).unwrap());
    assert_eq!(tracker.outcome(), None);
    assert_eq!(tracker.wait_timeout(Duration::from_millis(20)), None);

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || tracker.wait())
        })
        .collect();
    tracker.shutdown();

    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), TrackerOutcome::Shutdown);
    }
    assert_eq!(tracker.wait(), TrackerOutcome::Shutdown);
}

#[test]
fn test_tracker_waits_for_missing_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solve.log");
    let monitor = SolveMonitor::new();
    let events = monitor.subscribe();
    let tracker = SolveTracker::spawn(options(&path), monitor).unwrap();

    std::fs::write(&path, format!("{COLUMNS}\n{LAST_ROW}\nSolving report\n")).unwrap();
    assert_eq!(
        tracker.wait_timeout(Duration::from_secs(10)),
        Some(TrackerOutcome::Completed)
    );
    let received: Vec<SolveEvent> = events.try_iter().collect();
    assert_eq!(received.len(), 2);
}
