//! Background tailing of a solve log file.

use crate::monitor::SolveMonitor;
use crate::parser::{LineEvent, ParsePhase};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default delay between two reads of the log file.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Options for [`SolveTracker::spawn`].
#[derive(Debug, Clone)]
pub struct TrackerOptions {
    pub path: PathBuf,
    /// Read the file from byte zero instead of its current end.
    pub from_beginning: bool,
    pub poll_interval: Duration,
}

impl TrackerOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            from_beginning: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_from_beginning(mut self, from_beginning: bool) -> Self {
        self.from_beginning = from_beginning;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// How tailing ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// The report header was read.
    Completed,
    /// Tailing was stopped by [`SolveTracker::shutdown`].
    Shutdown,
}

#[derive(Default)]
struct TrackerState {
    stop_requested: bool,
    done_published: bool,
    outcome: Option<TrackerOutcome>,
}

struct Shared {
    state: Mutex<TrackerState>,
    changed: Condvar,
    monitor: SolveMonitor,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn publish_done_once(&self) {
        {
            let mut state = self.lock();
            if state.done_published {
                return;
            }
            state.done_published = true;
        }
        self.monitor.publish_done();
    }

    fn finish(&self, outcome: TrackerOutcome) {
        self.publish_done_once();
        let mut state = self.lock();
        if state.outcome.is_none() {
            state.outcome = Some(outcome);
        }
        self.changed.notify_all();
    }
}

/// Tails a log file on its own thread and publishes parsed progress.
///
/// Exactly one `Done` event is published per tracker, either when the
/// report header is read or on shutdown.
pub struct SolveTracker {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
    path: PathBuf,
}

impl SolveTracker {
    /// Start tailing `options.path`. The file does not need to exist yet.
    pub fn spawn(options: TrackerOptions, monitor: SolveMonitor) -> io::Result<Self> {
        let offset = if options.from_beginning {
            0
        } else {
            match std::fs::metadata(&options.path) {
                Ok(metadata) => metadata.len(),
                Err(err) if err.kind() == io::ErrorKind::NotFound => 0,
                Err(err) => return Err(err),
            }
        };

        let shared = Arc::new(Shared {
            state: Mutex::new(TrackerState::default()),
            changed: Condvar::new(),
            monitor,
        });
        let mut tail = LogTail::new(options.path.clone(), offset);
        let poll_interval = options.poll_interval;
        let worker = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name("mipdrive-tracker".to_string())
            .spawn(move || {
                let outcome = tail.run(&worker, poll_interval);
                worker.finish(outcome);
            })?;

        debug!(
            component = "tracker",
            operation = "spawn",
            status = "success",
            path = %options.path.display(),
            offset,
            "Started log tracker"
        );

        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
            path: options.path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain the rest of the file, stop the thread and publish `Done` if it
    /// was not already published. Calling it again has no effect.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.lock();
            state.stop_requested = true;
        }
        self.shared.changed.notify_all();

        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            let started = Instant::now();
            if handle.join().is_err() {
                warn!(
                    component = "tracker",
                    operation = "shutdown",
                    path = %self.path.display(),
                    "Tracker thread panicked"
                );
            }
            self.shared.finish(TrackerOutcome::Shutdown);
            debug!(
                component = "tracker",
                operation = "shutdown",
                status = "success",
                duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                outcome = ?self.outcome(),
                "Stopped log tracker"
            );
        }
    }

    /// Block until tailing has ended.
    pub fn wait(&self) -> TrackerOutcome {
        let mut state = self.shared.lock();
        loop {
            if let Some(outcome) = state.outcome {
                return outcome;
            }
            state = match self.shared.changed.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    /// Like [`SolveTracker::wait`], giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<TrackerOutcome> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();
        loop {
            if let Some(outcome) = state.outcome {
                return Some(outcome);
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            state = match self.shared.changed.wait_timeout(state, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Outcome if tailing has already ended.
    pub fn outcome(&self) -> Option<TrackerOutcome> {
        self.shared.lock().outcome
    }
}

impl Drop for SolveTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SolveTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveTracker")
            .field("path", &self.path)
            .field("outcome", &self.outcome())
            .finish()
    }
}

/// Incremental reader state owned by the tracker thread.
struct LogTail {
    path: PathBuf,
    file: Option<File>,
    offset: u64,
    pending: Vec<u8>,
    phase: ParsePhase,
    error_reported: bool,
}

impl LogTail {
    fn new(path: PathBuf, offset: u64) -> Self {
        Self {
            path,
            file: None,
            offset,
            pending: Vec::new(),
            phase: ParsePhase::default(),
            error_reported: false,
        }
    }

    fn run(&mut self, shared: &Shared, poll_interval: Duration) -> TrackerOutcome {
        loop {
            // Read the flag first so one more pass happens after a stop request.
            let stopping = shared.lock().stop_requested;

            match self.poll(&shared.monitor) {
                Ok(true) => {
                    shared.publish_done_once();
                    return TrackerOutcome::Completed;
                }
                Ok(false) => {}
                Err(err) => self.report_error(&err),
            }

            if stopping {
                if self.flush_pending(&shared.monitor) {
                    shared.publish_done_once();
                    return TrackerOutcome::Completed;
                }
                return TrackerOutcome::Shutdown;
            }

            let state = shared.lock();
            if !state.stop_requested {
                let _ = shared.changed.wait_timeout(state, poll_interval);
            }
        }
    }

    fn report_error(&mut self, err: &io::Error) {
        if self.error_reported {
            trace!(component = "tracker", operation = "poll", error = %err, "Log read failed");
        } else {
            warn!(
                component = "tracker",
                operation = "poll",
                path = %self.path.display(),
                error = %err,
                "Cannot read solve log"
            );
            self.error_reported = true;
        }
    }

    /// Read newly appended bytes. Returns `true` once the report header is seen.
    fn poll(&mut self, monitor: &SolveMonitor) -> io::Result<bool> {
        if self.file.is_none() {
            match File::open(&self.path) {
                Ok(file) => self.file = Some(file),
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
                Err(err) => return Err(err),
            }
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(false);
        };

        let len = file.metadata()?.len();
        if len < self.offset {
            debug!(
                component = "tracker",
                operation = "poll",
                previous = self.offset,
                len,
                "Log file truncated, restarting from the beginning"
            );
            self.offset = 0;
            self.pending.clear();
        }
        if len == self.offset {
            return Ok(false);
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut chunk = Vec::new();
        let read = file.by_ref().take(len - self.offset).read_to_end(&mut chunk)?;
        self.offset += read as u64;
        self.pending.extend_from_slice(&chunk);

        let mut start = 0;
        while let Some(newline) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + newline;
            let completed = self.ingest(start, end, monitor);
            start = end + 1;
            if completed {
                self.pending.drain(..start);
                return Ok(true);
            }
        }
        self.pending.drain(..start);
        Ok(false)
    }

    /// Treat a trailing unterminated line as complete.
    fn flush_pending(&mut self, monitor: &SolveMonitor) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let end = self.pending.len();
        let completed = self.ingest(0, end, monitor);
        self.pending.clear();
        completed
    }

    fn ingest(&mut self, start: usize, end: usize, monitor: &SolveMonitor) -> bool {
        let bytes = &self.pending[start..end];
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        let line = String::from_utf8_lossy(bytes);
        let (phase, event) = self.phase.advance(&line);
        self.phase = phase;
        match event {
            Some(LineEvent::Progress(progress)) => {
                trace!(
                    component = "tracker",
                    operation = "ingest",
                    lp_iterations = progress.lp_iteration_count,
                    gap = progress.relative_gap,
                    "Progress row"
                );
                monitor.publish_progress(&progress);
                false
            }
            Some(LineEvent::Completed) => true,
            None => false,
        }
    }
}
