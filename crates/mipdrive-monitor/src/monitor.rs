//! Publish/subscribe channel for solve progress.

use crate::parser::SolveProgress;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};

type ProgressListener = Arc<dyn Fn(&SolveProgress) + Send + Sync>;
type DoneListener = Arc<dyn Fn() + Send + Sync>;

/// Event delivered to channel subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveEvent {
    Progress(SolveProgress),
    Done,
}

#[derive(Default)]
struct Listeners {
    progress: Vec<ProgressListener>,
    done: Vec<DoneListener>,
    channels: Vec<mpsc::Sender<SolveEvent>>,
}

/// Cloneable handle through which a tracker reports progress.
///
/// Clones share listeners. Listeners run on the publishing thread, in
/// registration order, and must not block for long.
#[derive(Clone, Default)]
pub struct SolveMonitor {
    listeners: Arc<Mutex<Listeners>>,
}

impl SolveMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register a progress listener.
    pub fn on_progress<F>(&self, listener: F) -> &Self
    where
        F: Fn(&SolveProgress) + Send + Sync + 'static,
    {
        self.lock().progress.push(Arc::new(listener));
        self
    }

    /// Register a completion listener.
    pub fn on_done<F>(&self, listener: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lock().done.push(Arc::new(listener));
        self
    }

    /// Receive every subsequent event on a channel.
    pub fn subscribe(&self) -> mpsc::Receiver<SolveEvent> {
        let (sender, receiver) = mpsc::channel();
        self.lock().channels.push(sender);
        receiver
    }

    pub fn publish_progress(&self, progress: &SolveProgress) {
        let listeners = {
            let mut guard = self.lock();
            guard
                .channels
                .retain(|sender| sender.send(SolveEvent::Progress(*progress)).is_ok());
            guard.progress.clone()
        };
        for listener in listeners {
            listener(progress);
        }
    }

    pub fn publish_done(&self) {
        let listeners = {
            let mut guard = self.lock();
            guard
                .channels
                .retain(|sender| sender.send(SolveEvent::Done).is_ok());
            guard.done.clone()
        };
        for listener in listeners {
            listener();
        }
    }

    /// Number of registered listeners and live channels.
    pub fn listener_count(&self) -> usize {
        let guard = self.lock();
        guard.progress.len() + guard.done.len() + guard.channels.len()
    }
}

impl std::fmt::Debug for SolveMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveMonitor")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
