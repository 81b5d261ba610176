//! Progress monitoring for running solves.
//!
//! The engine writes a text log while it runs. [`SolveTracker`] tails that
//! log on a background thread, turns iteration rows into [`SolveProgress`]
//! values with the [`parser`], and publishes them through a [`SolveMonitor`].

mod monitor;
pub mod parser;
mod tracker;

pub use monitor::{SolveEvent, SolveMonitor};
pub use parser::{LineEvent, ParsePhase, SolveProgress, parse_number, parse_progress};
pub use tracker::{DEFAULT_POLL_INTERVAL, SolveTracker, TrackerOptions, TrackerOutcome};
