//! Solve controller for the HiGHS engine.
//!
//! [`Solver`] loads models, manages options and warm starts, and runs one
//! solve at a time. Progress parsed from the engine log is published through
//! a [`SolveMonitor`] while the solve runs.

pub mod ffi;
pub mod logging;
pub mod quick;
pub mod solution;
pub mod solver;
mod status;

pub use ffi::{HighsEngine, highs_version};
pub use logging::{LogFormat, LoggingConfig, LoggingError, enable_logging};
pub use quick::{ModelInput, QuickSolveOptions, solve, solve_styled};
pub use solution::{SolutionValues, SolverSolution};
pub use solver::{
    ObjectiveUpdate, RowBatch, SolveOptions, Solver, SolverCreationOptions, SolverPhase,
    WarmStart,
};

pub use mipdrive_monitor::{SolveEvent, SolveMonitor, SolveProgress};
pub use mipdrive_solver::{
    Algorithm, ColumnType, Engine, ErrorCategory, OptionValue, SolutionStyle, SolverError,
    SolverInfo, SolverModel, SolverOptions, SolverResult, SolverStatus, SparseMatrix, SparseRow,
    Toggle,
};
