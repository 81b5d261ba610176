//! Engine-agnostic vocabulary for driving a MIP/LP engine.
//!
//! This crate holds the types shared by the engine binding and the solve
//! controller (`mipdrive-highs`).
//!
//! # Overview
//!
//! - [`SolverStatus`]: Terminal model status codes
//! - [`SolverOptions`]: Options forwarded to the engine
//! - [`SolverError`]: Error taxonomy for controller operations
//! - [`Engine`]: Trait implemented by engine bindings
//! - [`SolverModel`]: Model records and their flat engine layout

mod config;
mod error;
pub mod model;
mod status;
mod traits;

pub use config::{Algorithm, OptionValue, SolverOptions, Toggle, integral_i32};
pub use error::{EngineError, ErrorCategory, ModelError, SolverError, SolverResult};
pub use model::{ColumnType, FlatModel, SolverModel, SparseMatrix, SparseRow};
pub use status::SolverStatus;
pub use traits::{
    Engine, EngineSolution, PartialSolution, PrimalAssessment, SolutionStyle, SolverInfo,
};
