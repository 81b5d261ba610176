//! Engine abstraction used by the solve controller.

use crate::model::{FlatModel, SparseMatrix};
use crate::{EngineError, OptionValue};
use serde::Serialize;
use std::path::Path;

/// Output layout used when writing a solution file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolutionStyle {
    /// Machine-readable layout.
    #[default]
    Raw,
    /// Human-readable layout.
    Pretty,
}

/// Primal and dual values as reported by the engine, plus validity flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSolution {
    pub value_valid: bool,
    pub dual_valid: bool,
    pub col_value: Vec<f64>,
    pub col_dual: Vec<f64>,
    pub row_value: Vec<f64>,
    pub row_dual: Vec<f64>,
}

/// Candidate values pushed into the engine before a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialSolution {
    /// One value per column.
    pub col_value: Vec<f64>,
    /// One dual value per row, if known.
    pub row_dual: Option<Vec<f64>>,
}

/// Engine verdict on the current primal candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimalAssessment {
    pub valid: bool,
    pub integral: bool,
    pub feasible: bool,
}

/// Information values reported by the engine after a run.
///
/// Values the engine cannot provide keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverInfo {
    pub basis_validity: i32,
    pub simplex_iteration_count: i32,
    pub ipm_iteration_count: i32,
    pub crossover_iteration_count: i32,
    pub qp_iteration_count: i32,
    pub primal_solution_status: i32,
    pub dual_solution_status: i32,
    pub objective_function_value: f64,
    /// `-1` when no branch-and-bound ran.
    pub mip_node_count: i64,
    pub mip_dual_bound: f64,
    pub mip_gap: f64,
    pub num_primal_infeasibilities: i32,
    pub max_primal_infeasibility: f64,
    pub sum_primal_infeasibilities: f64,
    pub num_dual_infeasibilities: i32,
    pub max_dual_infeasibility: f64,
    pub sum_dual_infeasibilities: f64,
}

impl Default for SolverInfo {
    fn default() -> Self {
        Self {
            basis_validity: 0,
            simplex_iteration_count: 0,
            ipm_iteration_count: 0,
            crossover_iteration_count: 0,
            qp_iteration_count: 0,
            primal_solution_status: 0,
            dual_solution_status: 0,
            objective_function_value: 0.0,
            mip_node_count: -1,
            mip_dual_bound: 0.0,
            mip_gap: f64::INFINITY,
            num_primal_infeasibilities: 0,
            max_primal_infeasibility: 0.0,
            sum_primal_infeasibilities: 0.0,
            num_dual_infeasibilities: 0,
            max_dual_infeasibility: 0.0,
            sum_dual_infeasibilities: 0.0,
        }
    }
}

/// Operations the controller needs from an optimization engine.
///
/// Implementations own the native handle; the controller serializes every
/// call, so implementations only need to be `Send`.
pub trait Engine: Send {
    /// Engine version string.
    fn version(&self) -> String;

    fn set_option(&mut self, name: &str, value: &OptionValue) -> Result<(), EngineError>;

    /// Current value of an option. Unknown names are an error.
    fn get_option(&self, name: &str) -> Result<OptionValue, EngineError>;

    /// Replace the loaded model.
    fn pass_model(&mut self, model: &FlatModel) -> Result<(), EngineError>;

    fn read_model(&mut self, path: &Path) -> Result<(), EngineError>;

    fn write_model(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Append rows. `matrix` is row-wise with one offset per new row.
    fn add_rows(
        &mut self,
        lower: &[f64],
        upper: &[f64],
        matrix: &SparseMatrix,
    ) -> Result<(), EngineError>;

    fn change_objective_sense(&mut self, is_maximization: bool) -> Result<(), EngineError>;

    fn change_objective_offset(&mut self, offset: f64) -> Result<(), EngineError>;

    /// Replace every column's linear cost.
    fn change_cols_cost(&mut self, costs: &[f64]) -> Result<(), EngineError>;

    /// Run the solver to completion.
    fn run(&mut self) -> Result<(), EngineError>;

    /// Raw model status code of the last run.
    fn model_status(&self) -> i32;

    fn info(&self) -> SolverInfo;

    fn solution(&self) -> Result<EngineSolution, EngineError>;

    fn set_solution(&mut self, solution: &PartialSolution) -> Result<(), EngineError>;

    /// Check the current primal candidate against bounds, rows and integrality.
    fn assess_primal_solution(&self) -> Result<PrimalAssessment, EngineError>;

    fn write_solution(&self, path: &Path, style: SolutionStyle) -> Result<(), EngineError>;

    fn zero_all_clocks(&mut self);

    /// Seconds spent in the last run.
    fn run_time(&self) -> f64;

    /// Drop model, solution and options.
    fn clear(&mut self) -> Result<(), EngineError>;

    fn clear_model(&mut self) -> Result<(), EngineError>;

    /// Drop solution and basis, keeping the model.
    fn clear_solver(&mut self) -> Result<(), EngineError>;
}
