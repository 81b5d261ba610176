//! One-shot solving without managing a controller.

use crate::solution::SolverSolution;
use crate::solver::{SolveOptions, Solver, SolverCreationOptions};
use mipdrive_monitor::SolveMonitor;
use mipdrive_solver::{SolutionStyle, SolverError, SolverModel, SolverOptions, SolverResult};
use std::path::PathBuf;
use tracing::debug;

/// Model handed to [`solve`].
#[derive(Debug, Clone)]
pub enum ModelInput {
    Inline(SolverModel),
    /// Any format the engine reads, selected by extension.
    File(PathBuf),
}

impl From<SolverModel> for ModelInput {
    fn from(model: SolverModel) -> Self {
        ModelInput::Inline(model)
    }
}

impl From<PathBuf> for ModelInput {
    fn from(path: PathBuf) -> Self {
        ModelInput::File(path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuickSolveOptions {
    pub options: SolverOptions,
    pub monitor: Option<SolveMonitor>,
    pub allow_non_optimal: bool,
}

impl QuickSolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_monitor(mut self, monitor: SolveMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_allow_non_optimal(mut self, allow: bool) -> Self {
        self.allow_non_optimal = allow;
        self
    }
}

fn solved(model: &ModelInput, options: &QuickSolveOptions) -> SolverResult<Solver> {
    let solver = Solver::create(
        SolverCreationOptions::new().with_options(options.options.clone()),
    )?;
    match model {
        ModelInput::Inline(model) => solver.set_model(model)?,
        ModelInput::File(path) => solver.set_model_from_file(path)?,
    }
    let mut solve_options = SolveOptions::new().with_allow_non_optimal(options.allow_non_optimal);
    solve_options.monitor = options.monitor.clone();
    solver.solve(&solve_options)?;
    Ok(solver)
}

/// Create a solver, load `model`, solve it and return the solution.
pub fn solve(model: &ModelInput, options: &QuickSolveOptions) -> SolverResult<SolverSolution> {
    let solver = solved(model, options)?;
    let solution = solver.solution()?.ok_or(SolverError::SolutionUnavailable)?;
    debug!(
        component = "quick",
        operation = "solve",
        status = "success",
        objective = solution.objective_value,
        "Solved model"
    );
    Ok(solution)
}

/// Like [`solve`], but returns the solution as written by the engine in
/// `style`.
pub fn solve_styled(
    model: &ModelInput,
    options: &QuickSolveOptions,
    style: SolutionStyle,
) -> SolverResult<String> {
    let solver = solved(model, options)?;
    let scratch = tempfile::Builder::new()
        .prefix("mipdrive-")
        .suffix(".sol")
        .tempfile()
        .map_err(|source| SolverError::Io {
            path: std::env::temp_dir().display().to_string(),
            source,
        })?;
    solver.write_solution(scratch.path(), Some(style))?;
    let contents =
        std::fs::read_to_string(scratch.path()).map_err(|source| SolverError::Io {
            path: scratch.path().display().to_string(),
            source,
        })?;
    debug!(
        component = "quick",
        operation = "solve_styled",
        status = "success",
        ?style,
        bytes = contents.len(),
        "Solved model"
    );
    Ok(contents)
}
