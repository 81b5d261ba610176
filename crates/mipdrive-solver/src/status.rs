//! Solver status types.

use serde::Serialize;

/// Terminal model status reported by the engine after a run.
///
/// Discriminants match the engine's integer model status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum SolverStatus {
    /// No run has completed since the model was loaded or cleared.
    #[default]
    NotSet = 0,
    LoadError = 1,
    ModelError = 2,
    PresolveError = 3,
    SolveError = 4,
    PostsolveError = 5,
    /// Model has no columns and no rows.
    ModelEmpty = 6,
    Optimal = 7,
    Infeasible = 8,
    UnboundedOrInfeasible = 9,
    Unbounded = 10,
    /// Objective bound option was reached.
    ObjectiveBound = 11,
    /// Objective target option was reached.
    ObjectiveTarget = 12,
    TimeLimit = 13,
    IterationLimit = 14,
    Unknown = 15,
    /// MIP solution count limit was reached.
    SolutionLimit = 16,
}

impl SolverStatus {
    /// Every status, in code order.
    pub const ALL: [SolverStatus; 17] = [
        SolverStatus::NotSet,
        SolverStatus::LoadError,
        SolverStatus::ModelError,
        SolverStatus::PresolveError,
        SolverStatus::SolveError,
        SolverStatus::PostsolveError,
        SolverStatus::ModelEmpty,
        SolverStatus::Optimal,
        SolverStatus::Infeasible,
        SolverStatus::UnboundedOrInfeasible,
        SolverStatus::Unbounded,
        SolverStatus::ObjectiveBound,
        SolverStatus::ObjectiveTarget,
        SolverStatus::TimeLimit,
        SolverStatus::IterationLimit,
        SolverStatus::Unknown,
        SolverStatus::SolutionLimit,
    ];

    /// Map an engine status code to a status, if the code is known.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// The engine's integer code for this status.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// Check if the engine finished the run without an internal failure.
    ///
    /// Non-optimal outcomes such as infeasibility or a reached limit count as
    /// completed; load/model/presolve/solve/postsolve errors, an empty model,
    /// `NotSet` and `Unknown` do not.
    pub fn is_completed(self) -> bool {
        matches!(
            self,
            SolverStatus::Optimal
                | SolverStatus::Infeasible
                | SolverStatus::UnboundedOrInfeasible
                | SolverStatus::Unbounded
                | SolverStatus::ObjectiveBound
                | SolverStatus::ObjectiveTarget
                | SolverStatus::TimeLimit
                | SolverStatus::IterationLimit
                | SolverStatus::SolutionLimit
        )
    }

    /// Check if the status is one of the limit-reached outcomes.
    pub fn is_limit(self) -> bool {
        matches!(
            self,
            SolverStatus::ObjectiveBound
                | SolverStatus::ObjectiveTarget
                | SolverStatus::TimeLimit
                | SolverStatus::IterationLimit
                | SolverStatus::SolutionLimit
        )
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::NotSet => "not_set",
            SolverStatus::LoadError => "load_error",
            SolverStatus::ModelError => "model_error",
            SolverStatus::PresolveError => "presolve_error",
            SolverStatus::SolveError => "solve_error",
            SolverStatus::PostsolveError => "postsolve_error",
            SolverStatus::ModelEmpty => "model_empty",
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::UnboundedOrInfeasible => "unbounded_or_infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::ObjectiveBound => "objective_bound",
            SolverStatus::ObjectiveTarget => "objective_target",
            SolverStatus::TimeLimit => "time_limit",
            SolverStatus::IterationLimit => "iteration_limit",
            SolverStatus::Unknown => "unknown",
            SolverStatus::SolutionLimit => "solution_limit",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
