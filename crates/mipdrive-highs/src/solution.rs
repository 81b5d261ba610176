//! Solution type returned by the controller.

use mipdrive_solver::{EngineSolution, SolverInfo};
use serde::Serialize;

/// Row and column values of one side (primal or dual) of a solution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolutionValues {
    pub rows: Vec<f64>,
    pub columns: Vec<f64>,
}

/// Solution of the last solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverSolution {
    pub objective_value: f64,
    /// Relative MIP gap, only present when branch-and-bound ran.
    pub relative_gap: Option<f64>,
    pub primal: SolutionValues,
    /// Dual values, only present when the engine reports them as valid.
    pub dual: Option<SolutionValues>,
}

impl SolverSolution {
    /// Build a solution from engine values. Returns `None` when the primal
    /// values are not valid.
    pub(crate) fn from_engine(solution: EngineSolution, info: &SolverInfo) -> Option<Self> {
        if !solution.value_valid {
            return None;
        }
        let dual = solution.dual_valid.then(|| SolutionValues {
            rows: solution.row_dual,
            columns: solution.col_dual,
        });
        Some(Self {
            objective_value: info.objective_function_value,
            relative_gap: (info.mip_node_count >= 0).then_some(info.mip_gap),
            primal: SolutionValues {
                rows: solution.row_value,
                columns: solution.col_value,
            },
            dual,
        })
    }

    /// Get the primal value of the column at the given index
    pub fn column(&self, index: usize) -> Option<f64> {
        self.primal.columns.get(index).copied()
    }

    /// Get the primal value (activity) of the row at the given index
    pub fn row(&self, index: usize) -> Option<f64> {
        self.primal.rows.get(index).copied()
    }

    /// Get the reduced cost of the column at the given index
    pub fn column_dual(&self, index: usize) -> Option<f64> {
        self.dual.as_ref()?.columns.get(index).copied()
    }

    /// Get the shadow price of the row at the given index
    pub fn row_dual(&self, index: usize) -> Option<f64> {
        self.dual.as_ref()?.rows.get(index).copied()
    }
}
