//! Solver error types.

use crate::SolverStatus;

/// Failure reported by the underlying engine for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

/// Structural problem with a model or row batch, detected before the engine
/// is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A per-variable array does not have `width` entries.
    InconsistentWidth {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A per-row array does not have `height` entries.
    InconsistentHeight {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Sparse indices and values have different lengths.
    UnbalancedSparseRow { indices: usize, values: usize },
    /// Sparse offsets decrease or point past the non-zero count.
    InvalidOffsets { field: &'static str, position: usize },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InconsistentWidth {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{field} has {actual} entries but the model has {expected} columns"
            ),
            ModelError::InconsistentHeight {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{field} has {actual} entries but the model has {expected} rows"
            ),
            ModelError::UnbalancedSparseRow { indices, values } => write!(
                f,
                "sparse row has {indices} indices but {values} values"
            ),
            ModelError::InvalidOffsets { field, position } => {
                write!(f, "{field} offsets are invalid at position {position}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Broad class of a [`SolverError`], for callers that branch on kind rather
/// than on the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller-supplied data was malformed.
    InvalidInput,
    /// The controller was used while a solve was running.
    UsageMisuse,
    /// The engine refused a call.
    EngineRejection,
    /// The solve ran but did not reach an acceptable status.
    SemanticOutcome,
    /// A warm start was rejected by assessment.
    WarmStart,
    /// Filesystem or other environment failure.
    Environment,
}

/// Error type for solver operations.
#[derive(Debug)]
pub enum SolverError {
    /// Model or row batch failed validation.
    InvalidModel(ModelError),
    /// Another solve is in progress on this controller.
    SolveInProgress,
    /// An engine call failed.
    NativeMethodFailed {
        method: &'static str,
        cause: EngineError,
    },
    /// The solve ended in a status that is not a completed outcome.
    SolveFailed {
        status: SolverStatus,
        cause: Option<Box<SolverError>>,
    },
    /// The solve completed without reaching optimality.
    SolveNonOptimal {
        status: SolverStatus,
        cause: Option<Box<SolverError>>,
    },
    /// Warm start values were rejected by the engine's assessment.
    InvalidWarmStart,
    /// An option exists but holds a value of a different type.
    OptionType {
        name: String,
        expected: &'static str,
    },
    /// A log or scratch file could not be created, read or written.
    Io {
        path: String,
        source: std::io::Error,
    },
    /// No valid primal solution is available.
    SolutionUnavailable,
}

impl SolverError {
    /// Wraps an engine failure with the name of the failing method.
    pub fn native(method: &'static str, cause: EngineError) -> Self {
        SolverError::NativeMethodFailed { method, cause }
    }

    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::InvalidModel(ModelError::UnbalancedSparseRow { .. }) => {
                "HIGHS_UNBALANCED_SPARSE_ROW"
            }
            SolverError::InvalidModel(ModelError::InconsistentWidth { .. }) => {
                "HIGHS_INCONSISTENT_WIDTH"
            }
            SolverError::InvalidModel(ModelError::InconsistentHeight { .. }) => {
                "HIGHS_INCONSISTENT_HEIGHT"
            }
            SolverError::InvalidModel(ModelError::InvalidOffsets { .. }) => {
                "HIGHS_INVALID_OFFSETS"
            }
            SolverError::SolveInProgress => "HIGHS_SOLVE_IN_PROGRESS",
            SolverError::NativeMethodFailed { .. } => "HIGHS_NATIVE_METHOD_FAILED",
            SolverError::SolveFailed { .. } => "HIGHS_SOLVE_FAILED",
            SolverError::SolveNonOptimal { .. } => "HIGHS_SOLVE_NON_OPTIMAL",
            SolverError::InvalidWarmStart => "HIGHS_INVALID_WARM_START",
            SolverError::OptionType { .. } => "HIGHS_OPTION_TYPE",
            SolverError::Io { .. } => "HIGHS_IO",
            SolverError::SolutionUnavailable => "HIGHS_SOLUTION_UNAVAILABLE",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SolverError::InvalidModel(_) | SolverError::OptionType { .. } => {
                ErrorCategory::InvalidInput
            }
            SolverError::SolveInProgress => ErrorCategory::UsageMisuse,
            SolverError::NativeMethodFailed { .. } => ErrorCategory::EngineRejection,
            SolverError::SolveFailed { .. }
            | SolverError::SolveNonOptimal { .. }
            | SolverError::SolutionUnavailable => ErrorCategory::SemanticOutcome,
            SolverError::InvalidWarmStart => ErrorCategory::WarmStart,
            SolverError::Io { .. } => ErrorCategory::Environment,
        }
    }

    /// Terminal status carried by solve outcome errors.
    pub fn status(&self) -> Option<SolverStatus> {
        match self {
            SolverError::SolveFailed { status, .. }
            | SolverError::SolveNonOptimal { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.code();
        match self {
            SolverError::InvalidModel(err) => write!(f, "[{code}] Invalid model: {err}"),
            SolverError::SolveInProgress => {
                write!(f, "[{code}] A solve is already in progress")
            }
            SolverError::NativeMethodFailed { method, cause } => {
                write!(f, "[{code}] Engine method {method} failed: {cause}")
            }
            SolverError::SolveFailed { status, .. } => {
                write!(f, "[{code}] Solve failed with status {status}")
            }
            SolverError::SolveNonOptimal { status, .. } => {
                write!(f, "[{code}] Solve ended with non-optimal status {status}")
            }
            SolverError::InvalidWarmStart => {
                write!(f, "[{code}] Warm start solution is not valid")
            }
            SolverError::OptionType { name, expected } => {
                write!(f, "[{code}] Option {name} is not a {expected} option")
            }
            SolverError::Io { path, source } => {
                write!(f, "[{code}] File operation on {path} failed: {source}")
            }
            SolverError::SolutionUnavailable => {
                write!(f, "[{code}] No valid solution is available")
            }
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::InvalidModel(err) => Some(err),
            SolverError::NativeMethodFailed { cause, .. } => Some(cause),
            SolverError::SolveFailed { cause, .. } | SolverError::SolveNonOptimal { cause, .. } => {
                cause
                    .as_deref()
                    .map(|err| err as &(dyn std::error::Error + 'static))
            }
            SolverError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ModelError> for SolverError {
    fn from(err: ModelError) -> Self {
        SolverError::InvalidModel(err)
    }
}

/// Result alias used throughout the workspace.
pub type SolverResult<T> = Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display_native_method_failed() {
        let err = SolverError::native("set_option", EngineError::new("unknown option foo"));
        let msg = format!("{}", err);
        assert!(msg.starts_with("[HIGHS_NATIVE_METHOD_FAILED]"));
        assert!(msg.contains("set_option"));
        assert!(msg.contains("unknown option foo"));
    }

    #[test]
    fn test_native_method_failed_exposes_cause() {
        let err = SolverError::native("run", EngineError::new("boom"));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("boom"));
    }

    #[test]
    fn test_solve_failed_chains_run_error() {
        let err = SolverError::SolveFailed {
            status: SolverStatus::SolveError,
            cause: Some(Box::new(SolverError::native(
                "run",
                EngineError::new("run returned error"),
            ))),
        };
        assert_eq!(err.status(), Some(SolverStatus::SolveError));
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("HIGHS_NATIVE_METHOD_FAILED"));
        assert!(format!("{err}").contains("solve_error"));
    }

    #[test]
    fn test_solve_non_optimal_without_cause() {
        let err = SolverError::SolveNonOptimal {
            status: SolverStatus::Unbounded,
            cause: None,
        };
        assert!(err.source().is_none());
        assert_eq!(err.code(), "HIGHS_SOLVE_NON_OPTIMAL");
        assert!(format!("{err}").contains("unbounded"));
    }

    #[test]
    fn test_model_error_codes() {
        let unbalanced = SolverError::from(ModelError::UnbalancedSparseRow {
            indices: 2,
            values: 3,
        });
        assert_eq!(unbalanced.code(), "HIGHS_UNBALANCED_SPARSE_ROW");
        assert!(format!("{unbalanced}").contains("2 indices but 3 values"));

        let width = SolverError::from(ModelError::InconsistentWidth {
            field: "column_lower_bounds",
            expected: 2,
            actual: 1,
        });
        assert_eq!(width.code(), "HIGHS_INCONSISTENT_WIDTH");
        assert!(format!("{width}").contains("column_lower_bounds"));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            SolverError::SolveInProgress.category(),
            ErrorCategory::UsageMisuse
        );
        assert_eq!(
            SolverError::InvalidWarmStart.category(),
            ErrorCategory::WarmStart
        );
        assert_eq!(
            SolverError::native("clear", EngineError::new("x")).category(),
            ErrorCategory::EngineRejection
        );
        assert_eq!(
            SolverError::from(ModelError::InvalidOffsets {
                field: "weights",
                position: 1
            })
            .category(),
            ErrorCategory::InvalidInput
        );
        assert_eq!(
            SolverError::Io {
                path: "/nope".into(),
                source: std::io::Error::other("denied"),
            }
            .category(),
            ErrorCategory::Environment
        );
        assert_eq!(
            SolverError::SolveFailed {
                status: SolverStatus::ModelEmpty,
                cause: None
            }
            .category(),
            ErrorCategory::SemanticOutcome
        );
    }
}
