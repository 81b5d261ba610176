//! Status conversions for the HiGHS C API.

use highs_sys::HighsInt;
use mipdrive_solver::{EngineError, SolverStatus};
use tracing::warn;

/// Map a raw HiGHS return status to a result. Warnings count as failures.
pub(crate) fn check_call(
    status: HighsInt,
    method: &str,
    detail: impl FnOnce() -> String,
) -> Result<(), EngineError> {
    if status == highs_sys::STATUS_OK {
        Ok(())
    } else {
        Err(EngineError::new(format!(
            "{method} returned {}: {}",
            return_status_str(status),
            detail()
        )))
    }
}

pub(crate) fn return_status_str(status: HighsInt) -> &'static str {
    match status {
        s if s == highs_sys::STATUS_OK => "ok",
        s if s == highs_sys::STATUS_WARNING => "warning",
        s if s == highs_sys::STATUS_ERROR => "error",
        _ => "unknown status",
    }
}

/// Map a raw model status code, falling back to `Unknown` for codes this
/// crate does not know about.
pub(crate) fn model_status_from_code(code: i32) -> SolverStatus {
    SolverStatus::from_code(code).unwrap_or_else(|| {
        warn!(
            component = "solver",
            operation = "status",
            status_code = code,
            "Unrecognized model status code"
        );
        SolverStatus::Unknown
    })
}
