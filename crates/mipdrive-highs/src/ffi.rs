//! FFI bindings to the HiGHS solver library.
//!
//! This module contains unsafe code for interacting with the C library.
#![allow(unsafe_code)]

use crate::status::check_call;
use highs_sys::HighsInt;
use mipdrive_solver::model::{FlatModel, SparseMatrix};
use mipdrive_solver::{
    Engine, EngineError, EngineSolution, OptionValue, PartialSolution, PrimalAssessment,
    SolutionStyle, SolverInfo,
};
use std::ffi::{CStr, CString, c_char, c_void};
use std::fmt;
use std::path::Path;
use tracing::{debug, trace};

const MATRIX_FORMAT_COLUMN_WISE: HighsInt = 1;
const MATRIX_FORMAT_ROW_WISE: HighsInt = 2;
const HESSIAN_FORMAT_TRIANGULAR: HighsInt = 1;
const OBJECTIVE_SENSE_MINIMIZE: HighsInt = 1;
const OBJECTIVE_SENSE_MAXIMIZE: HighsInt = -1;

const OPTION_TYPE_BOOL: HighsInt = 0;
const OPTION_TYPE_INT: HighsInt = 1;
const OPTION_TYPE_DOUBLE: HighsInt = 2;
const OPTION_TYPE_STRING: HighsInt = 3;

/// Size of the buffer receiving string option values.
const STRING_OPTION_CAPACITY: usize = 1024;

/// Integrality codes that require integral values.
const INTEGRAL_CODES: [HighsInt; 3] = [1, 3, 4];
const SEMI_CODES: [HighsInt; 2] = [2, 3];

/// Owned HiGHS instance.
pub struct HighsEngine {
    ptr: *mut c_void,
    /// Whether the current primal values were pushed through `set_solution`.
    candidate_pushed: bool,
}

// SAFETY: the instance is only reached through `&mut self`/`&self` and HiGHS
// does not tie an instance to the thread that created it.
unsafe impl Send for HighsEngine {}

impl HighsEngine {
    /// Create a new HiGHS instance.
    pub fn new() -> Result<Self, EngineError> {
        let ptr = unsafe { highs_sys::Highs_create() };
        if ptr.is_null() {
            return Err(EngineError::new("Highs_create returned a null instance"));
        }
        debug!(
            component = "solver",
            operation = "init_highs",
            status = "success",
            "Created HiGHS instance"
        );
        Ok(Self {
            ptr,
            candidate_pushed: false,
        })
    }

    pub fn num_col(&self) -> usize {
        to_len(unsafe { highs_sys::Highs_getNumCol(self.ptr) })
    }

    pub fn num_row(&self) -> usize {
        to_len(unsafe { highs_sys::Highs_getNumRow(self.ptr) })
    }

    pub fn num_nz(&self) -> usize {
        to_len(unsafe { highs_sys::Highs_getNumNz(self.ptr) })
    }

    fn option_type(&self, name: &CStr) -> Result<HighsInt, EngineError> {
        let mut kind: HighsInt = -1;
        let status =
            unsafe { highs_sys::Highs_getOptionType(self.ptr, name.as_ptr(), &raw mut kind) };
        check_call(status, "Highs_getOptionType", || {
            format!("unknown option {:?}", name)
        })?;
        Ok(kind)
    }

    fn double_option(&self, name: &str) -> Option<f64> {
        match self.get_option(name) {
            Ok(value) => value.as_f64(),
            Err(_) => None,
        }
    }

    fn info_int(&self, name: &str, target: &mut i32) {
        let Ok(c_name) = CString::new(name) else {
            return;
        };
        let mut value: HighsInt = 0;
        let status =
            unsafe { highs_sys::Highs_getIntInfoValue(self.ptr, c_name.as_ptr(), &raw mut value) };
        if status == highs_sys::STATUS_OK {
            *target = value;
        } else {
            trace!(component = "solver", operation = "info", info = name, "Info value unavailable");
        }
    }

    fn info_int64(&self, name: &str, target: &mut i64) {
        let Ok(c_name) = CString::new(name) else {
            return;
        };
        let mut value: i64 = 0;
        let status = unsafe {
            highs_sys::Highs_getInt64InfoValue(self.ptr, c_name.as_ptr(), &raw mut value)
        };
        if status == highs_sys::STATUS_OK {
            *target = value;
        } else {
            trace!(component = "solver", operation = "info", info = name, "Info value unavailable");
        }
    }

    fn info_double(&self, name: &str, target: &mut f64) {
        let Ok(c_name) = CString::new(name) else {
            return;
        };
        let mut value: f64 = 0.0;
        let status = unsafe {
            highs_sys::Highs_getDoubleInfoValue(self.ptr, c_name.as_ptr(), &raw mut value)
        };
        if status == highs_sys::STATUS_OK {
            *target = value;
        } else {
            trace!(component = "solver", operation = "info", info = name, "Info value unavailable");
        }
    }

    /// Column-wise copy of the loaded LP.
    fn lp(&self) -> Result<LpSnapshot, EngineError> {
        let num_col = self.num_col();
        let num_row = self.num_row();
        let num_nz = self.num_nz();

        let mut lp = LpSnapshot {
            col_lower: vec![0.0; num_col],
            col_upper: vec![0.0; num_col],
            row_lower: vec![0.0; num_row],
            row_upper: vec![0.0; num_row],
            a_start: vec![0; num_col],
            a_index: vec![0; num_nz],
            a_value: vec![0.0; num_nz],
            integrality: vec![0; num_col],
        };
        let mut col_cost = vec![0.0; num_col];
        let mut out_col: HighsInt = 0;
        let mut out_row: HighsInt = 0;
        let mut out_nz: HighsInt = 0;
        let mut sense: HighsInt = 0;
        let mut offset: f64 = 0.0;

        let status = unsafe {
            highs_sys::Highs_getLp(
                self.ptr,
                MATRIX_FORMAT_COLUMN_WISE,
                &raw mut out_col,
                &raw mut out_row,
                &raw mut out_nz,
                &raw mut sense,
                &raw mut offset,
                col_cost.as_mut_ptr(),
                lp.col_lower.as_mut_ptr(),
                lp.col_upper.as_mut_ptr(),
                lp.row_lower.as_mut_ptr(),
                lp.row_upper.as_mut_ptr(),
                lp.a_start.as_mut_ptr(),
                lp.a_index.as_mut_ptr(),
                lp.a_value.as_mut_ptr(),
                lp.integrality.as_mut_ptr(),
            )
        };
        check_call(status, "Highs_getLp", String::new)?;
        Ok(lp)
    }
}

struct LpSnapshot {
    col_lower: Vec<f64>,
    col_upper: Vec<f64>,
    row_lower: Vec<f64>,
    row_upper: Vec<f64>,
    a_start: Vec<HighsInt>,
    a_index: Vec<HighsInt>,
    a_value: Vec<f64>,
    integrality: Vec<HighsInt>,
}

impl LpSnapshot {
    fn row_activities(&self, col_value: &[f64]) -> Vec<f64> {
        let mut activities = vec![0.0; self.row_lower.len()];
        let num_nz = self.a_value.len();
        for (col, &value) in col_value.iter().enumerate() {
            let start = self.a_start.get(col).copied().map_or(num_nz, to_len);
            let end = self.a_start.get(col + 1).copied().map_or(num_nz, to_len);
            for ix in start..end.min(num_nz) {
                if let Some(activity) = activities.get_mut(to_len(self.a_index[ix])) {
                    *activity += self.a_value[ix] * value;
                }
            }
        }
        activities
    }

    fn is_mip(&self) -> bool {
        self.integrality.iter().any(|&kind| kind != 0)
    }

    /// Check bounds, rows and integrality. Models with any non-continuous
    /// column are checked against `mip_tolerance` throughout.
    fn assess(
        &self,
        col_value: &[f64],
        primal_tolerance: f64,
        mip_tolerance: f64,
    ) -> PrimalAssessment {
        if col_value.len() != self.col_lower.len() {
            return PrimalAssessment::default();
        }
        let tolerance = if self.is_mip() {
            mip_tolerance
        } else {
            primal_tolerance
        };

        let mut feasible = true;
        let mut integral = true;
        for (col, &value) in col_value.iter().enumerate() {
            let (lower, upper) = (self.col_lower[col], self.col_upper[col]);
            let kind = self.integrality[col];
            let in_bounds = value >= lower - tolerance && value <= upper + tolerance;
            let is_zero = value.abs() <= tolerance;
            if !(in_bounds || (SEMI_CODES.contains(&kind) && is_zero)) {
                feasible = false;
            }
            if INTEGRAL_CODES.contains(&kind) && (value - value.round()).abs() > mip_tolerance {
                integral = false;
            }
        }

        for (row, activity) in self.row_activities(col_value).into_iter().enumerate() {
            let (lower, upper) = (self.row_lower[row], self.row_upper[row]);
            if activity < lower - tolerance || activity > upper + tolerance {
                feasible = false;
            }
        }

        PrimalAssessment {
            valid: feasible && integral,
            integral,
            feasible,
        }
    }
}

impl Drop for HighsEngine {
    fn drop(&mut self) {
        unsafe { highs_sys::Highs_destroy(self.ptr) };
    }
}

impl fmt::Debug for HighsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighsEngine")
            .field("num_col", &self.num_col())
            .field("num_row", &self.num_row())
            .finish_non_exhaustive()
    }
}

impl Engine for HighsEngine {
    fn version(&self) -> String {
        highs_version().unwrap_or_else(|| "unknown".to_string())
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> Result<(), EngineError> {
        let c_name = c_string(name)?;
        let kind = self.option_type(&c_name)?;
        let mismatch = || {
            EngineError::new(format!(
                "option {name} does not accept {} value {value}",
                value.type_name()
            ))
        };

        let status = match (kind, value) {
            (OPTION_TYPE_BOOL, OptionValue::Bool(flag)) => unsafe {
                highs_sys::Highs_setBoolOptionValue(
                    self.ptr,
                    c_name.as_ptr(),
                    HighsInt::from(*flag),
                )
            },
            (OPTION_TYPE_INT, OptionValue::Int(_) | OptionValue::Float(_)) => {
                let number = value.as_i32().ok_or_else(mismatch)?;
                unsafe { highs_sys::Highs_setIntOptionValue(self.ptr, c_name.as_ptr(), number) }
            }
            (OPTION_TYPE_DOUBLE, OptionValue::Int(_) | OptionValue::Float(_)) => {
                let number = value.as_f64().ok_or_else(mismatch)?;
                unsafe { highs_sys::Highs_setDoubleOptionValue(self.ptr, c_name.as_ptr(), number) }
            }
            (OPTION_TYPE_STRING, OptionValue::Str(text)) => {
                let c_value = c_string(text)?;
                unsafe {
                    highs_sys::Highs_setStringOptionValue(self.ptr, c_name.as_ptr(), c_value.as_ptr())
                }
            }
            _ => return Err(mismatch()),
        };
        check_call(status, "Highs_setOptionValue", || format!("{name} = {value}"))?;
        trace!(
            component = "solver",
            operation = "set_option",
            status = "success",
            option = name,
            value = %value,
            "Set option"
        );
        Ok(())
    }

    fn get_option(&self, name: &str) -> Result<OptionValue, EngineError> {
        let c_name = c_string(name)?;
        let kind = self.option_type(&c_name)?;
        match kind {
            OPTION_TYPE_BOOL => {
                let mut value: HighsInt = 0;
                let status = unsafe {
                    highs_sys::Highs_getBoolOptionValue(self.ptr, c_name.as_ptr(), &raw mut value)
                };
                check_call(status, "Highs_getBoolOptionValue", || name.to_string())?;
                Ok(OptionValue::Bool(value != 0))
            }
            OPTION_TYPE_INT => {
                let mut value: HighsInt = 0;
                let status = unsafe {
                    highs_sys::Highs_getIntOptionValue(self.ptr, c_name.as_ptr(), &raw mut value)
                };
                check_call(status, "Highs_getIntOptionValue", || name.to_string())?;
                Ok(OptionValue::Int(value))
            }
            OPTION_TYPE_DOUBLE => {
                let mut value: f64 = 0.0;
                let status = unsafe {
                    highs_sys::Highs_getDoubleOptionValue(self.ptr, c_name.as_ptr(), &raw mut value)
                };
                check_call(status, "Highs_getDoubleOptionValue", || name.to_string())?;
                Ok(OptionValue::Float(value))
            }
            OPTION_TYPE_STRING => {
                let mut buffer: Vec<c_char> = vec![0; STRING_OPTION_CAPACITY];
                let status = unsafe {
                    highs_sys::Highs_getStringOptionValue(
                        self.ptr,
                        c_name.as_ptr(),
                        buffer.as_mut_ptr(),
                    )
                };
                check_call(status, "Highs_getStringOptionValue", || name.to_string())?;
                // The last byte stays zero, so the buffer is always terminated.
                let text = unsafe { CStr::from_ptr(buffer.as_ptr()) };
                Ok(OptionValue::Str(text.to_string_lossy().into_owned()))
            }
            other => Err(EngineError::new(format!(
                "option {name} has unsupported type {other}"
            ))),
        }
    }

    fn pass_model(&mut self, model: &FlatModel) -> Result<(), EngineError> {
        expect_len("col_cost", model.col_cost.len(), model.num_col)?;
        expect_len("col_lower", model.col_lower.len(), model.num_col)?;
        expect_len("col_upper", model.col_upper.len(), model.num_col)?;
        expect_len("row_lower", model.row_lower.len(), model.num_row)?;
        expect_len("row_upper", model.row_upper.len(), model.num_row)?;
        expect_len("a_start", model.a_start.len(), model.num_row)?;
        expect_len("a_value", model.a_value.len(), model.a_index.len())?;
        if let Some(integrality) = &model.integrality {
            expect_len("integrality", integrality.len(), model.num_col)?;
        }

        let num_col = to_highs_int(model.num_col)?;
        let num_row = to_highs_int(model.num_row)?;
        let num_nz = to_highs_int(model.a_value.len())?;
        let a_start = to_highs_ints(&model.a_start)?;
        let a_index = to_highs_ints(&model.a_index)?;
        let sense = if model.is_maximization {
            OBJECTIVE_SENSE_MAXIMIZE
        } else {
            OBJECTIVE_SENSE_MINIMIZE
        };

        let (q_num_nz, q_start, q_index, q_value) = match &model.hessian {
            Some(hessian) => {
                expect_len("q_start", hessian.offsets.len(), model.num_col)?;
                expect_len("q_value", hessian.values.len(), hessian.indices.len())?;
                (
                    to_highs_int(hessian.values.len())?,
                    to_highs_ints(&hessian.offsets)?,
                    to_highs_ints(&hessian.indices)?,
                    hessian.values.clone(),
                )
            }
            None => (0, Vec::new(), Vec::new(), Vec::new()),
        };
        let q_ptrs = if model.hessian.is_some() {
            (q_start.as_ptr(), q_index.as_ptr(), q_value.as_ptr())
        } else {
            (std::ptr::null(), std::ptr::null(), std::ptr::null())
        };
        let integrality = model.integrality.as_ref();
        let integrality_ptr = integrality.map_or(std::ptr::null(), |values| values.as_ptr());

        let status = unsafe {
            highs_sys::Highs_passModel(
                self.ptr,
                num_col,
                num_row,
                num_nz,
                q_num_nz,
                MATRIX_FORMAT_ROW_WISE,
                HESSIAN_FORMAT_TRIANGULAR,
                sense,
                model.offset,
                model.col_cost.as_ptr(),
                model.col_lower.as_ptr(),
                model.col_upper.as_ptr(),
                model.row_lower.as_ptr(),
                model.row_upper.as_ptr(),
                a_start.as_ptr(),
                a_index.as_ptr(),
                model.a_value.as_ptr(),
                q_ptrs.0,
                q_ptrs.1,
                q_ptrs.2,
                integrality_ptr,
            )
        };
        check_call(status, "Highs_passModel", || {
            format!("{} columns, {} rows", model.num_col, model.num_row)
        })?;
        self.candidate_pushed = false;
        debug!(
            component = "solver",
            operation = "pass_model",
            status = "success",
            num_cols = model.num_col,
            num_rows = model.num_row,
            num_nz,
            q_num_nz,
            "Passed model to HiGHS"
        );
        Ok(())
    }

    fn read_model(&mut self, path: &Path) -> Result<(), EngineError> {
        let c_path = c_path(path)?;
        let status = unsafe { highs_sys::Highs_readModel(self.ptr, c_path.as_ptr()) };
        check_call(status, "Highs_readModel", || path.display().to_string())?;
        self.candidate_pushed = false;
        Ok(())
    }

    fn write_model(&mut self, path: &Path) -> Result<(), EngineError> {
        let c_path = c_path(path)?;
        let status = unsafe { highs_sys::Highs_writeModel(self.ptr, c_path.as_ptr()) };
        check_call(status, "Highs_writeModel", || path.display().to_string())
    }

    fn add_rows(
        &mut self,
        lower: &[f64],
        upper: &[f64],
        matrix: &SparseMatrix,
    ) -> Result<(), EngineError> {
        let count = matrix.offsets.len();
        expect_len("lower", lower.len(), count)?;
        expect_len("upper", upper.len(), count)?;
        expect_len("values", matrix.values.len(), matrix.indices.len())?;
        let num_col = self.num_col();
        if let Some(&index) = matrix.indices.iter().find(|&&index| index >= num_col) {
            return Err(EngineError::new(format!(
                "column index {index} out of bounds (num_columns = {num_col})"
            )));
        }

        let starts = to_highs_ints(&matrix.offsets)?;
        let indices = to_highs_ints(&matrix.indices)?;
        let status = unsafe {
            highs_sys::Highs_addRows(
                self.ptr,
                to_highs_int(count)?,
                lower.as_ptr(),
                upper.as_ptr(),
                to_highs_int(matrix.values.len())?,
                starts.as_ptr(),
                indices.as_ptr(),
                matrix.values.as_ptr(),
            )
        };
        check_call(status, "Highs_addRows", || format!("{count} rows"))
    }

    fn change_objective_sense(&mut self, is_maximization: bool) -> Result<(), EngineError> {
        let sense = if is_maximization {
            OBJECTIVE_SENSE_MAXIMIZE
        } else {
            OBJECTIVE_SENSE_MINIMIZE
        };
        let status = unsafe { highs_sys::Highs_changeObjectiveSense(self.ptr, sense) };
        check_call(status, "Highs_changeObjectiveSense", String::new)
    }

    fn change_objective_offset(&mut self, offset: f64) -> Result<(), EngineError> {
        let status = unsafe { highs_sys::Highs_changeObjectiveOffset(self.ptr, offset) };
        check_call(status, "Highs_changeObjectiveOffset", String::new)
    }

    fn change_cols_cost(&mut self, costs: &[f64]) -> Result<(), EngineError> {
        expect_len("costs", costs.len(), self.num_col())?;
        let mask: Vec<HighsInt> = vec![1; costs.len()];
        let status = unsafe {
            highs_sys::Highs_changeColsCostByMask(self.ptr, mask.as_ptr(), costs.as_ptr())
        };
        check_call(status, "Highs_changeColsCostByMask", String::new)
    }

    fn run(&mut self) -> Result<(), EngineError> {
        let status = unsafe { highs_sys::Highs_run(self.ptr) };
        self.candidate_pushed = false;
        check_call(status, "Highs_run", || {
            format!("model status {}", self.model_status())
        })
    }

    fn model_status(&self) -> i32 {
        unsafe { highs_sys::Highs_getModelStatus(self.ptr) }
    }

    fn info(&self) -> SolverInfo {
        let mut info = SolverInfo::default();
        self.info_int("basis_validity", &mut info.basis_validity);
        self.info_int("simplex_iteration_count", &mut info.simplex_iteration_count);
        self.info_int("ipm_iteration_count", &mut info.ipm_iteration_count);
        self.info_int("crossover_iteration_count", &mut info.crossover_iteration_count);
        self.info_int("qp_iteration_count", &mut info.qp_iteration_count);
        self.info_int("primal_solution_status", &mut info.primal_solution_status);
        self.info_int("dual_solution_status", &mut info.dual_solution_status);
        self.info_double("objective_function_value", &mut info.objective_function_value);
        self.info_int64("mip_node_count", &mut info.mip_node_count);
        self.info_double("mip_dual_bound", &mut info.mip_dual_bound);
        self.info_double("mip_gap", &mut info.mip_gap);
        self.info_int("num_primal_infeasibilities", &mut info.num_primal_infeasibilities);
        self.info_double("max_primal_infeasibility", &mut info.max_primal_infeasibility);
        self.info_double("sum_primal_infeasibilities", &mut info.sum_primal_infeasibilities);
        self.info_int("num_dual_infeasibilities", &mut info.num_dual_infeasibilities);
        self.info_double("max_dual_infeasibility", &mut info.max_dual_infeasibility);
        self.info_double("sum_dual_infeasibilities", &mut info.sum_dual_infeasibilities);
        info
    }

    fn solution(&self) -> Result<EngineSolution, EngineError> {
        let num_col = self.num_col();
        let num_row = self.num_row();
        let mut solution = EngineSolution {
            value_valid: false,
            dual_valid: false,
            col_value: vec![0.0; num_col],
            col_dual: vec![0.0; num_col],
            row_value: vec![0.0; num_row],
            row_dual: vec![0.0; num_row],
        };
        let status = unsafe {
            highs_sys::Highs_getSolution(
                self.ptr,
                solution.col_value.as_mut_ptr(),
                solution.col_dual.as_mut_ptr(),
                solution.row_value.as_mut_ptr(),
                solution.row_dual.as_mut_ptr(),
            )
        };
        check_call(status, "Highs_getSolution", String::new)?;

        let info = self.info();
        solution.value_valid = self.candidate_pushed || info.primal_solution_status != 0;
        solution.dual_valid = info.dual_solution_status != 0;
        Ok(solution)
    }

    fn set_solution(&mut self, solution: &PartialSolution) -> Result<(), EngineError> {
        expect_len("col_value", solution.col_value.len(), self.num_col())?;
        let row_dual_ptr = match &solution.row_dual {
            Some(row_dual) => {
                expect_len("row_dual", row_dual.len(), self.num_row())?;
                row_dual.as_ptr()
            }
            None => std::ptr::null(),
        };
        let status = unsafe {
            highs_sys::Highs_setSolution(
                self.ptr,
                solution.col_value.as_ptr(),
                std::ptr::null(),
                std::ptr::null(),
                row_dual_ptr,
            )
        };
        check_call(status, "Highs_setSolution", String::new)?;
        self.candidate_pushed = true;
        Ok(())
    }

    fn assess_primal_solution(&self) -> Result<PrimalAssessment, EngineError> {
        let solution = self.solution()?;
        if !solution.value_valid {
            return Ok(PrimalAssessment::default());
        }
        let primal_tolerance = self
            .double_option("primal_feasibility_tolerance")
            .unwrap_or(1e-7);
        let mip_tolerance = self.double_option("mip_feasibility_tolerance").unwrap_or(1e-6);
        let assessment = self
            .lp()?
            .assess(&solution.col_value, primal_tolerance, mip_tolerance);
        trace!(
            component = "solver",
            operation = "assess_primal_solution",
            valid = assessment.valid,
            feasible = assessment.feasible,
            integral = assessment.integral,
            "Assessed primal candidate"
        );
        Ok(assessment)
    }

    fn write_solution(&self, path: &Path, style: SolutionStyle) -> Result<(), EngineError> {
        let c_path = c_path(path)?;
        let status = unsafe {
            match style {
                SolutionStyle::Raw => highs_sys::Highs_writeSolution(self.ptr, c_path.as_ptr()),
                SolutionStyle::Pretty => {
                    highs_sys::Highs_writeSolutionPretty(self.ptr, c_path.as_ptr())
                }
            }
        };
        check_call(status, "Highs_writeSolution", || path.display().to_string())
    }

    fn zero_all_clocks(&mut self) {
        unsafe { highs_sys::Highs_zeroAllClocks(self.ptr) };
    }

    fn run_time(&self) -> f64 {
        unsafe { highs_sys::Highs_getRunTime(self.ptr) }
    }

    fn clear(&mut self) -> Result<(), EngineError> {
        let status = unsafe { highs_sys::Highs_clear(self.ptr) };
        self.candidate_pushed = false;
        check_call(status, "Highs_clear", String::new)
    }

    fn clear_model(&mut self) -> Result<(), EngineError> {
        let status = unsafe { highs_sys::Highs_clearModel(self.ptr) };
        self.candidate_pushed = false;
        check_call(status, "Highs_clearModel", String::new)
    }

    fn clear_solver(&mut self) -> Result<(), EngineError> {
        let status = unsafe { highs_sys::Highs_clearSolver(self.ptr) };
        self.candidate_pushed = false;
        check_call(status, "Highs_clearSolver", String::new)
    }
}

/// Return the HiGHS library version string, if available.
pub fn highs_version() -> Option<String> {
    unsafe {
        let ptr = highs_sys::Highs_version();
        if ptr.is_null() {
            None
        } else {
            CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
        }
    }
}

fn c_string(text: &str) -> Result<CString, EngineError> {
    CString::new(text).map_err(|_| EngineError::new(format!("{text:?} contains a NUL byte")))
}

fn c_path(path: &Path) -> Result<CString, EngineError> {
    let text = path
        .to_str()
        .ok_or_else(|| EngineError::new(format!("{} is not valid UTF-8", path.display())))?;
    c_string(text)
}

fn expect_len(field: &str, actual: usize, expected: usize) -> Result<(), EngineError> {
    if actual == expected {
        Ok(())
    } else {
        Err(EngineError::new(format!(
            "{field} has length {actual}, expected {expected}"
        )))
    }
}

fn to_highs_int(value: usize) -> Result<HighsInt, EngineError> {
    HighsInt::try_from(value)
        .map_err(|_| EngineError::new(format!("{value} exceeds the HiGHS index range")))
}

fn to_highs_ints(values: &[usize]) -> Result<Vec<HighsInt>, EngineError> {
    values.iter().map(|&value| to_highs_int(value)).collect()
}

fn to_len(value: HighsInt) -> usize {
    usize::try_from(value).unwrap_or(0)
}
