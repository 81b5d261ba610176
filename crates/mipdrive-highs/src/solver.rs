//! Solve controller driving a single engine instance.

use crate::ffi::HighsEngine;
use crate::solution::SolverSolution;
use crate::status::model_status_from_code;
use mipdrive_monitor::{SolveMonitor, SolveTracker, TrackerOptions};
use mipdrive_solver::{
    Engine, EngineError, OptionValue, PartialSolution, SolutionStyle, SolverError, SolverInfo,
    SolverModel, SolverOptions, SolverResult, SolverStatus, SparseMatrix,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info, info_span, warn};

const LOG_FILE_OPTION: &str = "log_file";

/// Options applied when a controller is created.
#[derive(Debug, Clone, Default)]
pub struct SolverCreationOptions {
    /// Initial engine options, applied after console logging is disabled.
    pub options: SolverOptions,
}

impl SolverCreationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }
}

/// Options for a single [`Solver::solve`] call.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Receives progress parsed from the engine log while the solve runs.
    pub monitor: Option<SolveMonitor>,
    /// Accept completed statuses other than optimal.
    pub allow_non_optimal: bool,
    /// Do not reset the engine clocks before running.
    pub keep_clocks: bool,
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monitor(mut self, monitor: SolveMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_allow_non_optimal(mut self, allow: bool) -> Self {
        self.allow_non_optimal = allow;
        self
    }

    pub fn with_keep_clocks(mut self, keep: bool) -> Self {
        self.keep_clocks = keep;
        self
    }
}

/// Candidate solution pushed before a solve.
#[derive(Debug, Clone, Default)]
pub struct WarmStart {
    /// One value per column.
    pub primal_columns: Vec<f64>,
    pub dual_rows: Option<Vec<f64>>,
    /// Skip the engine's validity assessment.
    pub allow_invalid: bool,
}

impl WarmStart {
    pub fn new(primal_columns: Vec<f64>) -> Self {
        Self {
            primal_columns,
            ..Self::default()
        }
    }

    pub fn with_dual_rows(mut self, dual_rows: Vec<f64>) -> Self {
        self.dual_rows = Some(dual_rows);
        self
    }

    pub fn with_allow_invalid(mut self, allow: bool) -> Self {
        self.allow_invalid = allow;
        self
    }
}

/// Partial objective change. Absent fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveUpdate {
    pub is_maximization: Option<bool>,
    pub offset: Option<f64>,
    /// One cost per column.
    pub linear_weights: Option<Vec<f64>>,
}

impl ObjectiveUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maximization(mut self, is_maximization: bool) -> Self {
        self.is_maximization = Some(is_maximization);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_linear_weights(mut self, weights: Vec<f64>) -> Self {
        self.linear_weights = Some(weights);
        self
    }
}

/// Rows appended to the loaded model.
#[derive(Debug, Clone, Default)]
pub struct RowBatch {
    /// Row-wise coefficients, one offset per new row.
    pub weights: SparseMatrix,
    pub lower_bounds: Vec<f64>,
    pub upper_bounds: Vec<f64>,
}

impl RowBatch {
    pub fn validate(&self) -> Result<(), mipdrive_solver::ModelError> {
        let height = self.weights.offsets.len();
        for (field, actual) in [
            ("lower_bounds", self.lower_bounds.len()),
            ("upper_bounds", self.upper_bounds.len()),
        ] {
            if actual != height {
                return Err(mipdrive_solver::ModelError::InconsistentHeight {
                    field,
                    expected: height,
                    actual,
                });
            }
        }
        self.weights.validate("weights")
    }
}

/// Lifecycle phase of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverPhase {
    #[default]
    Idle,
    Solving,
}

/// Controller owning one engine instance.
///
/// All methods take `&self`; share a controller across threads with `Arc`.
/// Mutating operations fail with [`SolverError::SolveInProgress`] while a
/// solve is running, and read-only ones wait for the run to finish.
pub struct Solver<E: Engine = HighsEngine> {
    engine: Mutex<E>,
    phase: Mutex<SolverPhase>,
}

impl Solver<HighsEngine> {
    /// Create a controller over a new HiGHS instance.
    pub fn create(options: SolverCreationOptions) -> SolverResult<Self> {
        let engine = HighsEngine::new().map_err(|err| SolverError::native("create", err))?;
        Self::with_engine(engine, options)
    }
}

impl<E: Engine> Solver<E> {
    /// Create a controller over an existing engine. Console logging is turned
    /// off before the caller's options are applied.
    pub fn with_engine(engine: E, options: SolverCreationOptions) -> SolverResult<Self> {
        let solver = Self {
            engine: Mutex::new(engine),
            phase: Mutex::new(SolverPhase::Idle),
        };
        solver.update_options(&SolverOptions::new().with_log_to_console(false))?;
        solver.update_options(&options.options)?;
        debug!(
            component = "solver",
            operation = "create",
            status = "success",
            "Created solver"
        );
        Ok(solver)
    }

    fn engine(&self) -> MutexGuard<'_, E> {
        lock(&self.engine)
    }

    fn ensure_idle(&self) -> SolverResult<()> {
        if *lock(&self.phase) == SolverPhase::Solving {
            return Err(SolverError::SolveInProgress);
        }
        Ok(())
    }

    /// Engine guard for a mutating operation.
    ///
    /// The phase is checked again once the engine is held, since a solve may
    /// have started in between.
    fn idle_engine(&self) -> SolverResult<MutexGuard<'_, E>> {
        self.ensure_idle()?;
        let engine = self.engine();
        self.ensure_idle()?;
        Ok(engine)
    }

    /// Consume the controller and return its engine.
    pub fn into_engine(self) -> E {
        match self.engine.into_inner() {
            Ok(engine) => engine,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Check if a solve is currently running.
    pub fn is_solving(&self) -> bool {
        *lock(&self.phase) == SolverPhase::Solving
    }

    pub fn engine_version(&self) -> String {
        self.engine().version()
    }

    /// Forward every set option to the engine, stopping at the first
    /// rejection.
    pub fn update_options(&self, options: &SolverOptions) -> SolverResult<()> {
        let mut engine = self.idle_engine()?;
        for (name, value) in options.entries() {
            engine
                .set_option(&name, &value)
                .map_err(native("set_option"))?;
        }
        Ok(())
    }

    /// Current value of an engine option.
    pub fn get_option(&self, name: &str) -> SolverResult<OptionValue> {
        self.engine().get_option(name).map_err(native("get_option"))
    }

    /// Load a model, replacing the current one.
    pub fn set_model(&self, model: &SolverModel) -> SolverResult<()> {
        let mut engine = self.idle_engine()?;
        debug!(
            component = "solver",
            operation = "set_model",
            width = model.width(),
            height = model.height(),
            "Setting inline model"
        );
        let flat = model.flatten()?;
        engine.pass_model(&flat).map_err(native("pass_model"))
    }

    /// Load a model from any file format the engine reads.
    pub fn set_model_from_file(&self, path: impl AsRef<Path>) -> SolverResult<()> {
        let path = path.as_ref();
        let mut engine = self.idle_engine()?;
        let span = info_span!("read_model", path = %path.display());
        let _entered = span.enter();
        let started = Instant::now();
        engine.read_model(path).map_err(native("read_model"))?;
        debug!(
            component = "solver",
            operation = "read_model",
            status = "success",
            duration_ms = elapsed_ms(started),
            "Read model file"
        );
        Ok(())
    }

    /// Write the current model. The extension selects the format.
    pub fn write_model(&self, path: impl AsRef<Path>) -> SolverResult<()> {
        let path = path.as_ref();
        let mut engine = self.idle_engine()?;
        let span = info_span!("write_model", path = %path.display());
        let _entered = span.enter();
        let started = Instant::now();
        engine.write_model(path).map_err(native("write_model"))?;
        debug!(
            component = "solver",
            operation = "write_model",
            status = "success",
            duration_ms = elapsed_ms(started),
            "Wrote model file"
        );
        Ok(())
    }

    /// Append constraint rows to the loaded model.
    pub fn add_rows(&self, rows: &RowBatch) -> SolverResult<()> {
        let mut engine = self.idle_engine()?;
        rows.validate()?;
        debug!(
            component = "solver",
            operation = "add_rows",
            count = rows.weights.offsets.len(),
            nnz = rows.weights.nnz(),
            "Adding rows"
        );
        engine
            .add_rows(&rows.lower_bounds, &rows.upper_bounds, &rows.weights)
            .map_err(native("add_rows"))
    }

    /// Change the objective's sense, offset and linear weights, skipping
    /// absent fields.
    pub fn update_objective(&self, update: &ObjectiveUpdate) -> SolverResult<()> {
        let mut engine = self.idle_engine()?;
        debug!(
            component = "solver",
            operation = "update_objective",
            sense = ?update.is_maximization,
            offset = ?update.offset,
            weights = update.linear_weights.is_some(),
            "Updating objective"
        );
        if let Some(is_maximization) = update.is_maximization {
            engine
                .change_objective_sense(is_maximization)
                .map_err(native("change_objective_sense"))?;
        }
        if let Some(offset) = update.offset {
            engine
                .change_objective_offset(offset)
                .map_err(native("change_objective_offset"))?;
        }
        if let Some(weights) = &update.linear_weights {
            engine
                .change_cols_cost(weights)
                .map_err(native("change_cols_cost"))?;
        }
        Ok(())
    }

    /// Push a candidate solution.
    ///
    /// Unless `allow_invalid` is set, the candidate is assessed and
    /// [`SolverError::InvalidWarmStart`] is returned when it is not valid. The
    /// values stay loaded either way.
    pub fn warm_start(&self, start: &WarmStart) -> SolverResult<()> {
        let mut engine = self.idle_engine()?;
        debug!(
            component = "solver",
            operation = "warm_start",
            columns = start.primal_columns.len(),
            duals = start.dual_rows.is_some(),
            "Adding warm-start solution"
        );
        engine
            .set_solution(&PartialSolution {
                col_value: start.primal_columns.clone(),
                row_dual: start.dual_rows.clone(),
            })
            .map_err(native("set_solution"))?;
        if start.allow_invalid {
            return Ok(());
        }
        let assessment = engine
            .assess_primal_solution()
            .map_err(native("assess_primal_solution"))?;
        if !assessment.valid {
            warn!(
                component = "solver",
                operation = "warm_start",
                status = "error",
                feasible = assessment.feasible,
                integral = assessment.integral,
                "Warm-start solution is not valid"
            );
            return Err(SolverError::InvalidWarmStart);
        }
        Ok(())
    }

    /// Run the engine on the loaded model, blocking until it finishes.
    ///
    /// Completed statuses other than optimal are errors unless
    /// `allow_non_optimal` is set. Any other terminal status fails with
    /// [`SolverError::SolveFailed`].
    pub fn solve(&self, options: &SolveOptions) -> SolverResult<()> {
        {
            let mut phase = lock(&self.phase);
            if *phase == SolverPhase::Solving {
                return Err(SolverError::SolveInProgress);
            }
            *phase = SolverPhase::Solving;
        }
        // Declared before the engine guard so it drops after it.
        let mut session = SolveSession {
            engine: &self.engine,
            phase: &self.phase,
            tracker: None,
            temp_log: None,
        };

        let span = info_span!("solve");
        let _entered = span.enter();
        let started = Instant::now();
        debug!(component = "solver", operation = "solve", status = "start", "Starting solve");

        let run_result = {
            let mut engine = self.engine();
            if !options.keep_clocks {
                engine.zero_all_clocks();
            }
            let configured = configured_log_file(&*engine)?;
            if let Some(monitor) = &options.monitor {
                session.start_tracking(&mut *engine, configured, monitor.clone())?;
            }
            engine.run().map_err(native("run"))
        };
        drop(session);

        let status = self.status();
        info!(
            component = "solver",
            operation = "solve",
            model_status = %status,
            duration_ms = elapsed_ms(started),
            "Solve ended"
        );

        let cause = run_result.err().map(Box::new);
        if !status.is_completed() {
            return Err(SolverError::SolveFailed { status, cause });
        }
        if !options.allow_non_optimal && !status.is_optimal() {
            return Err(SolverError::SolveNonOptimal { status, cause });
        }
        Ok(())
    }

    /// Status of the last solve.
    pub fn status(&self) -> SolverStatus {
        model_status_from_code(self.engine().model_status())
    }

    pub fn info(&self) -> SolverInfo {
        self.engine().info()
    }

    /// Solution of the last solve, or `None` when no valid primal values
    /// exist.
    pub fn solution(&self) -> SolverResult<Option<SolverSolution>> {
        let engine = self.engine();
        let solution = engine.solution().map_err(native("get_solution"))?;
        let info = engine.info();
        Ok(SolverSolution::from_engine(solution, &info))
    }

    /// Seconds spent running since the clocks were last reset.
    pub fn run_time(&self) -> f64 {
        self.engine().run_time()
    }

    /// Write the current solution, in raw style unless specified.
    pub fn write_solution(
        &self,
        path: impl AsRef<Path>,
        style: Option<SolutionStyle>,
    ) -> SolverResult<()> {
        let path = path.as_ref();
        let engine = self.idle_engine()?;
        let style = style.unwrap_or_default();
        let span = info_span!("write_solution", path = %path.display(), ?style);
        let _entered = span.enter();
        let started = Instant::now();
        engine
            .write_solution(path, style)
            .map_err(native("write_solution"))?;
        debug!(
            component = "solver",
            operation = "write_solution",
            status = "success",
            duration_ms = elapsed_ms(started),
            "Wrote solution file"
        );
        Ok(())
    }

    /// Reset model, solution and options.
    pub fn clear(&self) -> SolverResult<()> {
        self.idle_engine()?.clear().map_err(native("clear"))
    }

    pub fn clear_model(&self) -> SolverResult<()> {
        self.idle_engine()?.clear_model().map_err(native("clear_model"))
    }

    /// Drop the solution and basis, keeping the model.
    pub fn clear_solver(&self) -> SolverResult<()> {
        self.idle_engine()?
            .clear_solver()
            .map_err(native("clear_solver"))
    }

    pub fn zero_all_clocks(&self) -> SolverResult<()> {
        self.idle_engine()?.zero_all_clocks();
        Ok(())
    }
}

impl<E: Engine> std::fmt::Debug for Solver<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("phase", &*lock(&self.phase))
            .finish_non_exhaustive()
    }
}

/// Per-solve resources, released when dropped.
///
/// Dropping stops the tracker (after it drained the log), points the engine
/// away from a temporary log and deletes it, then returns the controller to
/// `Idle`. This also runs when the solve unwinds.
struct SolveSession<'a, E: Engine> {
    engine: &'a Mutex<E>,
    phase: &'a Mutex<SolverPhase>,
    tracker: Option<SolveTracker>,
    temp_log: Option<NamedTempFile>,
}

impl<E: Engine> SolveSession<'_, E> {
    /// Point the engine at a log file and start tailing it. An empty
    /// `configured` path selects a temporary file.
    fn start_tracking(
        &mut self,
        engine: &mut E,
        configured: String,
        monitor: SolveMonitor,
    ) -> SolverResult<()> {
        let path = if configured.is_empty() {
            let temp = tempfile::Builder::new()
                .prefix("mipdrive-")
                .suffix(".log")
                .tempfile()
                .map_err(|source| SolverError::Io {
                    path: std::env::temp_dir().display().to_string(),
                    source,
                })?;
            let path = temp.path().to_path_buf();
            self.temp_log = Some(temp);
            engine
                .set_option(LOG_FILE_OPTION, &OptionValue::from(path_string(&path)))
                .map_err(native("set_option"))?;
            path
        } else {
            PathBuf::from(configured)
        };

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SolverError::Io {
                path: path_string(&path),
                source,
            })?;

        let tracker = SolveTracker::spawn(TrackerOptions::new(&path), monitor).map_err(
            |source| SolverError::Io {
                path: path_string(&path),
                source,
            },
        )?;
        debug!(
            component = "solver",
            operation = "track",
            path = %path.display(),
            temporary = self.temp_log.is_some(),
            "Tracking solve progress"
        );
        self.tracker = Some(tracker);
        Ok(())
    }
}

impl<E: Engine> Drop for SolveSession<'_, E> {
    fn drop(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.shutdown();
        }
        if let Some(temp) = self.temp_log.take() {
            let reset = lock(self.engine).set_option(LOG_FILE_OPTION, &OptionValue::from(""));
            if let Err(err) = reset {
                warn!(
                    component = "solver",
                    operation = "cleanup",
                    error = %err,
                    "Failed to reset log file option"
                );
            }
            let path = path_string(temp.path());
            if let Err(err) = temp.close() {
                warn!(
                    component = "solver",
                    operation = "cleanup",
                    path = %path,
                    error = %err,
                    "Failed to remove temporary log file"
                );
            }
        }
        *lock(self.phase) = SolverPhase::Idle;
    }
}

fn configured_log_file<E: Engine>(engine: &E) -> SolverResult<String> {
    match engine
        .get_option(LOG_FILE_OPTION)
        .map_err(native("get_option"))?
    {
        OptionValue::Str(path) => Ok(path),
        _ => Err(SolverError::OptionType {
            name: LOG_FILE_OPTION.to_string(),
            expected: "string",
        }),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Wraps an engine failure for `method`.
fn native(method: &'static str) -> impl FnOnce(EngineError) -> SolverError {
    move |cause| SolverError::native(method, cause)
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
