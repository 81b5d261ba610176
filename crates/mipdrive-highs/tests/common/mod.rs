#![allow(dead_code)]

use mipdrive_solver::model::{FlatModel, SparseMatrix};
use mipdrive_solver::{
    Engine, EngineError, EngineSolution, OptionValue, PartialSolution, PrimalAssessment,
    SolutionStyle, SolverInfo,
};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard};

pub const COLUMNS: &str = "     Proc. InQueue |  Leaves   Expl. | BestBound       BestSol              Gap |   Cuts   InLp Confl. | LpIters     Time";
pub const ROW: &str = "         0       0         0   0.00%   0               inf                  inf        0      0      2        57     0.0s";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Observable state of a [`FakeEngine`], shared with the test.
#[derive(Debug)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub options: BTreeMap<String, OptionValue>,
    pub model: Option<FlatModel>,
    pub candidate: Option<PartialSolution>,
    pub status_code: i32,
    /// Status reported once `run` returns.
    pub run_status: i32,
    pub run_error: Option<String>,
    /// Lines appended to the configured log file during `run`.
    pub log_lines: Vec<String>,
    pub assessment: PrimalAssessment,
    pub solution: EngineSolution,
    pub info: SolverInfo,
    pub rejected_options: Vec<String>,
    pub run_time: f64,
}

impl Default for FakeState {
    fn default() -> Self {
        let mut options = BTreeMap::new();
        options.insert("log_file".to_string(), OptionValue::from(""));
        options.insert("log_to_console".to_string(), OptionValue::Bool(true));
        Self {
            calls: Vec::new(),
            options,
            model: None,
            candidate: None,
            status_code: 0,
            run_status: 7,
            run_error: None,
            log_lines: Vec::new(),
            assessment: PrimalAssessment {
                valid: true,
                integral: true,
                feasible: true,
            },
            solution: EngineSolution::default(),
            info: SolverInfo::default(),
            rejected_options: Vec::new(),
            run_time: 0.0,
        }
    }
}

/// Blocks `run` until the test releases it.
pub struct RunGate {
    started: Sender<()>,
    release: Receiver<()>,
}

/// Test handles for a gated engine.
pub struct GateHandle {
    pub started: Receiver<()>,
    pub release: Sender<()>,
}

/// Scripted engine recording every call.
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
    gate: Option<RunGate>,
}

impl FakeEngine {
    pub fn new() -> (Self, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        (
            Self {
                state: Arc::clone(&state),
                gate: None,
            },
            state,
        )
    }

    pub fn gated() -> (Self, Arc<Mutex<FakeState>>, GateHandle) {
        let (mut engine, state) = Self::new();
        let (started_tx, started_rx) = channel();
        let (release_tx, release_rx) = channel();
        engine.gate = Some(RunGate {
            started: started_tx,
            release: release_rx,
        });
        (
            engine,
            state,
            GateHandle {
                started: started_rx,
                release: release_tx,
            },
        )
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: impl Into<String>) -> MutexGuard<'_, FakeState> {
        let mut state = self.state();
        state.calls.push(call.into());
        state
    }
}

pub fn calls(state: &Arc<Mutex<FakeState>>) -> Vec<String> {
    state.lock().unwrap().calls.clone()
}

impl Engine for FakeEngine {
    fn version(&self) -> String {
        "fake-1.0".to_string()
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> Result<(), EngineError> {
        let mut state = self.record(format!("set_option:{name}"));
        if state.rejected_options.iter().any(|rejected| rejected == name) {
            return Err(EngineError::new(format!("unknown option {name}")));
        }
        state.options.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn get_option(&self, name: &str) -> Result<OptionValue, EngineError> {
        let state = self.record(format!("get_option:{name}"));
        state
            .options
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::new(format!("unknown option {name}")))
    }

    fn pass_model(&mut self, model: &FlatModel) -> Result<(), EngineError> {
        let mut state = self.record("pass_model");
        state.model = Some(model.clone());
        Ok(())
    }

    fn read_model(&mut self, path: &Path) -> Result<(), EngineError> {
        self.record("read_model");
        if path.exists() {
            Ok(())
        } else {
            Err(EngineError::new(format!("cannot read {}", path.display())))
        }
    }

    fn write_model(&mut self, _path: &Path) -> Result<(), EngineError> {
        self.record("write_model");
        Ok(())
    }

    fn add_rows(
        &mut self,
        _lower: &[f64],
        _upper: &[f64],
        _matrix: &SparseMatrix,
    ) -> Result<(), EngineError> {
        self.record("add_rows");
        Ok(())
    }

    fn change_objective_sense(&mut self, _is_maximization: bool) -> Result<(), EngineError> {
        self.record("change_objective_sense");
        Ok(())
    }

    fn change_objective_offset(&mut self, _offset: f64) -> Result<(), EngineError> {
        self.record("change_objective_offset");
        Ok(())
    }

    fn change_cols_cost(&mut self, _costs: &[f64]) -> Result<(), EngineError> {
        self.record("change_cols_cost");
        Ok(())
    }

    fn run(&mut self) -> Result<(), EngineError> {
        let (log_file, lines) = {
            let state = self.record("run");
            let log_file = state
                .options
                .get("log_file")
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default();
            (log_file, state.log_lines.clone())
        };
        if !log_file.is_empty() && !lines.is_empty() {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&log_file)
                .map_err(|err| EngineError::new(err.to_string()))?;
            for line in lines {
                writeln!(file, "{line}").map_err(|err| EngineError::new(err.to_string()))?;
            }
        }
        if let Some(gate) = &self.gate {
            let _ = gate.started.send(());
            let _ = gate.release.recv();
        }
        let mut state = self.state();
        state.status_code = state.run_status;
        state.run_time += 0.5;
        match state.run_error.clone() {
            Some(message) => Err(EngineError::new(message)),
            None => Ok(()),
        }
    }

    fn model_status(&self) -> i32 {
        self.state().status_code
    }

    fn info(&self) -> SolverInfo {
        self.state().info.clone()
    }

    fn solution(&self) -> Result<EngineSolution, EngineError> {
        Ok(self.state().solution.clone())
    }

    fn set_solution(&mut self, solution: &PartialSolution) -> Result<(), EngineError> {
        let mut state = self.record("set_solution");
        state.candidate = Some(solution.clone());
        Ok(())
    }

    fn assess_primal_solution(&self) -> Result<PrimalAssessment, EngineError> {
        let state = self.record("assess_primal_solution");
        Ok(state.assessment)
    }

    fn write_solution(&self, path: &Path, style: SolutionStyle) -> Result<(), EngineError> {
        self.record("write_solution");
        std::fs::write(path, format!("{style:?} solution\n"))
            .map_err(|err| EngineError::new(err.to_string()))
    }

    fn zero_all_clocks(&mut self) {
        let mut state = self.record("zero_all_clocks");
        state.run_time = 0.0;
    }

    fn run_time(&self) -> f64 {
        self.state().run_time
    }

    fn clear(&mut self) -> Result<(), EngineError> {
        let mut state = self.record("clear");
        state.model = None;
        state.status_code = 0;
        Ok(())
    }

    fn clear_model(&mut self) -> Result<(), EngineError> {
        let mut state = self.record("clear_model");
        state.model = None;
        Ok(())
    }

    fn clear_solver(&mut self) -> Result<(), EngineError> {
        let mut state = self.record("clear_solver");
        state.status_code = 0;
        Ok(())
    }
}
