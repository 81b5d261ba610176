//! Solver option types.

use serde::Serialize;
use std::collections::BTreeMap;

/// A single engine option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

impl OptionValue {
    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "int",
            OptionValue::Float(_) => "float",
            OptionValue::Str(_) => "string",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Int(value) => Some(f64::from(*value)),
            OptionValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer value; floats are accepted when they hold an exact `i32`.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            OptionValue::Int(value) => Some(*value),
            OptionValue::Float(value) => integral_i32(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Returns the value as an `i32` if it is finite, integral and in range.
pub fn integral_i32(value: f64) -> Option<i32> {
    if value.is_finite()
        && value.fract() == 0.0
        && value >= f64::from(i32::MIN)
        && value <= f64::from(i32::MAX)
    {
        Some(value as i32)
    } else {
        None
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Bool(value) => write!(f, "{value}"),
            OptionValue::Int(value) => write!(f, "{value}"),
            OptionValue::Float(value) => write!(f, "{value}"),
            OptionValue::Str(value) => write!(f, "{value:?}"),
        }
    }
}

/// Tri-state switch used by several engine options (`presolve`, `parallel`,
/// `run_crossover`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
    Choose,
}

impl Toggle {
    pub fn as_str(self) -> &'static str {
        match self {
            Toggle::On => "on",
            Toggle::Off => "off",
            Toggle::Choose => "choose",
        }
    }
}

/// LP algorithm selection (`solver` option).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Simplex,
    Ipm,
    Choose,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Simplex => "simplex",
            Algorithm::Ipm => "ipm",
            Algorithm::Choose => "choose",
        }
    }
}

/// Options forwarded to the engine.
///
/// Well-known options have typed fields so their value type is fixed at
/// compile time. Anything else goes through [`SolverOptions::with_option`]
/// and is validated by the engine. Unset entries are never forwarded.
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    /// Time limit in seconds.
    pub time_limit: Option<f64>,
    /// Relative MIP gap tolerance.
    pub mip_rel_gap: Option<f64>,
    /// Absolute MIP gap tolerance.
    pub mip_abs_gap: Option<f64>,
    pub presolve: Option<Toggle>,
    pub parallel: Option<Toggle>,
    pub solver: Option<Algorithm>,
    pub threads: Option<i32>,
    pub random_seed: Option<i32>,
    pub output_flag: Option<bool>,
    /// Path of the engine's log file; empty disables file logging.
    pub log_file: Option<String>,
    pub log_to_console: Option<bool>,
    pub primal_feasibility_tolerance: Option<f64>,
    pub dual_feasibility_tolerance: Option<f64>,
    pub objective_bound: Option<f64>,
    pub objective_target: Option<f64>,
    /// Options without a typed field. `None` values are skipped.
    pub extra: BTreeMap<String, Option<OptionValue>>,
}

impl SolverOptions {
    /// Create a new set of options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_rel_gap(mut self, gap: f64) -> Self {
        self.mip_rel_gap = Some(gap);
        self
    }

    /// Set the absolute MIP gap tolerance.
    pub fn with_mip_abs_gap(mut self, gap: f64) -> Self {
        self.mip_abs_gap = Some(gap);
        self
    }

    pub fn with_presolve(mut self, presolve: Toggle) -> Self {
        self.presolve = Some(presolve);
        self
    }

    pub fn with_parallel(mut self, parallel: Toggle) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn with_solver(mut self, solver: Algorithm) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Set the number of threads.
    pub fn with_threads(mut self, count: i32) -> Self {
        self.threads = Some(count);
        self
    }

    pub fn with_random_seed(mut self, seed: i32) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_output_flag(mut self, enabled: bool) -> Self {
        self.output_flag = Some(enabled);
        self
    }

    /// Direct engine logs to a file.
    pub fn with_log_file(mut self, path: impl Into<String>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Enable or disable console logging.
    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Set both primal and dual feasibility tolerances.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.primal_feasibility_tolerance = Some(tolerance);
        self.dual_feasibility_tolerance = Some(tolerance);
        self
    }

    pub fn with_objective_bound(mut self, bound: f64) -> Self {
        self.objective_bound = Some(bound);
        self
    }

    pub fn with_objective_target(mut self, target: f64) -> Self {
        self.objective_target = Some(target);
        self
    }

    /// Set an arbitrary option by name.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.extra.insert(name.into(), Some(value.into()));
        self
    }

    /// Record an option name with no value; it will not be forwarded.
    pub fn without_option(mut self, name: impl Into<String>) -> Self {
        self.extra.insert(name.into(), None);
        self
    }

    /// All set entries, typed fields first, as `(name, value)` pairs.
    ///
    /// Each name appears at most once. A set typed field wins over an
    /// [`extra`](Self::extra) entry of the same name.
    pub fn entries(&self) -> Vec<(String, OptionValue)> {
        let typed = [
            ("time_limit", self.time_limit.map(OptionValue::Float)),
            ("mip_rel_gap", self.mip_rel_gap.map(OptionValue::Float)),
            ("mip_abs_gap", self.mip_abs_gap.map(OptionValue::Float)),
            ("presolve", self.presolve.map(|t| t.as_str().into())),
            ("parallel", self.parallel.map(|t| t.as_str().into())),
            ("solver", self.solver.map(|a| a.as_str().into())),
            ("threads", self.threads.map(OptionValue::Int)),
            ("random_seed", self.random_seed.map(OptionValue::Int)),
            ("output_flag", self.output_flag.map(OptionValue::Bool)),
            ("log_file", self.log_file.clone().map(OptionValue::Str)),
            ("log_to_console", self.log_to_console.map(OptionValue::Bool)),
            (
                "primal_feasibility_tolerance",
                self.primal_feasibility_tolerance.map(OptionValue::Float),
            ),
            (
                "dual_feasibility_tolerance",
                self.dual_feasibility_tolerance.map(OptionValue::Float),
            ),
            ("objective_bound", self.objective_bound.map(OptionValue::Float)),
            ("objective_target", self.objective_target.map(OptionValue::Float)),
        ];

        let mut entries: Vec<(String, OptionValue)> = typed
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
            .collect();
        let shadowed: Vec<String> = entries.iter().map(|(name, _)| name.clone()).collect();
        entries.extend(
            self.extra
                .iter()
                .filter(|(name, _)| !shadowed.contains(name))
                .filter_map(|(name, value)| value.clone().map(|value| (name.clone(), value))),
        );
        entries
    }

    /// Check if no option is set.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_new_is_empty() {
        assert!(SolverOptions::new().is_empty());
    }

    #[test]
    fn test_options_builder_pattern() {
        let options = SolverOptions::new()
            .with_time_limit(60.0)
            .with_mip_rel_gap(0.01)
            .with_presolve(Toggle::Off)
            .with_threads(4)
            .with_random_seed(48)
            .with_log_to_console(false);

        let entries = options.entries();
        assert_eq!(
            entries,
            vec![
                ("time_limit".to_string(), OptionValue::Float(60.0)),
                ("mip_rel_gap".to_string(), OptionValue::Float(0.01)),
                ("presolve".to_string(), OptionValue::Str("off".to_string())),
                ("threads".to_string(), OptionValue::Int(4)),
                ("random_seed".to_string(), OptionValue::Int(48)),
                ("log_to_console".to_string(), OptionValue::Bool(false)),
            ]
        );
    }

    #[test]
    fn test_unset_extra_options_are_skipped() {
        let options = SolverOptions::new()
            .with_option("simplex_strategy", 4)
            .without_option("ipm_iteration_limit");

        assert_eq!(
            options.entries(),
            vec![("simplex_strategy".to_string(), OptionValue::Int(4))]
        );
        assert!(SolverOptions::new().without_option("x").is_empty());
    }

    #[test]
    fn test_typed_field_wins_over_same_named_extra() {
        let options = SolverOptions::new()
            .with_time_limit(10.0)
            .with_option("time_limit", 99.0)
            .with_option("log_to_console", true);

        assert_eq!(
            options.entries(),
            vec![
                ("time_limit".to_string(), OptionValue::Float(10.0)),
                ("log_to_console".to_string(), OptionValue::Bool(true)),
            ]
        );

        // An extra entry is still forwarded when the typed field is unset.
        let options = SolverOptions::new().with_option("threads", 2);
        assert_eq!(
            options.entries(),
            vec![("threads".to_string(), OptionValue::Int(2))]
        );
    }

    #[test]
    fn test_tolerance_sets_both_sides() {
        let options = SolverOptions::new().with_tolerance(1e-7);
        assert_eq!(options.primal_feasibility_tolerance, Some(1e-7));
        assert_eq!(options.dual_feasibility_tolerance, Some(1e-7));
    }

    #[test]
    fn test_option_value_conversions() {
        assert_eq!(OptionValue::from(true), OptionValue::Bool(true));
        assert_eq!(OptionValue::from(3), OptionValue::Int(3));
        assert_eq!(OptionValue::from(1.5), OptionValue::Float(1.5));
        assert_eq!(OptionValue::from("ipm"), OptionValue::Str("ipm".into()));

        assert_eq!(OptionValue::Int(123).as_f64(), Some(123.0));
        assert_eq!(OptionValue::Float(48.0).as_i32(), Some(48));
        assert_eq!(OptionValue::Float(48.5).as_i32(), None);
        assert_eq!(OptionValue::Str("on".into()).as_str(), Some("on"));
        assert_eq!(OptionValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_integral_i32() {
        assert_eq!(integral_i32(12.0), Some(12));
        assert_eq!(integral_i32(-3.0), Some(-3));
        assert_eq!(integral_i32(0.25), None);
        assert_eq!(integral_i32(f64::INFINITY), None);
        assert_eq!(integral_i32(1e12), None);
    }

    #[test]
    fn test_option_value_display() {
        assert_eq!(OptionValue::Str("on".into()).to_string(), "\"on\"");
        assert_eq!(OptionValue::Int(7).to_string(), "7");
        assert_eq!(OptionValue::Bool(false).type_name(), "bool");
    }
}
