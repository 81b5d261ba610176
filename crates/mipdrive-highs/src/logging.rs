//! Logging setup for applications embedding the solver.
//!
//! Two streams are involved: the crate's own `tracing` events and the
//! engine's native log. [`LoggingConfig`] describes both, so one environment
//! can turn on diagnostics for the controller and the engine together.

use mipdrive_solver::SolverOptions;
use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter for the crate's events, e.g. `info` or `mipdrive_highs=debug`.
pub const TRACE_ENV: &str = "MIPDRIVE_TRACE";
/// `pretty` (default) or `json`.
pub const LOG_FORMAT_ENV: &str = "MIPDRIVE_LOG_FORMAT";
/// Optional file receiving a copy of every event.
pub const LOG_FILE_ENV: &str = "MIPDRIVE_LOG_FILE";
/// When truthy, solvers echo the engine log to the console.
pub const ENGINE_CONSOLE_ENV: &str = "MIPDRIVE_ENGINE_CONSOLE";

#[derive(Debug)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    InvalidSwitch { name: &'static str, value: String },
    LogFile { path: PathBuf, source: io::Error },
    Init(String),
}

impl LoggingError {
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::InvalidFilter(_) => "LOGGING_INVALID_FILTER",
            LoggingError::InvalidFormat(_) => "LOGGING_INVALID_FORMAT",
            LoggingError::InvalidSwitch { .. } => "LOGGING_INVALID_SWITCH",
            LoggingError::LogFile { .. } => "LOGGING_LOG_FILE",
            LoggingError::Init(_) => "LOGGING_INIT",
        }
    }
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.code();
        match self {
            LoggingError::InvalidFilter(err) => write!(f, "[{code}] Invalid log filter: {err}"),
            LoggingError::InvalidFormat(format) => write!(
                f,
                "[{code}] Invalid {LOG_FORMAT_ENV} {format:?} (expected 'json' or 'pretty')"
            ),
            LoggingError::InvalidSwitch { name, value } => {
                write!(f, "[{code}] Invalid {name} {value:?} (expected on or off)")
            }
            LoggingError::LogFile { path, source } => {
                write!(f, "[{code}] Failed to open log file {}: {source}", path.display())
            }
            LoggingError::Init(err) => write!(f, "[{code}] Failed to initialize logging: {err}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::LogFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Output format of the crate's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("pretty") {
            Ok(LogFormat::Pretty)
        } else if value.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(LoggingError::InvalidFormat(value.to_string()))
        }
    }
}

/// Where the crate's events go and whether the engine talks too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `off` disables the crate's events.
    pub filter: String,
    pub format: LogFormat,
    /// Copy of every event, without ANSI colors.
    pub log_file: Option<PathBuf>,
    /// Echo the engine's native log on the console.
    pub engine_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "off".to_string(),
            format: LogFormat::Pretty,
            log_file: None,
            engine_console: false,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `MIPDRIVE_*` variables, keeping defaults for unset ones.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let mut config = Self::default();
        if let Some(filter) = lookup(TRACE_ENV) {
            config.filter = filter;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.format = format.parse()?;
        }
        config.log_file = lookup(LOG_FILE_ENV)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        if let Some(value) = lookup(ENGINE_CONSOLE_ENV) {
            config.engine_console = parse_switch(ENGINE_CONSOLE_ENV, &value)?;
        }
        Ok(config)
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_engine_console(mut self, enabled: bool) -> Self {
        self.engine_console = enabled;
        self
    }

    /// Carry the engine console switch into solver options.
    ///
    /// `Solver::create` turns console output off before applying caller
    /// options, so passing the result there re-enables it when asked.
    pub fn solver_options(&self, options: SolverOptions) -> SolverOptions {
        if self.engine_console {
            options.with_log_to_console(true)
        } else {
            options
        }
    }

    /// Install a global subscriber for the crate's events.
    ///
    /// The config is validated first. Returns `Ok(false)` if a subscriber is
    /// already installed.
    pub fn install(&self) -> Result<bool, LoggingError> {
        let filter = build_filter(&self.filter)?;
        let file = self.log_file.as_deref().map(open_log_file).transpose()?;
        if tracing::dispatcher::has_been_set() {
            return Ok(false);
        }

        let mut layers = vec![fmt_layer(io::stderr, self.format, true)];
        if let Some(file) = file {
            layers.push(fmt_layer(file, self.format, false));
        }
        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .map_err(|err| LoggingError::Init(err.to_string()))?;

        tracing::debug!(
            component = "logging",
            operation = "install",
            status = "success",
            filter = %self.filter,
            format = ?self.format,
            engine_console = self.engine_console,
            "Installed log subscriber"
        );
        Ok(true)
    }
}

fn parse_switch(name: &'static str, value: &str) -> Result<bool, LoggingError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" | "" => Ok(false),
        _ => Err(LoggingError::InvalidSwitch {
            name,
            value: value.to_string(),
        }),
    }
}

fn open_log_file(path: &Path) -> Result<Mutex<File>, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Mutex::new)
        .map_err(|source| LoggingError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

fn build_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    if directive.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(directive).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(writer: W, format: LogFormat, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);
    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Install the crate's subscriber from the environment.
///
/// `level` overrides [`TRACE_ENV`]. The engine console switch is not applied
/// here; pass the config's [`LoggingConfig::solver_options`] to the solver.
pub fn enable_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    let mut config = LoggingConfig::from_env()?;
    if let Some(level) = level {
        config.filter = level.to_string();
    }
    config.install()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mipdrive_solver::OptionValue;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_filter_parsing() {
        assert!(build_filter("off").is_ok());
        assert!(build_filter("OFF").is_ok());
        assert!(build_filter("mipdrive_highs=debug,info").is_ok());
        let err = build_filter("mipdrive_highs=loud").unwrap_err();
        assert_eq!(err.code(), "LOGGING_INVALID_FILTER");
    }

    #[test]
    fn test_config_from_variables() {
        let config = LoggingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LoggingConfig::default());

        let config = LoggingConfig::from_lookup(lookup(&[
            (TRACE_ENV, "mipdrive_highs=debug"),
            (LOG_FORMAT_ENV, "JSON"),
            (LOG_FILE_ENV, "/tmp/mipdrive.log"),
            (ENGINE_CONSOLE_ENV, "on"),
        ]))
        .unwrap();
        assert_eq!(config.filter, "mipdrive_highs=debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/mipdrive.log")));
        assert!(config.engine_console);

        let config = LoggingConfig::from_lookup(lookup(&[(LOG_FILE_ENV, "")])).unwrap();
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let err = LoggingConfig::from_lookup(lookup(&[(LOG_FORMAT_ENV, "xml")])).unwrap_err();
        assert_eq!(err.code(), "LOGGING_INVALID_FORMAT");
        let err = LoggingConfig::from_lookup(lookup(&[(ENGINE_CONSOLE_ENV, "loud")])).unwrap_err();
        assert_eq!(err.code(), "LOGGING_INVALID_SWITCH");
        assert!(err.to_string().contains(ENGINE_CONSOLE_ENV));
    }

    #[test]
    fn test_engine_console_reaches_solver_options() {
        let base = SolverOptions::new().with_time_limit(5.0);
        let quiet = LoggingConfig::new().solver_options(base.clone());
        assert_eq!(quiet.log_to_console, None);

        let loud = LoggingConfig::new()
            .with_engine_console(true)
            .solver_options(base);
        assert!(
            loud.entries()
                .contains(&("log_to_console".to_string(), OptionValue::Bool(true)))
        );
        assert_eq!(loud.time_limit, Some(5.0));
    }

    #[test]
    fn test_open_log_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nested").join("trace.log");
        let err = open_log_file(&missing).unwrap_err();
        assert!(format!("{err}").starts_with("[LOGGING_LOG_FILE]"));
        assert!(format!("{err}").contains("trace.log"));
    }

    #[test]
    fn test_install_validates_then_defers_to_existing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        let err = LoggingConfig::new()
            .with_filter("mipdrive_highs=loud")
            .install()
            .unwrap_err();
        assert_eq!(err.code(), "LOGGING_INVALID_FILTER");

        let dir = tempfile::tempdir().unwrap();
        let err = LoggingConfig::new()
            .with_log_file(dir.path().join("nested").join("trace.log"))
            .install()
            .unwrap_err();
        assert_eq!(err.code(), "LOGGING_LOG_FILE");

        assert!(!enable_logging(Some("debug")).unwrap());
    }
}
