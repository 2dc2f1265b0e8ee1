//! Batch configuration consumed by the orchestrator.
//!
//! Values arrive from the command line and are checked once by
//! [`BatchConfig::validate`] before any process is launched.

use super::calendar::ScenarioCalendar;
use super::constants::{INPUT_FILE_GLOB, SIMULATOR_SETTLE_TIME};
use crate::domain::{SimulationParameters, TritonError, TritonResult};
use crate::parser::ExportFormat;
use crate::waiter::WaitPolicy;
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the orchestrator does with a file whose name or export is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub simulator_path: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub clean: bool,
    pub save_every: usize,
    pub restart_every: usize,
    pub ui_wait_seconds: f64,
    pub settle: Duration,
    pub wait_policy: WaitPolicy,
    pub export_format: ExportFormat,
    pub malformed_policy: MalformedPolicy,
    pub parameters: SimulationParameters,
    pub calendar: ScenarioCalendar,
}

impl BatchConfig {
    pub fn new(simulator_path: impl Into<PathBuf>, input_dir: impl Into<PathBuf>) -> Self {
        Self {
            simulator_path: simulator_path.into(),
            input_dir: input_dir.into(),
            output_dir: PathBuf::from("."),
            clean: false,
            save_every: 10,
            restart_every: 15,
            ui_wait_seconds: 0.0,
            settle: SIMULATOR_SETTLE_TIME,
            wait_policy: WaitPolicy::default(),
            export_format: ExportFormat::default(),
            malformed_policy: MalformedPolicy::Abort,
            parameters: SimulationParameters::default(),
            calendar: ScenarioCalendar::default(),
        }
    }

    pub fn validate(&self) -> TritonResult<()> {
        self.validate_simulator_path()?;
        self.validate_input_dir()?;
        self.validate_save_every()?;
        self.validate_ui_wait()?;
        self.validate_restart_every()?;
        Ok(())
    }

    fn validate_simulator_path(&self) -> TritonResult<()> {
        if !self.simulator_path.is_file() {
            return Err(TritonError::validation(
                "INPUT.SIMULATOR_PATH",
                format!("No file at '{}'", self.simulator_path.display()),
            ));
        }
        Ok(())
    }

    fn validate_input_dir(&self) -> TritonResult<()> {
        if !self.input_dir.is_dir() {
            return Err(TritonError::validation(
                "INPUT.SOURCE_DIRECTORY",
                format!(
                    "Provided path '{}' is not a directory",
                    self.input_dir.display()
                ),
            ));
        }

        let matcher = input_file_matcher()?;
        let entries = fs::read_dir(&self.input_dir).map_err(|source| {
            TritonError::validation(
                "INPUT.SOURCE_DIRECTORY",
                format!(
                    "failed to list '{}': {}",
                    self.input_dir.display(),
                    source
                ),
            )
        })?;
        let has_input = entries
            .filter_map(|entry| entry.ok())
            .any(|entry| is_input_file(&matcher, &entry.path()));
        if !has_input {
            return Err(TritonError::validation(
                "INPUT.MISSING_DATA",
                format!(
                    "Provided path '{}' has no CSV files",
                    self.input_dir.display()
                ),
            ));
        }
        Ok(())
    }

    fn validate_save_every(&self) -> TritonResult<()> {
        if self.save_every == 0 {
            return Err(TritonError::validation(
                "INPUT.SAVE_EVERY",
                "partial save interval must be greater than 0",
            ));
        }
        Ok(())
    }

    fn validate_ui_wait(&self) -> TritonResult<()> {
        if !self.ui_wait_seconds.is_finite() || self.ui_wait_seconds < 0.0 {
            return Err(TritonError::validation(
                "INPUT.WAIT",
                format!(
                    "UI action wait must be a non-negative number, got {}",
                    self.ui_wait_seconds
                ),
            ));
        }
        Ok(())
    }

    fn validate_restart_every(&self) -> TritonResult<()> {
        if self.restart_every == 0 {
            return Err(TritonError::validation(
                "INPUT.RESTART_EVERY",
                "restart interval must be greater than 0",
            ));
        }
        Ok(())
    }
}

pub fn input_file_matcher() -> TritonResult<GlobMatcher> {
    GlobBuilder::new(INPUT_FILE_GLOB)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| {
            TritonError::internal(
                "SYS.INPUT_GLOB",
                format!("invalid input file pattern '{}': {}", INPUT_FILE_GLOB, source),
            )
        })
}

pub fn is_input_file(matcher: &GlobMatcher, path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .is_some_and(|name| matcher.is_match(Path::new(name)))
}
