use super::SimulationDriver;
use crate::common::constants::EXPORT_SUFFIX;
use crate::domain::{SimulationParameters, SimulationRun, TritonError, TritonResult};
use std::fs;
use std::path::{self, Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;

/// Drives the simulator through an external automation helper.
///
/// The helper is invoked once per run:
///
/// ```text
/// <helper> configure --input <file> --start-date <date> --export <path> --pause-ms <ms> --parameters <json>
/// <helper> rerun     --input <file> --start-date <date> --export <path> --pause-ms <ms>
/// ```
///
/// and must exit with status zero once the export has been requested.
#[derive(Debug, Clone)]
pub struct HelperDriver {
    helper: PathBuf,
    results_dir: PathBuf,
    pause: Duration,
}

impl HelperDriver {
    /// Creates the results directory. `ui_wait_seconds` is the extra wait
    /// between UI actions; the helper pauses a tenth of it per action.
    pub fn new(
        helper: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
        ui_wait_seconds: f64,
    ) -> TritonResult<Self> {
        let pause = Duration::try_from_secs_f64(ui_wait_seconds / 10.0).map_err(|_| {
            TritonError::validation(
                "INPUT.WAIT",
                format!(
                    "UI action wait must be a non-negative number, got {}",
                    ui_wait_seconds
                ),
            )
        })?;

        let results_dir: PathBuf = results_dir.into();
        let results_dir = absolute(&results_dir)?;
        fs::create_dir_all(&results_dir).map_err(|source| {
            TritonError::io_system(
                "IO.RESULTS_DIR",
                format!(
                    "failed to create results directory '{}': {}",
                    results_dir.display(),
                    source
                ),
            )
        })?;

        Ok(Self {
            helper: helper.into(),
            results_dir,
            pause,
        })
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// `<results_dir>/<file stem>.out.csv`
    pub fn export_path_for(&self, input: &Path) -> TritonResult<PathBuf> {
        let stem = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                TritonError::malformed_filename(
                    "INPUT.FILE_NAME",
                    format!("'{}' has no usable file stem", input.display()),
                )
            })?;
        Ok(self.results_dir.join(format!("{}.{}", stem, EXPORT_SUFFIX)))
    }

    fn invoke(
        &self,
        action: &str,
        run: &SimulationRun,
        parameters: Option<&SimulationParameters>,
    ) -> TritonResult<PathBuf> {
        let input = absolute(&run.input_path)?;
        let export = self.export_path_for(&input)?;

        let mut command = Command::new(&self.helper);
        command
            .arg(action)
            .arg("--input")
            .arg(&input)
            .arg("--start-date")
            .arg(&run.start_date)
            .arg("--export")
            .arg(&export)
            .arg("--pause-ms")
            .arg(self.pause.as_millis().to_string())
            .stdin(Stdio::null());

        if let Some(parameters) = parameters {
            let encoded = serde_json::to_string(parameters).map_err(|source| {
                TritonError::internal(
                    "SYS.PARAMETERS_ENCODE",
                    format!("failed to encode simulation parameters: {}", source),
                )
            })?;
            command.arg("--parameters").arg(encoded);
        }

        debug!(
            "Running helper '{}' {} for '{}'",
            self.helper.display(),
            action,
            input.display()
        );
        let status = command.status().map_err(|source| {
            TritonError::driver(
                "DRIVER.HELPER_SPAWN",
                format!(
                    "failed to run automation helper '{}': {}",
                    self.helper.display(),
                    source
                ),
            )
        })?;

        if !status.success() {
            return Err(TritonError::driver(
                "DRIVER.HELPER_FAILED",
                format!(
                    "automation helper '{}' {} failed for '{}' ({})",
                    self.helper.display(),
                    action,
                    input.display(),
                    status
                ),
            ));
        }
        Ok(export)
    }
}

impl SimulationDriver for HelperDriver {
    fn export_path(&self, input: &Path) -> TritonResult<PathBuf> {
        self.export_path_for(&absolute(input)?)
    }

    fn configure_and_run(
        &mut self,
        run: &SimulationRun,
        parameters: &SimulationParameters,
    ) -> TritonResult<PathBuf> {
        self.invoke("configure", run, Some(parameters))
    }

    fn rerun(&mut self, run: &SimulationRun) -> TritonResult<PathBuf> {
        self.invoke("rerun", run, None)
    }
}

fn absolute(path: &Path) -> TritonResult<PathBuf> {
    path::absolute(path).map_err(|source| {
        TritonError::io_system(
            "IO.PATH_RESOLVE",
            format!("failed to resolve '{}': {}", path.display(), source),
        )
    })
}
