use super::CliError;
use super::helpers::load_parameters;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use triton_core::cleanup::{clear_results_files, remove_results_dir};
use triton_core::common::config::{BatchConfig, MalformedPolicy};
use triton_core::common::constants::EXPORT_HEADER_ROWS;
use triton_core::domain::SimulationParameters;
use triton_core::driver::HelperDriver;
use triton_core::orchestrator::Orchestrator;
use triton_core::parser::{ExportFormat, ResultsLocator};
use triton_core::process::{ProcessLauncher, ProcessSupervisor, SystemLauncher};
use triton_core::waiter::WaitPolicy;

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Netuno 4 executable
    #[arg(value_name = "NETUNO_EXE")]
    netuno_exe: PathBuf,

    /// Directory holding the precipitation CSV files
    #[arg(value_name = "PRECIPITATION_DIR")]
    precipitation_dir: PathBuf,

    /// Automation helper that performs the UI interactions
    #[arg(long)]
    helper: PathBuf,

    /// Directory where the simulator exports each run
    #[arg(long, default_value = "netuno-results")]
    results_dir: PathBuf,

    /// Directory for the consolidated report
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// JSON file with simulation parameters; omitted fields use defaults
    #[arg(long)]
    parameters: Option<PathBuf>,

    /// Delete per-run exports and the results directory
    #[arg(short, long)]
    clean: bool,

    /// Save the report after every N processed files
    #[arg(short, long, default_value_t = 10)]
    save_every: usize,

    /// Restart the simulator before every K-th following file
    #[arg(short, long, default_value_t = 15)]
    restart_every: usize,

    /// Extra wait between UI actions, in seconds
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    wait: f64,

    /// Time given to the simulator to start up
    #[arg(long, default_value = "1s")]
    settle: humantime::Duration,

    /// How long to wait for each export to become readable
    #[arg(long, default_value = "5s")]
    result_timeout: humantime::Duration,

    /// Interval between export availability checks
    #[arg(long, default_value = "10ms")]
    poll_interval: humantime::Duration,

    /// Locate results after the row holding this label instead of skipping rows
    #[arg(long, conflicts_with = "skip_rows")]
    sentinel: Option<String>,

    /// Header rows preceding the results in each export
    #[arg(long, default_value_t = EXPORT_HEADER_ROWS)]
    skip_rows: usize,

    /// Log and skip files with malformed names or exports instead of aborting
    #[arg(long)]
    skip_malformed: bool,
}

struct RunConfig {
    batch: BatchConfig,
    helper: PathBuf,
    results_dir: PathBuf,
}

impl RunArgs {
    fn into_config(self, parameters: SimulationParameters) -> RunConfig {
        let locator = match self.sentinel {
            Some(label) => ResultsLocator::Sentinel(label),
            None => ResultsLocator::SkipRows(self.skip_rows),
        };
        let malformed_policy = if self.skip_malformed {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Abort
        };

        let mut batch = BatchConfig::new(self.netuno_exe, self.precipitation_dir);
        batch.output_dir = self.output_dir;
        batch.clean = self.clean;
        batch.save_every = self.save_every;
        batch.restart_every = self.restart_every;
        batch.ui_wait_seconds = self.wait;
        batch.settle = Duration::from(self.settle);
        batch.wait_policy = WaitPolicy::new(
            Duration::from(self.poll_interval),
            Duration::from(self.result_timeout),
        );
        batch.export_format = ExportFormat::with_locator(locator);
        batch.malformed_policy = malformed_policy;
        batch.parameters = parameters;

        RunConfig {
            batch,
            helper: self.helper,
            results_dir: self.results_dir,
        }
    }
}

/// Terminates the supervised process when dropped, including on unwind.
struct TerminateOnExit<'a, L: ProcessLauncher> {
    supervisor: &'a mut ProcessSupervisor<L>,
}

impl<'a, L: ProcessLauncher> TerminateOnExit<'a, L> {
    fn new(supervisor: &'a mut ProcessSupervisor<L>) -> Self {
        Self { supervisor }
    }
}

impl<L: ProcessLauncher> Deref for TerminateOnExit<'_, L> {
    type Target = ProcessSupervisor<L>;

    fn deref(&self) -> &Self::Target {
        self.supervisor
    }
}

impl<L: ProcessLauncher> DerefMut for TerminateOnExit<'_, L> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.supervisor
    }
}

impl<L: ProcessLauncher> Drop for TerminateOnExit<'_, L> {
    fn drop(&mut self) {
        self.supervisor.terminate();
    }
}

pub(super) fn run_batch_command(args: RunArgs) -> Result<i32, CliError> {
    let parameters = load_parameters(args.parameters.as_deref())?;
    let config = args.into_config(parameters);
    config.batch.validate()?;

    let mut driver = HelperDriver::new(
        &config.helper,
        &config.results_dir,
        config.batch.ui_wait_seconds,
    )?;
    if clear_results_files(driver.results_dir())? {
        info!(
            "Cleared leftover exports in '{}'",
            driver.results_dir().display()
        );
    }
    let mut supervisor = ProcessSupervisor::new(SystemLauncher, config.batch.settle);

    let summary = {
        let mut guard = TerminateOnExit::new(&mut supervisor);
        Orchestrator::new(&config.batch, &mut driver, &mut *guard)?.run()?
    };

    if config.batch.clean {
        remove_results_dir(driver.results_dir());
    }
    info!("{}", summary);
    println!("{}", summary.report_path.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::TerminateOnExit;
    use std::cell::Cell;
    use std::io;
    use std::path::Path;
    use std::rc::Rc;
    use std::time::Duration;
    use tempfile::TempDir;
    use triton_core::process::{ManagedProcess, ProcessLauncher, ProcessSupervisor};

    #[derive(Default)]
    struct CountingLauncher {
        terminated: Rc<Cell<usize>>,
    }

    struct CountedProcess {
        terminated: Rc<Cell<usize>>,
    }

    impl ManagedProcess for CountedProcess {
        fn id(&self) -> u32 {
            7
        }

        fn terminate(&mut self) -> io::Result<()> {
            self.terminated.set(self.terminated.get() + 1);
            Ok(())
        }
    }

    impl ProcessLauncher for CountingLauncher {
        type Process = CountedProcess;

        fn launch(&mut self, _executable: &Path) -> io::Result<Self::Process> {
            Ok(CountedProcess {
                terminated: Rc::clone(&self.terminated),
            })
        }
    }

    #[test]
    fn guard_terminates_process_when_scope_ends() {
        let temp = TempDir::new().expect("tempdir should be created");
        let executable = temp.path().join("netuno.exe");
        std::fs::write(&executable, b"").expect("executable stub should be written");

        let launcher = CountingLauncher::default();
        let terminated = Rc::clone(&launcher.terminated);
        let mut supervisor = ProcessSupervisor::new(launcher, Duration::ZERO);
        {
            let mut guard = TerminateOnExit::new(&mut supervisor);
            guard.start(&executable).expect("start should succeed");
            assert!(guard.is_running());
        }

        assert_eq!(terminated.get(), 1);
        assert!(!supervisor.is_running());
    }
}
