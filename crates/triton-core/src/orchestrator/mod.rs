//! Batch loop over a directory of precipitation files.
//!
//! For each file the orchestrator asks the driver for a simulation, waits
//! for the export, parses it and buffers the flattened rows in the sink.
//! The simulator is restarted every `restart_every` files and the sink is
//! flushed every `save_every` processed files, so a crash loses at most the
//! rows gathered since the last save.

mod inputs;
mod summary;

pub use inputs::InputFiles;
pub use summary::BatchSummary;

use crate::common::config::{BatchConfig, MalformedPolicy};
use crate::domain::{DriverMode, SimulationRun, TritonError, TritonResult};
use crate::driver::SimulationDriver;
use crate::parser::{extract_metadata, parse_results};
use crate::process::{ProcessLauncher, ProcessSupervisor};
use crate::sink::{FlushOutcome, ResultSink};
use crate::waiter::wait_for_readable;
use std::fs;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub struct Orchestrator<'a, D, L>
where
    D: SimulationDriver,
    L: ProcessLauncher,
{
    config: &'a BatchConfig,
    driver: &'a mut D,
    supervisor: &'a mut ProcessSupervisor<L>,
    sink: ResultSink,
    next_mode: DriverMode,
    summary: BatchSummary,
}

impl<'a, D, L> Orchestrator<'a, D, L>
where
    D: SimulationDriver,
    L: ProcessLauncher,
{
    pub fn new(
        config: &'a BatchConfig,
        driver: &'a mut D,
        supervisor: &'a mut ProcessSupervisor<L>,
    ) -> TritonResult<Self> {
        let sink = ResultSink::new(&config.output_dir)?;
        Ok(Self::with_sink(config, driver, supervisor, sink))
    }

    pub fn with_sink(
        config: &'a BatchConfig,
        driver: &'a mut D,
        supervisor: &'a mut ProcessSupervisor<L>,
        sink: ResultSink,
    ) -> Self {
        let summary = BatchSummary::new(sink.output_path().to_path_buf());
        Self {
            config,
            driver,
            supervisor,
            sink,
            next_mode: DriverMode::Fresh,
            summary,
        }
    }

    /// Runs the whole batch. The simulator is launched here if it is not
    /// running yet but is never terminated; that is left to the caller.
    pub fn run(mut self) -> TritonResult<BatchSummary> {
        let mut inputs = InputFiles::new(&self.config.input_dir)?.peekable();
        if inputs.peek().is_none() {
            return Err(TritonError::empty_input_directory(
                "INPUT.EMPTY_DIRECTORY",
                format!(
                    "'{}' contains no precipitation files",
                    self.config.input_dir.display()
                ),
            ));
        }

        if !self.supervisor.is_running() {
            self.supervisor.start(&self.config.simulator_path)?;
        }

        for (position, input) in inputs.enumerate() {
            if let Err(error) = self.step(position, input) {
                self.flush_before_abort();
                return Err(error);
            }
        }

        self.save()?;
        info!("Batch finished: {}", self.summary);
        Ok(self.summary)
    }

    fn step(&mut self, position: usize, input: TritonResult<PathBuf>) -> TritonResult<()> {
        let input = input?;

        if position > 0 && position % self.config.restart_every == 0 {
            info!("Restarting simulator after {} file(s)", position);
            self.supervisor.restart()?;
            self.summary.restarts += 1;
            self.next_mode = DriverMode::Fresh;
        }

        match self.simulate(position, &input) {
            Ok(()) => {
                self.summary.processed += 1;
                if self.summary.processed % self.config.save_every == 0 {
                    self.save()?;
                }
                Ok(())
            }
            Err(error)
                if error.category().is_per_file()
                    && self.config.malformed_policy == MalformedPolicy::Skip =>
            {
                warn!("Skipping '{}': {}", input.display(), error);
                self.summary.skipped += 1;
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    fn simulate(&mut self, position: usize, input: &Path) -> TritonResult<()> {
        let metadata = extract_metadata(input)?;
        let start_date = self.config.calendar.start_date(&metadata.scenario);
        let run = SimulationRun::new(input, start_date);
        remove_stale_export(&self.driver.export_path(input)?)?;

        let mode = mem::replace(&mut self.next_mode, DriverMode::Warm);
        info!(
            "[{}] Simulating {} from {} ({} run)",
            position + 1,
            metadata,
            run.start_date,
            mode
        );
        let export = match mode {
            DriverMode::Fresh => {
                self.summary.fresh_runs += 1;
                self.driver
                    .configure_and_run(&run, &self.config.parameters)?
            }
            DriverMode::Warm => {
                self.summary.warm_runs += 1;
                self.driver.rerun(&run)?
            }
        };

        wait_for_readable(&export, self.config.wait_policy)?;
        let parsed = parse_results(&export, &self.config.export_format);
        if self.config.clean {
            self.discard_export(&export);
        }

        let rows = parsed?.to_rows(&metadata);
        debug!("Buffered {} row(s) for {}", rows.len(), metadata);
        self.sink.add(rows);
        Ok(())
    }

    fn discard_export(&self, export: &Path) {
        match fs::remove_file(export) {
            Ok(()) => debug!("Deleted export '{}'", export.display()),
            Err(source) => warn!("Failed to delete export '{}': {}", export.display(), source),
        }
    }

    fn save(&mut self) -> TritonResult<()> {
        if let FlushOutcome::Written(_) = self.sink.flush()? {
            self.summary.flushes += 1;
        }
        Ok(())
    }

    fn flush_before_abort(&mut self) {
        if self.sink.pending() == 0 {
            return;
        }
        match self.sink.flush() {
            Ok(_) => {
                self.summary.flushes += 1;
                info!(
                    "Saved buffered results to '{}' before aborting",
                    self.sink.output_path().display()
                );
            }
            Err(flush_error) => error!("Failed to save buffered results: {}", flush_error),
        }
    }
}

/// Anything left at the export path would satisfy the readable wait before
/// the simulator has written the new results.
fn remove_stale_export(export: &Path) -> TritonResult<()> {
    match fs::remove_file(export) {
        Ok(()) => {
            debug!("Removed stale export '{}'", export.display());
            Ok(())
        }
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(TritonError::io_system(
            "IO.STALE_EXPORT",
            format!(
                "failed to remove stale export '{}': {}",
                export.display(),
                source
            ),
        )),
    }
}
