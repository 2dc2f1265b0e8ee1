//! Simulator UI automation.
//!
//! The keystroke choreography lives behind [`SimulationDriver`]. A fresh
//! simulator needs every field typed in; a warm one keeps the parameters
//! from the previous run and only needs the new file and start date.

mod helper;

pub use helper::HelperDriver;

use crate::domain::{SimulationParameters, SimulationRun, TritonResult};
use std::path::{Path, PathBuf};

pub trait SimulationDriver {
    /// Where the export for `input` will be written. Anything already at
    /// this path is removed before the run so a stale file is never read.
    fn export_path(&self, input: &Path) -> TritonResult<PathBuf>;

    /// Types every parameter into a freshly launched simulator, runs it and
    /// exports the results. Returns the export path.
    fn configure_and_run(
        &mut self,
        run: &SimulationRun,
        parameters: &SimulationParameters,
    ) -> TritonResult<PathBuf>;

    /// Reruns an already configured simulator with a new file and start date.
    fn rerun(&mut self, run: &SimulationRun) -> TritonResult<PathBuf>;
}
