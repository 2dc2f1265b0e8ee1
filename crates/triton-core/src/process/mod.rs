//! Ownership of the single simulator process.
//!
//! [`ProcessSupervisor`] is an explicit two-state machine. It never stops
//! the process on its own; callers terminate explicitly.

mod launcher;

#[cfg(test)]
pub(crate) use launcher::testing;
pub use launcher::{ManagedProcess, ProcessLauncher, SystemLauncher, SystemProcess};

use crate::domain::{TritonError, TritonResult};
use crate::waiter::pause;
use std::mem;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

enum SupervisorState<P> {
    NoProcess,
    Running { process: P, executable: PathBuf },
}

pub struct ProcessSupervisor<L: ProcessLauncher> {
    launcher: L,
    settle: Duration,
    state: SupervisorState<L::Process>,
}

impl<L: ProcessLauncher> ProcessSupervisor<L> {
    pub fn new(launcher: L, settle: Duration) -> Self {
        Self {
            launcher,
            settle,
            state: SupervisorState::NoProcess,
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SupervisorState::Running { .. })
    }

    pub fn process_id(&self) -> Option<u32> {
        match &self.state {
            SupervisorState::Running { process, .. } => Some(process.id()),
            SupervisorState::NoProcess => None,
        }
    }

    /// Launches `executable`, waits the settle time and returns the process id.
    pub fn start(&mut self, executable: &Path) -> TritonResult<u32> {
        if let SupervisorState::Running { process, .. } = &self.state {
            return Err(TritonError::internal(
                "SUPERVISOR.ALREADY_RUNNING",
                format!("process #{} is still running", process.id()),
            ));
        }
        if !executable.is_file() {
            return Err(TritonError::launch(
                "LAUNCH.EXECUTABLE",
                format!("'{}' is not an executable file", executable.display()),
            ));
        }

        let process = self.launcher.launch(executable).map_err(|source| {
            TritonError::launch(
                "LAUNCH.SPAWN",
                format!("failed to launch '{}': {}", executable.display(), source),
            )
        })?;
        let id = process.id();
        debug!("Spawned process #{} for '{}'", id, executable.display());

        self.state = SupervisorState::Running {
            process,
            executable: executable.to_path_buf(),
        };
        pause(self.settle);
        Ok(id)
    }

    /// Stops the running process best-effort and launches the same executable.
    pub fn restart(&mut self) -> TritonResult<u32> {
        match mem::replace(&mut self.state, SupervisorState::NoProcess) {
            SupervisorState::NoProcess => Err(TritonError::internal(
                "SUPERVISOR.NOT_RUNNING",
                "restart requested while no process is running",
            )),
            SupervisorState::Running {
                mut process,
                executable,
            } => {
                info!("Restarting process #{}", process.id());
                stop(&mut process);
                self.start(&executable)
            }
        }
    }

    /// Stops the running process, if any. Failures are logged and ignored.
    pub fn terminate(&mut self) {
        if let SupervisorState::Running { mut process, .. } =
            mem::replace(&mut self.state, SupervisorState::NoProcess)
        {
            info!("Terminating process #{}", process.id());
            stop(&mut process);
        }
    }
}

fn stop<P: ManagedProcess>(process: &mut P) {
    if let Err(source) = process.terminate() {
        warn!("Failed to terminate process #{}: {}", process.id(), source);
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{LaunchEvent, RecordingLauncher};
    use super::{ProcessSupervisor, SystemLauncher};
    use crate::domain::TritonErrorCategory;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn executable(temp: &TempDir) -> std::path::PathBuf {
        let path = temp.path().join("netuno.exe");
        fs::write(&path, b"").expect("executable stub should be written");
        path
    }

    #[test]
    fn start_records_process_and_returns_id() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = executable(&temp);
        let mut supervisor = ProcessSupervisor::new(RecordingLauncher::default(), Duration::ZERO);

        let id = supervisor.start(&path).expect("start should succeed");
        assert_eq!(id, 1);
        assert!(supervisor.is_running());
        assert_eq!(supervisor.process_id(), Some(1));
        assert_eq!(
            supervisor.launcher().events(),
            vec![LaunchEvent::Launched(1, path)]
        );
    }

    #[test]
    fn restart_terminates_old_process_and_relaunches_same_path() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = executable(&temp);
        let mut supervisor = ProcessSupervisor::new(RecordingLauncher::default(), Duration::ZERO);
        supervisor.start(&path).expect("start should succeed");

        let id = supervisor.restart().expect("restart should succeed");
        assert_eq!(id, 2);
        assert_eq!(
            supervisor.launcher().events(),
            vec![
                LaunchEvent::Launched(1, path.clone()),
                LaunchEvent::Terminated(1),
                LaunchEvent::Launched(2, path),
            ]
        );
    }

    #[test]
    fn restart_ignores_termination_failures() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = executable(&temp);
        let mut supervisor =
            ProcessSupervisor::new(RecordingLauncher::failing_terminate(), Duration::ZERO);
        supervisor.start(&path).expect("start should succeed");

        supervisor.restart().expect("restart should tolerate termination failure");
        assert_eq!(supervisor.launcher().launch_count(), 2);
        assert_eq!(supervisor.launcher().termination_count(), 1);
    }

    #[test]
    fn restart_without_process_is_internal_error() {
        let mut supervisor = ProcessSupervisor::new(RecordingLauncher::default(), Duration::ZERO);
        let error = supervisor.restart().expect_err("restart should fail");
        assert_eq!(error.category(), TritonErrorCategory::Internal);
        assert_eq!(error.code(), "SUPERVISOR.NOT_RUNNING");
    }

    #[test]
    fn terminate_returns_to_no_process_and_is_idempotent() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = executable(&temp);
        let mut supervisor = ProcessSupervisor::new(RecordingLauncher::default(), Duration::ZERO);
        supervisor.start(&path).expect("start should succeed");

        supervisor.terminate();
        supervisor.terminate();
        assert!(!supervisor.is_running());
        assert_eq!(supervisor.launcher().termination_count(), 1);
    }

    #[test]
    fn start_rejects_missing_executable_and_spawn_failures() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut supervisor = ProcessSupervisor::new(SystemLauncher, Duration::ZERO);
        let error = supervisor
            .start(&temp.path().join("missing.exe"))
            .expect_err("missing executable should fail");
        assert_eq!(error.category(), TritonErrorCategory::Launch);
        assert_eq!(error.code(), "LAUNCH.EXECUTABLE");

        let path = executable(&temp);
        let mut supervisor =
            ProcessSupervisor::new(RecordingLauncher::failing_launch(), Duration::ZERO);
        let error = supervisor.start(&path).expect_err("spawn failure should fail");
        assert_eq!(error.code(), "LAUNCH.SPAWN");
        assert!(!supervisor.is_running());
    }

    #[test]
    fn start_while_running_is_internal_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = executable(&temp);
        let mut supervisor = ProcessSupervisor::new(RecordingLauncher::default(), Duration::ZERO);
        supervisor.start(&path).expect("start should succeed");

        let error = supervisor.start(&path).expect_err("second start should fail");
        assert_eq!(error.code(), "SUPERVISOR.ALREADY_RUNNING");
        assert_eq!(supervisor.launcher().launch_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn system_launcher_spawns_and_reaps_real_process() {
        let mut supervisor = ProcessSupervisor::new(SystemLauncher, Duration::ZERO);
        let id = supervisor
            .start(std::path::Path::new("/bin/sh"))
            .expect("shell should launch");
        assert!(id > 0);
        supervisor.terminate();
        assert!(!supervisor.is_running());
    }
}
