use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};

pub trait ManagedProcess {
    fn id(&self) -> u32;
    fn terminate(&mut self) -> io::Result<()>;
}

pub trait ProcessLauncher {
    type Process: ManagedProcess;

    /// Spawns `executable` with no arguments.
    fn launch(&mut self, executable: &Path) -> io::Result<Self::Process>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    type Process = SystemProcess;

    fn launch(&mut self, executable: &Path) -> io::Result<Self::Process> {
        let child = Command::new(executable).stdin(Stdio::null()).spawn()?;
        Ok(SystemProcess { child })
    }
}

#[derive(Debug)]
pub struct SystemProcess {
    child: Child,
}

impl ManagedProcess for SystemProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn terminate(&mut self) -> io::Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        self.child.kill()?;
        self.child.wait().map(|_| ())
    }
}
