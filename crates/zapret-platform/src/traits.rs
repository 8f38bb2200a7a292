//! Platform-agnostic process control traits
//!
//! The launcher and terminator only talk to the operating system through
//! these traits, so both can be exercised against mocks.

use std::path::Path;
use std::time::Duration;

use crate::Result;

/// One row of a process listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    /// Executable image name, e.g. `winws.exe`
    pub image: String,
    /// Process identifier
    pub pid: u32,
}

/// Process enumeration, kill and spawn capability
///
/// Implemented by [`crate::windows::TaskkillControl`].
#[cfg_attr(test, mockall::automock)]
pub trait ProcessControl: Send + Sync {
    /// List running processes whose image name equals `image`
    fn list_processes_by_name(&self, image: &str) -> Result<Vec<ProcessEntry>>;

    /// Forcefully kill every process with the given image name
    fn kill_by_name(&self, image: &str) -> Result<()>;

    /// Forcefully kill a process, optionally with all of its descendants
    fn kill_by_pid(&self, pid: u32, tree: bool) -> Result<()>;

    /// Start `script` in a new console window with `working_dir` as cwd
    fn spawn_console(&self, script: &Path, working_dir: &Path) -> Result<Box<dyn RunningProcess>>;
}

/// A child process started by [`ProcessControl::spawn_console`]
#[cfg_attr(test, mockall::automock)]
pub trait RunningProcess: Send {
    /// Process identifier
    fn id(&self) -> u32;

    /// Ask the process to exit
    fn terminate(&mut self) -> Result<()>;

    /// Kill the process immediately
    fn kill(&mut self) -> Result<()>;

    /// Wait up to `timeout` for the process to exit
    ///
    /// Returns `true` if it has exited.
    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool>;
}
