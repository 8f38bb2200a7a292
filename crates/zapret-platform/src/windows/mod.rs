//! Windows implementation using the stock `tasklist` / `taskkill` tools
//!
//! Helper commands run without a console window. Scripts are started
//! through `cmd` in a fresh console so the user can see their output.

mod process;
mod tasklist;

pub use process::ConsoleProcess;
pub use tasklist::parse_tasklist_csv;

use std::path::Path;
use std::process::{Command, Output};
use tracing::{debug, info};

use crate::traits::{ProcessControl, ProcessEntry, RunningProcess};
use crate::{PlatformError, Result};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(windows)]
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

/// [`ProcessControl`] backed by `tasklist`, `taskkill` and `cmd`
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskkillControl;

impl TaskkillControl {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessControl for TaskkillControl {
    fn list_processes_by_name(&self, image: &str) -> Result<Vec<ProcessEntry>> {
        let filter = format!("IMAGENAME eq {image}");
        let output = run(hidden("tasklist").args(["/FI", &filter, "/FO", "CSV", "/NH"]))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let entries: Vec<ProcessEntry> = parse_tasklist_csv(&stdout)
            .into_iter()
            .filter(|e| e.image.eq_ignore_ascii_case(image))
            .collect();

        debug!("tasklist found {} '{}' processes", entries.len(), image);
        Ok(entries)
    }

    fn kill_by_name(&self, image: &str) -> Result<()> {
        run(hidden("taskkill").args(["/F", "/IM", image]))?;
        info!("Killed all '{}' processes", image);
        Ok(())
    }

    fn kill_by_pid(&self, pid: u32, tree: bool) -> Result<()> {
        let pid_arg = pid.to_string();
        let mut cmd = hidden("taskkill");
        cmd.arg("/F");
        if tree {
            cmd.arg("/T");
        }
        cmd.args(["/PID", &pid_arg]);

        run(&mut cmd)?;
        info!("Killed process {} (tree: {})", pid, tree);
        Ok(())
    }

    fn spawn_console(&self, script: &Path, working_dir: &Path) -> Result<Box<dyn RunningProcess>> {
        let mut cmd = Command::new("cmd");

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            // /S strips the outer quote pair, keeping paths with spaces and
            // parentheses intact: cmd /S /C ""C:\zapret\general (ALT).bat""
            cmd.raw_arg("/S /C")
                .raw_arg(format!("\"\"{}\"\"", script.display()))
                .creation_flags(CREATE_NEW_CONSOLE);
        }
        #[cfg(not(windows))]
        cmd.arg("/C").arg(script);

        cmd.current_dir(working_dir);

        let child = cmd
            .spawn()
            .map_err(|e| PlatformError::SpawnFailed(format!("{}: {}", script.display(), e)))?;

        info!("Started {} (PID: {})", script.display(), child.id());
        Ok(Box::new(ConsoleProcess::new(child)))
    }
}

/// A command that will not flash a console window
pub(crate) fn hidden(program: &str) -> Command {
    #[allow(unused_mut)]
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    cmd
}

/// Run to completion, turning a non-zero exit into `CommandFailed`
pub(crate) fn run(cmd: &mut Command) -> Result<Output> {
    let command = describe(cmd);
    debug!("Running: {}", command);

    let output = cmd.output()?;
    if output.status.success() {
        return Ok(output);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr.trim().to_string()
    };

    Err(PlatformError::CommandFailed {
        command,
        code: output.status.code(),
        message,
    })
}

fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
