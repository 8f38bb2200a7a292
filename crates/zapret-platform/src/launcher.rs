//! Script launcher

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use zapret_core::{Error, Result};

use crate::traits::{ProcessControl, RunningProcess};

/// Starts scripts in their own console window
#[derive(Clone)]
pub struct Launcher {
    control: Arc<dyn ProcessControl>,
}

impl Launcher {
    pub fn new(control: Arc<dyn ProcessControl>) -> Self {
        Self { control }
    }

    /// Start `script`, returning a handle to the new process
    ///
    /// The script runs with its own directory as working directory. A
    /// missing file is reported as `ScriptNotFound` before anything is
    /// spawned; spawn failures become `ProcessStart`. Nothing is retried.
    pub fn launch(&self, script: &Path) -> Result<Box<dyn RunningProcess>> {
        if !script.exists() {
            error!("Script not found: {}", script.display());
            return Err(Error::script_not_found(script));
        }

        let script_path = absolute(script)?;
        let working_dir = script_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        info!("Launching: {}", script_path.display());
        info!("Working directory: {}", working_dir.display());

        let process = self
            .control
            .spawn_console(&script_path, &working_dir)
            .map_err(|e| {
                error!("Failed to launch {}: {}", script_path.display(), e);
                Error::process_start(&script_path, e.to_string())
            })?;

        info!("Script running (PID: {})", process.id());
        Ok(process)
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
