//! Handle to a script started in its own console

use std::process::Child;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::traits::RunningProcess;
use crate::Result;

/// Interval between exit checks in [`RunningProcess::wait_timeout`]
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// [`RunningProcess`] wrapping a `std::process::Child`
#[derive(Debug)]
pub struct ConsoleProcess {
    child: Child,
}

impl ConsoleProcess {
    pub fn new(child: Child) -> Self {
        Self { child }
    }
}

impl RunningProcess for ConsoleProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    #[cfg(windows)]
    fn terminate(&mut self) -> Result<()> {
        if let Some(status) = self.child.try_wait()? {
            debug!("Process {} already exited with {:?}", self.child.id(), status);
            return Ok(());
        }

        // taskkill without /F posts a close request instead of killing
        let pid = self.child.id().to_string();
        super::run(super::hidden("taskkill").args(["/PID", &pid]))?;
        debug!("Sent close request to {}", pid);
        Ok(())
    }

    #[cfg(not(windows))]
    fn terminate(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        self.child.kill()?;
        Ok(())
    }

    fn kill(&mut self) -> Result<()> {
        self.child.kill()?;
        debug!("Killed process {}", self.child.id());
        Ok(())
    }

    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                if !status.success() {
                    warn!("Process {} exited with {:?}", self.child.id(), status);
                }
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}
