//! Script and helper termination
//!
//! Stopping zapret is best effort. Scripts start `winws.exe` indirectly,
//! so the helper is hunted down by image name rather than through the
//! recorded handle. The handle itself gets a forced tree kill, falling back
//! to a soft terminate and finally a hard kill if it does not exit in time.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use zapret_core::Error;

use crate::traits::{ProcessControl, RunningProcess};
use crate::Result;

/// DPI helper started by the zapret scripts
pub const HELPER_IMAGE: &str = "winws.exe";
/// Console host left behind by `cmd /c`
pub const SHELL_IMAGE: &str = "cmd.exe";
/// Pause between killing the helper and checking that it is gone
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);
/// How long the script process gets to exit before a hard kill
pub const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of [`Terminator::terminate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationReport {
    /// The helper is no longer running
    pub helper_stopped: bool,
    /// The recorded script process is gone (trivially true without one)
    pub process_stopped: bool,
}

impl TerminationReport {
    pub fn success(&self) -> bool {
        self.helper_stopped && self.process_stopped
    }

    /// `ProcessTermination` naming what is still alive
    pub fn into_result(self) -> zapret_core::Result<()> {
        let leftover = match (self.helper_stopped, self.process_stopped) {
            (true, true) => return Ok(()),
            (false, true) => format!("{HELPER_IMAGE} is still running"),
            (true, false) => "the script process did not exit".to_string(),
            (false, false) => format!("{HELPER_IMAGE} and the script process are still running"),
        };
        Err(Error::ProcessTermination(leftover))
    }
}

/// Stops the helper, the recorded script process, and stray shells
#[derive(Clone)]
pub struct Terminator {
    control: Arc<dyn ProcessControl>,
    helper_image: String,
    shell_image: String,
    settle_delay: Duration,
    exit_timeout: Duration,
}

impl Terminator {
    pub fn new(control: Arc<dyn ProcessControl>) -> Self {
        Self {
            control,
            helper_image: HELPER_IMAGE.to_string(),
            shell_image: SHELL_IMAGE.to_string(),
            settle_delay: SETTLE_DELAY,
            exit_timeout: EXIT_TIMEOUT,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_exit_timeout(mut self, timeout: Duration) -> Self {
        self.exit_timeout = timeout;
        self
    }

    /// Run both termination passes, then sweep orphaned shells
    ///
    /// The handle is consumed whatever happens, so the caller's record of
    /// it is always cleared.
    pub fn terminate(&self, process: Option<Box<dyn RunningProcess>>) -> TerminationReport {
        let helper_stopped = self.sweep_helper();

        let process_stopped = match process {
            Some(process) => self.stop_process(process),
            None => {
                debug!("No script process on record");
                true
            }
        };

        self.sweep_shells();

        let report = TerminationReport {
            helper_stopped,
            process_stopped,
        };
        match report.into_result() {
            Ok(()) => info!("All processes stopped"),
            Err(e) => warn!("{}", e),
        }
        report
    }

    /// Kill every helper process by image name and confirm it is gone
    pub fn sweep_helper(&self) -> bool {
        match self.try_sweep_helper() {
            Ok(stopped) => stopped,
            Err(e) => {
                error!("Error while stopping {}: {}", self.helper_image, e);
                false
            }
        }
    }

    fn try_sweep_helper(&self) -> Result<bool> {
        let image = self.helper_image.as_str();

        if self.control.list_processes_by_name(image)?.is_empty() {
            info!("{} is not running", image);
            return Ok(true);
        }

        info!("{} is running, killing", image);
        if let Err(e) = self.control.kill_by_name(image) {
            // The re-check below decides the outcome
            warn!("taskkill for {} reported: {}", image, e);
        }

        std::thread::sleep(self.settle_delay);

        if self.control.list_processes_by_name(image)?.is_empty() {
            info!("{} stopped", image);
            Ok(true)
        } else {
            warn!("{} is still running", image);
            Ok(false)
        }
    }

    /// Stop the recorded script process and its descendants
    ///
    /// Success means the process is gone afterwards. Kill errors alone do
    /// not count, since a script that already exited cannot be killed.
    pub fn stop_process(&self, mut process: Box<dyn RunningProcess>) -> bool {
        let pid = process.id();

        match self.control.kill_by_pid(pid, true) {
            Ok(()) => info!("Script process tree killed (PID: {})", pid),
            Err(e) => {
                warn!("Tree kill failed for PID {}: {}", pid, e);
                match process.terminate() {
                    Ok(()) => info!("Sent terminate to PID {}", pid),
                    Err(e) => warn!("Could not terminate PID {}: {}", pid, e),
                }
            }
        }

        let exited = match process.wait_timeout(self.exit_timeout) {
            Ok(exited) => exited,
            Err(e) => {
                warn!("Waiting for PID {} failed: {}", pid, e);
                false
            }
        };

        if exited {
            info!("Script process exited (PID: {})", pid);
            return true;
        }

        warn!("PID {} still alive after {:?}, killing", pid, self.exit_timeout);
        let killed = process
            .kill()
            .and_then(|()| process.wait_timeout(self.exit_timeout));

        match killed {
            Ok(true) => {
                info!("Script process killed (PID: {})", pid);
                true
            }
            Ok(false) => {
                error!("PID {} survived a hard kill", pid);
                false
            }
            Err(e) => {
                error!("Hard kill of PID {} failed: {}", pid, e);
                false
            }
        }
    }

    /// Force-kill leftover console hosts; failures are ignored
    pub fn sweep_shells(&self) {
        match self.control.kill_by_name(&self.shell_image) {
            Ok(()) => info!("Killed all {} processes", self.shell_image),
            Err(e) => debug!("No {} processes killed: {}", self.shell_image, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockProcessControl, MockRunningProcess, ProcessEntry};
    use crate::PlatformError;

    fn helper_entry() -> ProcessEntry {
        ProcessEntry {
            image: HELPER_IMAGE.to_string(),
            pid: 1000,
        }
    }

    fn command_failed() -> PlatformError {
        PlatformError::CommandFailed {
            command: "taskkill".into(),
            code: Some(128),
            message: "not found".into(),
        }
    }

    fn terminator(control: MockProcessControl) -> Terminator {
        Terminator::new(Arc::new(control))
            .with_settle_delay(Duration::ZERO)
            .with_exit_timeout(Duration::ZERO)
    }

    /// Helper listing yields `first` on the first call, then `after`
    fn expect_helper_listings(control: &mut MockProcessControl, first: Vec<ProcessEntry>, after: Vec<ProcessEntry>) {
        let mut calls = 0;
        control
            .expect_list_processes_by_name()
            .withf(|image| image == HELPER_IMAGE)
            .returning(move |_| {
                calls += 1;
                Ok(if calls == 1 { first.clone() } else { after.clone() })
            });
    }

    fn expect_shell_sweep(control: &mut MockProcessControl) {
        control
            .expect_kill_by_name()
            .withf(|image| image == SHELL_IMAGE)
            .times(1)
            .returning(|_| Err(command_failed()));
    }

    #[test]
    fn test_nothing_running_succeeds_trivially() {
        let mut control = MockProcessControl::new();
        expect_helper_listings(&mut control, vec![], vec![]);
        control
            .expect_kill_by_name()
            .withf(|image| image == HELPER_IMAGE)
            .never();
        control.expect_kill_by_pid().never();
        expect_shell_sweep(&mut control);

        let report = terminator(control).terminate(None);

        assert!(report.helper_stopped);
        assert!(report.process_stopped);
        assert!(report.success());
    }

    #[test]
    fn test_report_names_leftovers() {
        let report = TerminationReport {
            helper_stopped: false,
            process_stopped: true,
        };
        match report.into_result() {
            Err(Error::ProcessTermination(msg)) => assert_eq!(msg, "winws.exe is still running"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_helper_killed_and_confirmed() {
        let mut control = MockProcessControl::new();
        expect_helper_listings(&mut control, vec![helper_entry()], vec![]);
        control
            .expect_kill_by_name()
            .withf(|image| image == HELPER_IMAGE)
            .times(1)
            .returning(|_| Ok(()));
        expect_shell_sweep(&mut control);

        assert!(terminator(control).terminate(None).success());
    }

    #[test]
    fn test_helper_survives_kill() {
        let mut control = MockProcessControl::new();
        expect_helper_listings(&mut control, vec![helper_entry()], vec![helper_entry()]);
        control
            .expect_kill_by_name()
            .withf(|image| image == HELPER_IMAGE)
            .returning(|_| Err(command_failed()));
        expect_shell_sweep(&mut control);

        let report = terminator(control).terminate(None);
        assert!(!report.helper_stopped);
        assert!(!report.success());
    }

    #[test]
    fn test_listing_error_counts_as_failure() {
        let mut control = MockProcessControl::new();
        control
            .expect_list_processes_by_name()
            .returning(|_| Err(PlatformError::Io(std::io::ErrorKind::NotFound.into())));

        assert!(!terminator(control).sweep_helper());
    }

    #[test]
    fn test_tree_kill_then_exit() {
        let mut control = MockProcessControl::new();
        expect_helper_listings(&mut control, vec![], vec![]);
        control
            .expect_kill_by_pid()
            .withf(|pid, tree| *pid == 77 && *tree)
            .times(1)
            .returning(|_, _| Ok(()));
        expect_shell_sweep(&mut control);

        let mut process = MockRunningProcess::new();
        process.expect_id().return_const(77u32);
        process.expect_terminate().never();
        process.expect_wait_timeout().times(1).returning(|_| Ok(true));
        process.expect_kill().never();

        let report = terminator(control).terminate(Some(Box::new(process)));
        assert!(report.process_stopped);
        assert!(report.success());
    }

    #[test]
    fn test_falls_back_to_terminate_then_kill() {
        let mut control = MockProcessControl::new();
        control
            .expect_kill_by_pid()
            .returning(|_, _| Err(command_failed()));

        let mut process = MockRunningProcess::new();
        process.expect_id().return_const(77u32);
        process.expect_terminate().times(1).returning(|| Ok(()));
        let mut waits = 0;
        process.expect_wait_timeout().times(2).returning(move |_| {
            waits += 1;
            Ok(waits > 1)
        });
        process.expect_kill().times(1).returning(|| Ok(()));

        assert!(terminator(control).stop_process(Box::new(process)));
    }

    #[test]
    fn test_already_exited_script_counts_as_stopped() {
        // cmd exits right after `start winws.exe`, so both kills miss
        let mut control = MockProcessControl::new();
        expect_helper_listings(&mut control, vec![], vec![]);
        control
            .expect_kill_by_pid()
            .times(1)
            .returning(|_, _| Err(command_failed()));
        expect_shell_sweep(&mut control);

        let mut process = MockRunningProcess::new();
        process.expect_id().return_const(77u32);
        process
            .expect_terminate()
            .times(1)
            .returning(|| Err(command_failed()));
        process.expect_wait_timeout().times(1).returning(|_| Ok(true));
        process.expect_kill().never();

        let report = terminator(control).terminate(Some(Box::new(process)));
        assert!(report.process_stopped);
        assert!(report.success());
    }

    #[test]
    fn test_failed_terminate_and_kill_is_reported() {
        let mut control = MockProcessControl::new();
        control
            .expect_kill_by_pid()
            .returning(|_, _| Err(command_failed()));

        let mut process = MockRunningProcess::new();
        process.expect_id().return_const(77u32);
        process
            .expect_terminate()
            .returning(|| Err(PlatformError::SpawnFailed("denied".into())));
        process.expect_wait_timeout().returning(|_| Ok(false));
        process.expect_kill().times(1).returning(|| Ok(()));

        assert!(!terminator(control).stop_process(Box::new(process)));
    }

    #[test]
    fn test_failed_hard_kill_is_reported() {
        let mut control = MockProcessControl::new();
        control.expect_kill_by_pid().returning(|_, _| Ok(()));

        let mut process = MockRunningProcess::new();
        process.expect_id().return_const(77u32);
        process.expect_wait_timeout().returning(|_| Ok(false));
        process
            .expect_kill()
            .returning(|| Err(PlatformError::Io(std::io::ErrorKind::PermissionDenied.into())));

        assert!(!terminator(control).stop_process(Box::new(process)));
    }
}
