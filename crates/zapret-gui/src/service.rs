//! Connection controller - launches and stops the selected script
//!
//! Launching and terminating block on external commands, so each
//! transition runs on a short-lived worker thread. The worker reports back
//! over a channel and the UI thread applies the result in [`poll`].
//!
//! [`poll`]: ConnectionController::poll

use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use zapret_core::{ConnectionMachine, ConnectionState, Request, Result};
use zapret_platform::{
    Launcher, ProcessControl, RunningProcess, TaskkillControl, TerminationReport, Terminator,
};

/// Worker results
enum Outcome {
    Launched(Result<Box<dyn RunningProcess>>),
    Stopped(TerminationReport),
}

/// Completed transitions, for the UI to report
#[derive(Debug)]
pub enum ControllerEvent {
    /// The script is running
    Connected { config: String },
    /// The script could not be started
    ConnectFailed { config: String, error: String },
    /// Termination finished, successfully or not
    Disconnected {
        config: String,
        report: TerminationReport,
    },
}

/// Owns the connection state and the running script handle
pub struct ConnectionController {
    machine: ConnectionMachine,
    process: Option<Box<dyn RunningProcess>>,
    config: Option<String>,
    launcher: Launcher,
    terminator: Terminator,
    outcome_tx: Sender<Outcome>,
    outcome_rx: Receiver<Outcome>,
}

impl ConnectionController {
    /// Create a controller using the given process control backend
    pub fn new(control: Arc<dyn ProcessControl>) -> Self {
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded();

        Self {
            machine: ConnectionMachine::new(),
            process: None,
            config: None,
            launcher: Launcher::new(control.clone()),
            terminator: Terminator::new(control),
            outcome_tx,
            outcome_rx,
        }
    }

    /// Replace the terminator (used to shorten its delays)
    #[cfg(test)]
    pub fn with_terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    pub fn pending(&self) -> Option<Request> {
        self.machine.pending()
    }

    pub fn is_connected(&self) -> bool {
        self.machine.is_connected()
    }

    pub fn controls_enabled(&self) -> bool {
        self.machine.controls_enabled()
    }

    /// Configuration that is running or being started/stopped
    pub fn active_config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// PID of the running script, if any
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|p| p.id())
    }

    /// Start launching `script` in the background
    pub fn connect(&mut self, config: &str, script: PathBuf) -> Result<()> {
        self.machine.begin(Request::Connect)?;
        info!("Connecting: {}", config);
        self.config = Some(config.to_string());

        let launcher = self.launcher.clone();
        let tx = self.outcome_tx.clone();
        std::thread::spawn(move || {
            let result = launcher.launch(&script);
            let _ = tx.send(Outcome::Launched(result));
        });

        Ok(())
    }

    /// Start stopping the running script in the background
    pub fn disconnect(&mut self) -> Result<()> {
        self.machine.begin(Request::Disconnect)?;
        info!("Disconnecting: {}", self.config.as_deref().unwrap_or("-"));

        // Moving the handle into the worker clears it here
        let process = self.process.take();
        let terminator = self.terminator.clone();
        let tx = self.outcome_tx.clone();
        std::thread::spawn(move || {
            let report = terminator.terminate(process);
            let _ = tx.send(Outcome::Stopped(report));
        });

        Ok(())
    }

    /// Apply a finished transition, if one is waiting
    pub fn poll(&mut self) -> Option<ControllerEvent> {
        let outcome = self.outcome_rx.try_recv().ok()?;
        self.apply(outcome)
    }

    /// Block up to `timeout` for the in-flight transition to finish
    pub fn wait(&mut self, timeout: Duration) -> Option<ControllerEvent> {
        let outcome = self.outcome_rx.recv_timeout(timeout).ok()?;
        self.apply(outcome)
    }

    /// Stop everything synchronously, e.g. before the window closes
    ///
    /// Waits for an in-flight transition first. Returns `None` when nothing
    /// was running.
    pub fn shutdown(&mut self) -> Option<TerminationReport> {
        if self.machine.pending().is_some() {
            // Launch waits are short; termination can take EXIT_TIMEOUT twice
            let _ = self.wait(Duration::from_secs(15));
        }

        if !self.machine.is_connected() {
            return None;
        }

        if let Err(e) = self.machine.begin(Request::Disconnect) {
            error!("Shutdown: {}", e);
            return None;
        }

        let report = self.terminator.terminate(self.process.take());
        if let Err(e) = self.machine.finish_disconnect() {
            error!("Shutdown: {}", e);
        }
        info!("Shutdown complete");
        Some(report)
    }

    fn apply(&mut self, outcome: Outcome) -> Option<ControllerEvent> {
        let config = self.config.clone().unwrap_or_default();

        match outcome {
            Outcome::Launched(Ok(process)) => {
                if let Err(e) = self.machine.finish_connect(true) {
                    error!("Unexpected launch completion: {}", e);
                    return None;
                }
                info!("Connected: {} (PID: {})", config, process.id());
                self.process = Some(process);
                Some(ControllerEvent::Connected { config })
            }
            Outcome::Launched(Err(err)) => {
                if let Err(e) = self.machine.finish_connect(false) {
                    error!("Unexpected launch completion: {}", e);
                    return None;
                }
                error!("Failed to connect {}: {}", config, err);
                self.config = None;
                Some(ControllerEvent::ConnectFailed {
                    config,
                    error: err.to_string(),
                })
            }
            Outcome::Stopped(report) => {
                if let Err(e) = self.machine.finish_disconnect() {
                    error!("Unexpected stop completion: {}", e);
                    return None;
                }
                if let Err(e) = report.into_result() {
                    warn!("Disconnected: {}", e);
                }
                self.config = None;
                Some(ControllerEvent::Disconnected { config, report })
            }
        }
    }
}

impl Default for ConnectionController {
    fn default() -> Self {
        Self::new(Arc::new(TaskkillControl::new()))
    }
}

impl Drop for ConnectionController {
    fn drop(&mut self) {
        if self.process.is_some() {
            let _ = self.terminator.terminate(self.process.take());
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::{controller, spawning_control, MockControl, MockProcess};
    use super::*;
    use zapret_platform::{PlatformError, ProcessEntry};

    const WAIT: Duration = Duration::from_secs(5);

    fn script(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("general (ALT).bat");
        std::fs::write(&path, "@echo off").unwrap();
        path
    }

    #[test]
    fn test_connect_and_disconnect() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(spawning_control());

        ctl.connect("general (ALT)", script(&dir)).unwrap();
        assert_eq!(ctl.state(), ConnectionState::Connecting);
        assert!(!ctl.controls_enabled());

        match ctl.wait(WAIT) {
            Some(ControllerEvent::Connected { config }) => assert_eq!(config, "general (ALT)"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(ctl.is_connected());
        assert_eq!(ctl.pid(), Some(31337));

        ctl.disconnect().unwrap();
        assert_eq!(ctl.state(), ConnectionState::Connecting);
        assert_eq!(ctl.pending(), Some(Request::Disconnect));
        assert_eq!(ctl.pid(), None);

        match ctl.wait(WAIT) {
            Some(ControllerEvent::Disconnected { report, .. }) => assert!(report.success()),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(ctl.state(), ConnectionState::Disconnected);
        assert!(ctl.active_config().is_none());
    }

    #[test]
    fn test_missing_script_stays_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let mut control = MockControl::new();
        control.expect_spawn_console().never();
        let mut ctl = controller(control);

        ctl.connect("general (ALT4)", dir.path().join("general (ALT4).bat")).unwrap();

        match ctl.wait(WAIT) {
            Some(ControllerEvent::ConnectFailed { error, .. }) => {
                assert!(error.contains("Script not found"))
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(ctl.state(), ConnectionState::Disconnected);
        assert!(ctl.controls_enabled());
    }

    #[test]
    fn test_rejects_second_connect_while_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(spawning_control());

        ctl.connect("general (ALT)", script(&dir)).unwrap();
        assert!(ctl.connect("general (ALT2)", script(&dir)).is_err());
        assert_eq!(ctl.active_config(), Some("general (ALT)"));

        ctl.wait(WAIT);
        assert!(ctl.shutdown().is_some());
    }

    #[test]
    fn test_failed_termination_still_disconnects() {
        let dir = tempfile::tempdir().unwrap();
        let mut control = MockControl::new();
        control.expect_spawn_console().returning(|_, _| {
            let mut process = MockProcess::new();
            process.expect_id().return_const(5u32);
            process.expect_wait_timeout().returning(|_| Ok(true));
            Ok(Box::new(process) as Box<dyn RunningProcess>)
        });
        control.expect_list_processes_by_name().returning(|_| {
            Ok(vec![ProcessEntry {
                image: "winws.exe".into(),
                pid: 9,
            }])
        });
        control.expect_kill_by_name().returning(|_| {
            Err(PlatformError::CommandFailed {
                command: "taskkill".into(),
                code: Some(1),
                message: "Access is denied.".into(),
            })
        });
        control.expect_kill_by_pid().returning(|_, _| Ok(()));
        let mut ctl = controller(control);

        ctl.connect("general (ALT)", script(&dir)).unwrap();
        ctl.wait(WAIT);
        ctl.disconnect().unwrap();

        match ctl.wait(WAIT) {
            Some(ControllerEvent::Disconnected { report, .. }) => {
                assert!(!report.helper_stopped);
                assert!(report.process_stopped);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(ctl.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_shutdown_when_idle() {
        let mut ctl = controller(MockControl::new());
        assert!(ctl.shutdown().is_none());
        assert!(ctl.poll().is_none());
    }
}
