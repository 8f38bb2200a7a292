//! Connection state machine
//!
//! ```text
//! Disconnected --connect--> Connecting --launched--> Connected
//!                           Connecting --failed----> Disconnected
//! Connected --disconnect--> Connecting --stopped---> Disconnected
//! ```
//!
//! Only one transition may be in flight at a time. There is no "stuck
//! connected" state: a finished disconnect always lands in `Disconnected`,
//! whatever the terminator reported.

use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};

/// Connection status shown by the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Nothing running
    #[default]
    Disconnected,
    /// A connect or disconnect is in progress
    Connecting,
    /// Script launched and running
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-initiated transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Connect,
    Disconnect,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Connect => f.write_str("connect"),
            Request::Disconnect => f.write_str("disconnect"),
        }
    }
}

/// Tracks the tri-state connection flag and the transition in flight
#[derive(Debug, Default)]
pub struct ConnectionMachine {
    state: ConnectionState,
    pending: Option<Request>,
}

impl ConnectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Transition currently in flight, if any
    pub fn pending(&self) -> Option<Request> {
        self.pending
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Trigger and selector are disabled while a transition runs
    pub fn controls_enabled(&self) -> bool {
        self.pending.is_none()
    }

    /// Start a transition, moving to `Connecting`
    pub fn begin(&mut self, request: Request) -> Result<()> {
        let allowed = match request {
            Request::Connect => self.state == ConnectionState::Disconnected,
            Request::Disconnect => self.state == ConnectionState::Connected,
        };

        if !allowed || self.pending.is_some() {
            return Err(Error::InvalidTransition {
                state: self.state,
                request,
            });
        }

        debug!("{} requested while {}", request, self.state);
        self.state = ConnectionState::Connecting;
        self.pending = Some(request);
        Ok(())
    }

    /// Complete an in-flight connect
    pub fn finish_connect(&mut self, launched: bool) -> Result<ConnectionState> {
        self.expect_pending(Request::Connect)?;
        self.pending = None;
        self.state = if launched {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        Ok(self.state)
    }

    /// Complete an in-flight disconnect
    pub fn finish_disconnect(&mut self) -> Result<ConnectionState> {
        self.expect_pending(Request::Disconnect)?;
        self.pending = None;
        self.state = ConnectionState::Disconnected;
        Ok(self.state)
    }

    fn expect_pending(&self, request: Request) -> Result<()> {
        if self.pending == Some(request) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                state: self.state,
                request,
            })
        }
    }
}
