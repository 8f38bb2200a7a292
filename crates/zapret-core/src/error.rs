//! Error types for zapret-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

use crate::state::{ConnectionState, Request};

/// Main error type for launcher operations
#[derive(Error, Debug)]
pub enum Error {
    /// The selected script does not exist on disk
    #[error("Script not found: {}", path.display())]
    ScriptNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// The configuration name is not in the script registry
    #[error("Unknown configuration: {name}")]
    UnknownScript {
        /// Display name that was requested
        name: String,
    },

    /// The script process could not be started
    #[error("Failed to start '{}': {message}", script.display())]
    ProcessStart {
        /// Script that was being launched
        script: PathBuf,
        /// Failure reason
        message: String,
    },

    /// Stopping did not fully succeed
    #[error("Process termination incomplete: {0}")]
    ProcessTermination(String),

    /// A list entry failed validation
    #[error("Invalid entry: {entry}")]
    InvalidEntry {
        /// The rejected entry
        entry: String,
    },

    /// A state change was requested that the current state does not allow
    #[error("Cannot {request} while {state}")]
    InvalidTransition {
        /// State at the time of the request
        state: ConnectionState,
        /// What was requested
        request: Request,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a script-not-found error
    pub fn script_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ScriptNotFound { path: path.into() }
    }

    /// Create a process start error
    pub fn process_start(script: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ProcessStart {
            script: script.into(),
            message: message.into(),
        }
    }

    /// Create an invalid entry error
    pub fn invalid_entry(entry: impl Into<String>) -> Self {
        Self::InvalidEntry {
            entry: entry.into(),
        }
    }
}
