//! Platform-specific errors

use thiserror::Error;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// An external command ran but reported failure
    #[error("Command '{command}' failed ({code:?}): {message}")]
    CommandFailed {
        /// Command line that was run
        command: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured stderr/stdout
        message: String,
    },

    /// The process could not be spawned
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform result type
pub type Result<T> = std::result::Result<T, PlatformError>;
