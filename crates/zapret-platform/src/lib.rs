//! Zapret Platform Layer
//!
//! Starting and stopping zapret scripts.
//!
//! ## Components
//!
//! - [`Launcher`]: starts a script in a new console window
//! - [`Terminator`]: stops the helper, the script process tree, and
//!   stray console hosts
//! - [`ProcessControl`]: the operating system seam both of them use,
//!   implemented for Windows by [`TaskkillControl`]

#![warn(clippy::all)]

mod error;
pub use error::{PlatformError, Result};

// Platform-agnostic traits
mod traits;
pub use traits::{ProcessControl, ProcessEntry, RunningProcess};

pub mod windows;
pub use windows::TaskkillControl;

mod launcher;
mod terminator;

pub use launcher::Launcher;
pub use terminator::{
    TerminationReport, Terminator, EXIT_TIMEOUT, HELPER_IMAGE, SETTLE_DELAY, SHELL_IMAGE,
};
