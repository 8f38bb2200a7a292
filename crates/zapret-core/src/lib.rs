//! # Zapret Launcher Core
//!
//! Platform-independent pieces of the zapret launcher.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Script registry** - the fixed set of launchable configurations
//! - **Connection state** - the connect/disconnect state machine
//! - **Domain lists** - entry validation and list file persistence
//!
//! Starting and stopping processes lives in `zapret-platform`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zapret_core::lists::ListKind;
//! use std::path::Path;
//!
//! let list = ListKind::General.open(Path::new("."));
//! let report = list.add("example.com\nexample.org")?;
//! println!("added {}, duplicates {}", report.added, report.duplicates);
//! # Ok::<(), zapret_core::Error>(())
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod layout;
pub mod lists;
pub mod registry;
pub mod state;

// Re-exports for convenience
pub use error::{Error, Result};
pub use lists::{AddReport, ListFile, ListKind, SaveReport};
pub use registry::{ScriptEntry, ScriptRegistry};
pub use state::{ConnectionMachine, ConnectionState, Request};
