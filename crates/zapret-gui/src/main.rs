//! Zapret Launcher
//!
//! Desktop window for starting and stopping zapret configurations and
//! editing its domain lists.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod dialog;
mod editor;
mod service;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("zapret_gui=info".parse()?)
                .add_directive("zapret_platform=info".parse()?)
                .add_directive("zapret_core=info".parse()?),
        )
        .init();

    info!("Starting Zapret Launcher");

    // Run the application
    app::run()
}
