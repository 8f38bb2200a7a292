//! Directory layout next to the scripts

use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Directories zapret scripts expect under the base directory
pub const REQUIRED_DIRS: [&str; 2] = ["bin", "lists"];

/// Create any missing required directory under `base_dir`
pub fn ensure_directories(base_dir: &Path) -> Result<()> {
    for name in REQUIRED_DIRS {
        let dir = base_dir.join(name);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            info!("Created directory: {}", dir.display());
        }
    }
    Ok(())
}
