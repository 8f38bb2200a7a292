//! Script registry
//!
//! Fixed, ordered mapping from configuration names to the script files
//! that implement them. Built once at start-up and never mutated.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// One selectable configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// Name shown in the selector
    pub name: String,
    /// Script file name, relative to the base directory
    pub file: String,
}

/// Ordered set of known configurations
#[derive(Debug, Clone)]
pub struct ScriptRegistry {
    entries: Vec<ScriptEntry>,
}

impl Default for ScriptRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScriptRegistry {
    /// Create a registry from `(name, file)` pairs, in selector order
    pub fn new<I, N, F>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, F)>,
        N: Into<String>,
        F: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, file)| ScriptEntry {
                    name: name.into(),
                    file: file.into(),
                })
                .collect(),
        }
    }

    /// The `general (ALT)` .. `general (ALT11)` scripts shipped with zapret
    pub fn builtin() -> Self {
        let names = std::iter::once("general (ALT)".to_string())
            .chain((2..=11).map(|n| format!("general (ALT{n})")));

        Self::new(names.map(|name| {
            let file = format!("{name}.bat");
            (name, file)
        }))
    }

    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// First entry, used as the initial selection
    pub fn default_entry(&self) -> Option<&ScriptEntry> {
        self.entries.first()
    }

    pub fn get(&self, name: &str) -> Option<&ScriptEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Resolve a configuration name to its script path under `base_dir`
    pub fn resolve(&self, name: &str, base_dir: &Path) -> Result<PathBuf> {
        self.get(name)
            .map(|e| base_dir.join(&e.file))
            .ok_or_else(|| Error::UnknownScript {
                name: name.to_string(),
            })
    }

    /// Entries whose script file does not exist under `base_dir`
    pub fn missing(&self, base_dir: &Path) -> Vec<&ScriptEntry> {
        let mut missing = Vec::new();
        for entry in &self.entries {
            if base_dir.join(&entry.file).exists() {
                info!("Script found: {}", entry.file);
            } else {
                warn!("Script missing: {}", entry.file);
                missing.push(entry);
            }
        }
        missing
    }
}
