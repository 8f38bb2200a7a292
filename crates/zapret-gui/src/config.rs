//! Application configuration and state persistence

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use zapret_core::ScriptRegistry;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Selected configuration name
    pub config: String,
    /// Last window size
    pub window_size: Option<(f32, f32)>,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            config: ScriptRegistry::builtin()
                .default_entry()
                .map(|e| e.name.clone())
                .unwrap_or_default(),
            window_size: None,
        }
    }
}

impl GuiConfig {
    /// Directory holding the executable, the scripts and the lists
    pub fn base_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        Self::base_dir().join("gui_config.json")
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration, falling back to defaults if it is missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str(&s).map_err(anyhow::Error::from))
        {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save configuration as pretty JSON
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Make sure the selection names a registered configuration
    pub fn normalize(&mut self, registry: &ScriptRegistry) {
        if registry.get(&self.config).is_none() {
            if let Some(entry) = registry.default_entry() {
                warn!("Unknown configuration '{}', using '{}'", self.config, entry.name);
                self.config = entry.name.clone();
            }
        }
    }
}
