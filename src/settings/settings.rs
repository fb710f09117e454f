// Settings management
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{BridgeError, BridgeResult};

/// Environment variable pointing at an optional JSON settings file
pub const SETTINGS_ENV: &str = "MEDIATRANSPORT4J_SETTINGS";

/// Timeout budgets for the bounded waits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub manager_ms: u64,   // Session manager acquisition and session actions
    pub thumbnail_ms: u64, // Opening one thumbnail stream
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            manager_ms: 3000,
            thumbnail_ms: 1000,
        }
    }
}

impl TimeoutSettings {
    pub fn manager(&self) -> Duration {
        Duration::from_millis(self.manager_ms)
    }

    pub fn thumbnail(&self) -> Duration {
        Duration::from_millis(self.thumbnail_ms)
    }
}

/// Main bridge settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    pub version: i32, // Settings schema version for future migrations
    pub timeouts: TimeoutSettings,
    pub log_filter: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            version: 1,
            timeouts: TimeoutSettings::default(),
            log_filter: "warn".to_string(),
        }
    }
}

impl BridgeSettings {
    /// Load settings from file, or return defaults if the file doesn't exist
    pub fn load(path: &Path) -> BridgeResult<Self> {
        if !path.exists() {
            tracing::debug!(?path, "no settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            BridgeError::Settings(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> BridgeResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| BridgeError::Settings(format!("failed to parse settings: {}", e)))
    }

    /// Settings from the file named by `MEDIATRANSPORT4J_SETTINGS`.
    ///
    /// Never fails: a broken file is logged and defaults are used instead.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(SETTINGS_ENV) else {
            return Self::default();
        };

        match Self::load(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default settings");
                Self::default()
            }
        }
    }
}

static SETTINGS: OnceLock<BridgeSettings> = OnceLock::new();

/// Process-wide settings, loaded on first use
pub fn current() -> &'static BridgeSettings {
    SETTINGS.get_or_init(BridgeSettings::from_env)
}
