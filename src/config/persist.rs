// Configuration persistence module
// Saves settings changed through the control API to state.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::logger;

/// Persistent state - serialized to state.toml
/// Only includes fields that can be modified at runtime via API
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct PersistentState {
    /// Statistics settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PersistentStats>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PersistentStats {
    pub interval: u32,
}

/// State file manager
pub struct StateManager {
    /// Path to state file
    state_path: PathBuf,
    /// Current state (cached in memory)
    state: RwLock<PersistentState>,
    /// Whether persistence is enabled
    enabled: bool,
}

impl StateManager {
    /// Create a new state manager
    ///
    /// # Arguments
    /// * `config_path` - Path to config.toml (state.toml will be in same directory)
    /// * `enabled` - Whether persistence is enabled
    pub fn new(config_path: &str, enabled: bool) -> Self {
        let config_dir = Path::new(config_path)
            .parent()
            .unwrap_or_else(|| Path::new("."));

        let state_path = config_dir.join("state.toml");

        let state = if enabled {
            Self::load_state(&state_path).unwrap_or_default()
        } else {
            PersistentState::default()
        };

        Self {
            state_path,
            state: RwLock::new(state),
            enabled,
        }
    }

    fn load_state(path: &Path) -> Option<PersistentState> {
        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to read state file {}: {e}",
                    path.display()
                ));
                return None;
            }
        };

        match toml::from_str(&content) {
            Ok(state) => {
                logger::log_info(&format!("Loaded persistent state from {}", path.display()));
                Some(state)
            }
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to parse state file {}: {e}",
                    path.display()
                ));
                None
            }
        }
    }

    async fn save_state(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        let content = {
            let state = self.state.read().await;
            toml::to_string_pretty(&*state)
                .map_err(|e| format!("Failed to serialize state: {e}"))?
        };

        fs::write(&self.state_path, content)
            .map_err(|e| format!("Failed to write state file: {e}"))
    }

    /// Get the current persistent state
    pub async fn get_state(&self) -> PersistentState {
        self.state.read().await.clone()
    }

    /// Persisted stats interval, if one was saved
    pub async fn stats_interval(&self) -> Option<u32> {
        self.state.read().await.stats.map(|s| s.interval)
    }

    /// Update the stats interval
    pub async fn update_stats_interval(&self, interval: u32) -> Result<(), String> {
        {
            let mut state = self.state.write().await;
            state.stats = Some(PersistentStats { interval });
        }
        self.save_state().await
    }

    /// Get state file path
    #[allow(clippy::missing_const_for_fn)]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Check if persistence is enabled
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Wrapper for Arc<StateManager>
pub type SharedStateManager = Arc<StateManager>;

/// Create a shared state manager
pub fn create_state_manager(config_path: &str, enabled: bool) -> SharedStateManager {
    Arc::new(StateManager::new(config_path, enabled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_interval_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let config_path = config_path.to_str().unwrap();

        let manager = StateManager::new(config_path, true);
        assert_eq!(manager.stats_interval().await, None);
        manager.update_stats_interval(30).await.unwrap();
        assert!(manager.state_path().exists());

        let reloaded = StateManager::new(config_path, true);
        assert_eq!(reloaded.stats_interval().await, Some(30));
        assert_eq!(
            reloaded.get_state().await,
            PersistentState {
                stats: Some(PersistentStats { interval: 30 })
            }
        );
    }

    #[tokio::test]
    async fn test_disabled_manager_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        let manager = StateManager::new(config_path.to_str().unwrap(), false);
        assert!(!manager.is_enabled());
        manager.update_stats_interval(7).await.unwrap();

        assert_eq!(manager.stats_interval().await, Some(7));
        assert!(!manager.state_path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_state_file_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("state.toml"), "stats = [not toml").unwrap();
        let config_path = dir.path().join("config.toml");

        let manager = StateManager::new(config_path.to_str().unwrap(), true);
        assert_eq!(manager.get_state().await, PersistentState::default());
    }
}
