// Application state module
// Shared runtime state handed to every connection

use std::sync::Arc;
use tokio::sync::RwLock;

use super::interval::is_valid_interval;
use super::persist::SharedStateManager;
use super::types::Config;
use crate::logger;
use crate::stats::StatsEngine;

/// Application state
pub struct AppState {
    pub config: Config,

    /// Current stats interval in days, always one of the allowed values
    pub stats_interval: RwLock<u32>,

    /// Stats engine the control endpoints delegate to
    pub stats: Arc<dyn StatsEngine>,

    // State persistence manager
    pub state_manager: SharedStateManager,
}

impl AppState {
    /// Create `AppState` with persisted state applied
    ///
    /// A persisted interval wins over config.toml. The engine is configured
    /// with whichever interval ends up active.
    pub async fn new(
        config: &Config,
        stats: Arc<dyn StatsEngine>,
        state_manager: SharedStateManager,
    ) -> Self {
        let interval = match state_manager.stats_interval().await {
            Some(saved) if is_valid_interval(saved) => saved,
            Some(saved) => {
                logger::log_warning(&format!(
                    "Ignoring persisted stats interval {saved}, using {}",
                    config.stats.interval
                ));
                config.stats.interval
            }
            None => config.stats.interval,
        };

        stats.configure(interval);

        Self {
            config: config.clone(),
            stats_interval: RwLock::new(interval),
            stats,
            state_manager,
        }
    }
}
