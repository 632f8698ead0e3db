// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub stats: StatsConfig,
    #[serde(default)]
    pub state: StateConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
    /// Log file path (optional, stderr if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Statistics configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    /// Retention and reporting period in days
    pub interval: u32,
    /// Maximum entries in each top list of a snapshot
    pub top_limit: usize,
}

/// State persistence configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_persist")]
    pub persist: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_persist() -> bool {
    true
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            persist: default_persist(),
        }
    }
}
