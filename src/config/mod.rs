// Configuration module entry point
// Manages application configuration, runtime state, and persisted overrides

mod interval;
mod persist;
mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use interval::{is_valid_interval, ALLOWED_INTERVALS};
pub use persist::{create_state_manager, PersistentState, SharedStateManager, StateManager};
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StateConfig, StatsConfig,
};

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// A missing file is not an error, defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("STATSD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "stats-control")?
            .set_default("http.max_body_size", 65_536)?
            .set_default("stats.interval", 1)?
            .set_default("stats.top_limit", 100)?
            .set_default("state.persist", true)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !is_valid_interval(self.stats.interval) {
            return Err(config::ConfigError::Message(format!(
                "stats.interval must be one of {ALLOWED_INTERVALS:?}, got {}",
                self.stats.interval
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();

        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.stats.interval, 1);
        assert_eq!(cfg.stats.top_limit, 100);
        assert!(cfg.state.persist);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:3000".parse().unwrap()
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nport = 4100\n\n[stats]\ninterval = 30\ntop_limit = 5\n",
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 4100);
        assert_eq!(cfg.stats.interval, 30);
        assert_eq!(cfg.stats.top_limit, 5);
    }

    #[test]
    fn test_unsupported_interval_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[stats]\ninterval = 14\n").unwrap();

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("stats.interval"));
    }
}
