//! Configuration management for the lending client

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Server address as typed by the user (normalized before use)
    pub server_address: String,
    /// Port injected when the address carries none
    pub default_port: u16,
    /// Rewrite localhost/127.0.0.1 to the Android emulator host loopback
    pub emulator_loopback: bool,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    /// Directory for the HTTP exchange log; disabled when unset
    pub http_log_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollerConfig {
    pub interval_secs: u64,
    pub enabled: bool,
}

/// Credentials used by the agent binary
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AgentConfig {
    pub contact: Option<String>,
    pub password: Option<String>,
    /// Version code of this build, compared against the server's
    #[serde(default)]
    pub version_code: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables with prefix LENDING_ (e.g. LENDING_API__SERVER_ADDRESS)
            .add_source(
                Environment::with_prefix("LENDING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.server_address", env::var("LENDING_SERVER").ok())?
            .set_override_option("cache.url", env::var("LENDING_CACHE_URL").ok())?
            .set_default("api.server_address", ApiConfig::default().server_address)?
            .set_default("api.default_port", ApiConfig::default().default_port as i64)?
            .set_default("api.emulator_loopback", ApiConfig::default().emulator_loopback)?
            .set_default("api.timeout_secs", ApiConfig::default().timeout_secs as i64)?
            .set_default("api.connect_timeout_secs", ApiConfig::default().connect_timeout_secs as i64)?
            .set_default("cache.url", CacheConfig::default().url)?
            .set_default("cache.max_connections", CacheConfig::default().max_connections as i64)?
            .set_default("logging.level", LoggingConfig::default().level)?
            .set_default("logging.format", LoggingConfig::default().format)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server_address: "localhost".to_string(),
            default_port: 8080,
            emulator_loopback: false,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://lending-cache.db?mode=rwc".to_string(),
            max_connections: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            http_log_dir: None,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            enabled: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            poller: PollerConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test touching the process environment
    #[test]
    fn test_environment_overrides_files() {
        env::set_var("LENDING_AGENT__CONTACT", "agent@example.org");
        env::set_var("LENDING_POLLER__INTERVAL_SECS", "15");
        env::set_var("LENDING__AGENT__PASSWORD", "ignored");
        env::set_var("LENDING_SERVER", "10.0.0.5:9000");

        let config = AppConfig::load();

        for name in [
            "LENDING_AGENT__CONTACT",
            "LENDING_POLLER__INTERVAL_SECS",
            "LENDING__AGENT__PASSWORD",
            "LENDING_SERVER",
        ] {
            env::remove_var(name);
        }

        let config = config.unwrap();
        assert_eq!(config.agent.contact.as_deref(), Some("agent@example.org"));
        assert_eq!(config.agent.password, None);
        assert_eq!(config.poller.interval_secs, 15);
        assert!(config.poller.enabled);
        assert_eq!(config.api.server_address, "10.0.0.5:9000");
        assert_eq!(config.api.default_port, 8080);
    }
}
