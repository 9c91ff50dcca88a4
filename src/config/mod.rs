use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete Grevo configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrevoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// HTTP/WebSocket listener
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

/// Periodic telemetry broadcast
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Seconds between ticks
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Per-observer queue depth; samples beyond this are dropped for that observer
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

fn default_interval_seconds() -> u64 {
    5
}

fn default_outbox_capacity() -> usize {
    64
}

impl BroadcastConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

/// One-shot query API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Site used by /api/energy-data when no campusId is given
    #[serde(default = "default_site_id")]
    pub default_site_id: String,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Upper bound on samples returned by one /api/energy-data call
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

fn default_site_id() -> String {
    "campus-1".to_string()
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_site_id: default_site_id(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

/// Site catalog source; built-in catalog when `path` is unset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
}

impl GrevoConfig {
    /// Build from `GREVO_CONFIG` (if set) plus env overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("GREVO_CONFIG") {
            Ok(path) => load_config(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(v) = std::env::var("PORT") {
            if let Ok(port) = v.parse::<u16>() {
                config.server.port = port;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast.interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "broadcast.interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.broadcast.outbox_capacity == 0 {
            return Err(ConfigError::Invalid(
                "broadcast.outbox_capacity must be greater than 0".to_string(),
            ));
        }
        if self.api.max_limit == 0 {
            return Err(ConfigError::Invalid(
                "api.max_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Listener address as `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &Path) -> Result<GrevoConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GrevoConfig =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::Invalid(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
