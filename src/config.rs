//! Configuration management with validation and defaults
//!
//! Values come from the built-in defaults, then an optional TOML file, then
//! `TRIDICE_*` environment variables, and are validated once at the end.

use crate::errors::ConfigurationError;
use crate::game::types::DEFAULT_CREDITS;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete application configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TridiceConfig {
    pub game: GameConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Rules and timings of the game engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub starting_credits: u64,
    /// How long dice stay in the air
    pub rolling_delay_ms: u64,
    /// How long a result stays on screen before the next round
    pub result_delay_ms: u64,
}

impl GameConfig {
    pub fn rolling_delay(&self) -> Duration {
        Duration::from_millis(self.rolling_delay_ms)
    }

    pub fn result_delay(&self) -> Duration {
        Duration::from_millis(self.result_delay_ms)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_credits: DEFAULT_CREDITS,
            rolling_delay_ms: 2_500,
            result_delay_ms: 3_000,
        }
    }
}

/// Deployment shell settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the built presentation bundle
    pub static_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: PathBuf::from("./dist/public"),
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// Tracing subscriber settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "tridice=info,tower_http=info".to_string(),
            ansi: true,
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> Result<TridiceConfig, ConfigurationError> {
        let mut config = match &self.config_path {
            Some(path) => Self::load_from_file(path)?,
            None => TridiceConfig::default(),
        };

        Self::apply_overrides(&mut config, |key| env::var(key).ok())?;
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    fn load_from_file(path: &Path) -> Result<TridiceConfig, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)))
    }

    /// Apply `TRIDICE_*` overrides from `lookup`
    fn apply_overrides<F>(config: &mut TridiceConfig, lookup: F) -> Result<(), ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("TRIDICE_STARTING_CREDITS") {
            config.game.starting_credits = parse_var("TRIDICE_STARTING_CREDITS", value)?;
        }
        if let Some(value) = lookup("TRIDICE_ROLLING_DELAY_MS") {
            config.game.rolling_delay_ms = parse_var("TRIDICE_ROLLING_DELAY_MS", value)?;
        }
        if let Some(value) = lookup("TRIDICE_RESULT_DELAY_MS") {
            config.game.result_delay_ms = parse_var("TRIDICE_RESULT_DELAY_MS", value)?;
        }

        if let Some(host) = lookup("TRIDICE_HOST") {
            config.server.host = host;
        }
        if let Some(value) = lookup("TRIDICE_PORT") {
            config.server.port = parse_var("TRIDICE_PORT", value)?;
        }
        if let Some(dir) = lookup("TRIDICE_STATIC_DIR") {
            config.server.static_dir = PathBuf::from(dir);
        }
        if let Some(origins) = lookup("TRIDICE_ALLOWED_ORIGINS") {
            config.server.allowed_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }

        if let Some(filter) = lookup("TRIDICE_LOG") {
            config.logging.filter = filter;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(config: &TridiceConfig) -> Result<(), ConfigurationError> {
        if config.game.rolling_delay_ms == 0 {
            return Err(ConfigurationError::ValidationFailed(
                "game.rolling_delay_ms must be greater than zero".to_string(),
            ));
        }
        if config.game.result_delay_ms == 0 {
            return Err(ConfigurationError::ValidationFailed(
                "game.result_delay_ms must be greater than zero".to_string(),
            ));
        }
        if config.server.port == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "Port must be non-zero".to_string(),
            });
        }
        if config.server.host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigurationError::InvalidValue {
                field: "server.host".to_string(),
                value: config.server.host.clone(),
                reason: "Expected an IP address".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(field: &str, value: String) -> Result<T, ConfigurationError> {
    value.trim().parse().map_err(|_| ConfigurationError::InvalidValue {
        field: field.to_string(),
        reason: "Invalid numeric value".to_string(),
        value,
    })
}
