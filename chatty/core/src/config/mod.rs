//! TOML Configuration File Support
//!
//! Loads `~/.config/chatty/chatty.toml` and layers environment variables and
//! command-line overrides on top of it.
//!
//! # Configuration Priority
//!
//! Configuration values are resolved with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [reveal]
//! revealIntervalMs = 50
//!
//! [endpoint]
//! url = "http://localhost:8000/stream"
//! timeout_secs = 120
//! ```
//!
//! # Environment Variables
//!
//! - `CHATTY_REVEAL_INTERVAL_MS`: delay between character reveals
//! - `CHATTY_ENDPOINT`: streaming endpoint URL
//! - `CHATTY_TIMEOUT_SECS`: HTTP idle timeout

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default delay between successive character reveals
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 50;

/// Upper bound accepted for the reveal interval
pub const MAX_REVEAL_INTERVAL_MS: u64 = 10_000;

/// Default streaming endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/stream";

/// Default HTTP idle timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[reveal]` section of the TOML configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealToml {
    /// Delay between successive character reveals in milliseconds
    #[serde(rename = "revealIntervalMs", alias = "reveal_interval_ms")]
    pub reveal_interval_ms: Option<u64>,
}

/// `[endpoint]` section of the TOML configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointToml {
    /// Streaming endpoint URL
    pub url: Option<String>,

    /// Idle timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Root of the TOML configuration file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChattyToml {
    /// Pacing settings
    pub reveal: RevealToml,
    /// Endpoint settings
    pub endpoint: EndpointToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Pacing configuration for the reveal scheduler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealConfig {
    /// Delay between successive character reveals in milliseconds
    pub reveal_interval_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: DEFAULT_REVEAL_INTERVAL_MS,
        }
    }
}

impl RevealConfig {
    /// Pacing interval as a `Duration`
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

/// Where to send messages and how long to wait for the response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Streaming endpoint URL
    pub url: String,
    /// Idle timeout: the longest wait for a connection, the response
    /// headers, or the next body chunk. Not a deadline for the whole reply,
    /// which is read only as fast as it is revealed.
    pub timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Origin of each resolved value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigSources {
    /// Source of `reveal_interval_ms`
    pub reveal_interval: ConfigSource,
    /// Source of the endpoint URL
    pub endpoint: ConfigSource,
    /// Source of the timeout
    pub timeout: ConfigSource,
}

/// Fully resolved configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChattyConfig {
    /// Pacing settings
    pub reveal: RevealConfig,
    /// Endpoint settings
    pub endpoint: EndpointConfig,
    /// Where each value came from
    pub sources: ConfigSources,
}

/// Values that override the configuration file
///
/// Used both for environment variables and CLI flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Reveal interval in milliseconds
    pub reveal_interval_ms: Option<u64>,
    /// Endpoint URL
    pub endpoint: Option<String>,
    /// Timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Read overrides from `CHATTY_*` environment variables
    ///
    /// Unparsable numbers are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| {
            let raw = lookup(key)?;
            match raw.trim().parse::<u64>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(variable = key, value = %raw, error = %e, "Ignoring invalid environment value");
                    None
                }
            }
        };

        Self {
            reveal_interval_ms: number("CHATTY_REVEAL_INTERVAL_MS"),
            endpoint: lookup("CHATTY_ENDPOINT").filter(|url| !url.trim().is_empty()),
            timeout_secs: number("CHATTY_TIMEOUT_SECS"),
        }
    }
}

/// Pick the highest-priority value
fn layered<T>(cli: Option<T>, env: Option<T>, file: Option<T>, default: T) -> (T, ConfigSource) {
    if let Some(value) = cli {
        (value, ConfigSource::Cli)
    } else if let Some(value) = env {
        (value, ConfigSource::Env)
    } else if let Some(value) = file {
        (value, ConfigSource::File)
    } else {
        (default, ConfigSource::Default)
    }
}

impl ChattyConfig {
    /// Resolve file, environment and CLI values into a validated configuration
    pub fn resolve(
        file: &ChattyToml,
        env: &ConfigOverrides,
        cli: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let (reveal_interval_ms, reveal_source) = layered(
            cli.reveal_interval_ms,
            env.reveal_interval_ms,
            file.reveal.reveal_interval_ms,
            DEFAULT_REVEAL_INTERVAL_MS,
        );
        let (url, url_source) = layered(
            cli.endpoint.clone(),
            env.endpoint.clone(),
            file.endpoint.url.clone(),
            DEFAULT_ENDPOINT.to_string(),
        );
        let (timeout_secs, timeout_source) = layered(
            cli.timeout_secs,
            env.timeout_secs,
            file.endpoint.timeout_secs,
            DEFAULT_TIMEOUT_SECS,
        );

        let config = Self {
            reveal: RevealConfig { reveal_interval_ms },
            endpoint: EndpointConfig {
                url,
                timeout: Duration::from_secs(timeout_secs),
            },
            sources: ConfigSources {
                reveal_interval: reveal_source,
                endpoint: url_source,
                timeout: timeout_source,
            },
        };
        config.validate()?;

        debug!(
            reveal_interval_ms,
            reveal_source = %reveal_source,
            endpoint = %config.endpoint.url,
            endpoint_source = %url_source,
            "Configuration resolved"
        );
        Ok(config)
    }

    /// Check value ranges and the endpoint URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal.reveal_interval_ms > MAX_REVEAL_INTERVAL_MS {
            return Err(ConfigError::ValidationError(format!(
                "revealIntervalMs must be at most {MAX_REVEAL_INTERVAL_MS}, got {}",
                self.reveal.reveal_interval_ms
            )));
        }

        if self.endpoint.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        let url = reqwest::Url::parse(&self.endpoint.url).map_err(|e| {
            ConfigError::ValidationError(format!("invalid endpoint {:?}: {e}", self.endpoint.url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "endpoint must use http or https, got {}",
                url.scheme()
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Default configuration file location (`$XDG_CONFIG_HOME/chatty/chatty.toml`)
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatty").join("chatty.toml"))
}

/// Parse a configuration file
pub fn load_config_from_path(path: &Path) -> Result<ChattyToml, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content)?;
    debug!(path = ?path, "Loaded configuration file");
    Ok(config)
}

/// Load the configuration file
///
/// An explicit path must exist. Without one, the default location is used
/// if present and defaults apply otherwise.
pub fn load_config(path: Option<&Path>) -> Result<ChattyToml, ConfigError> {
    if let Some(path) = path {
        return load_config_from_path(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Ok(ChattyToml::default()),
    }
}
