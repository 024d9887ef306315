//! Server configuration
//!
//! Every field has a default, so an absent or partial TOML file is valid.
//! The Brave credential itself never lives in the file: the file names the
//! environment variable to read it from.

use crate::search::client::DEFAULT_BASE_URL;
use crate::search::rate_limit::RateLimits;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Config files probed, in order, when no path is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["brave-search.toml", "config/brave-search.toml"];

/// Main server configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub brave: BraveSection,
    #[serde(default)]
    pub rate_limit: RateLimits,
}

/// Listener and identity reported to MCP clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: default_name(),
            version: default_version(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3004
}

fn default_name() -> String {
    "example-servers/brave-search".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Brave Search API access
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BraveSection {
    /// Environment variable containing the subscription token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BraveSection {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "BRAVE_API_KEY".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("{0} environment variable is required")]
    EnvVarNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ServerConfig {
    /// Load configuration from TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, else the first existing default path, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::find_default_file() {
                Some(found) => Self::load_from_file(&found),
                None => Ok(Self::default()),
            },
        }
    }

    fn find_default_file() -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.is_file())
    }

    /// Check field ranges and formats
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .host
            .parse::<IpAddr>()
            .map_err(|e| invalid(format!("server.host '{}': {e}", self.server.host)))?;

        if self.server.name.trim().is_empty() {
            return Err(invalid("server.name must not be empty"));
        }

        if self.brave.api_key_env.trim().is_empty() {
            return Err(invalid("brave.api_key_env must not be empty"));
        }

        Url::parse(&self.brave.base_url)
            .map_err(|e| invalid(format!("brave.base_url '{}': {e}", self.brave.base_url)))?;

        if self.brave.timeout_secs == 0 {
            return Err(invalid("brave.timeout_secs must be positive"));
        }

        if self.rate_limit.per_second == 0 || self.rate_limit.per_month == 0 {
            return Err(invalid("rate_limit values must be positive"));
        }

        Ok(())
    }

    /// Read the Brave credential from its environment variable
    pub fn get_api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.brave.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::EnvVarNotFound(self.brave.api_key_env.clone()))
    }

    /// Apply a CLI/environment port override
    pub fn with_port_override(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .server
            .host
            .parse::<IpAddr>()
            .map_err(|e| invalid(format!("server.host '{}': {e}", self.server.host)))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// API root, always ending in `/` so endpoint paths join beneath it
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.brave.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| invalid(format!("brave.base_url '{raw}': {e}")))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.brave.timeout_secs)
    }

    /// Render as TOML for `config --show`
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| invalid(e.to_string()))
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfig(message.into())
}
