// src/config.rs
//! Gateway configuration: listening port, session limits and sink table

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_MAX_SESSIONS: usize = 64;
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const LATITUDE_PLACEHOLDER: &str = "{lat}";
pub const LONGITUDE_PLACEHOLDER: &str = "{lon}";

/// One HTTP endpoint that receives every fix as query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkTarget {
    pub use_tls: bool,
    pub host: String,
    /// Path and query with `{lat}` and `{lon}` placeholders
    pub path_template: String,
}

impl SinkTarget {
    pub fn new(use_tls: bool, host: &str, path_template: &str) -> Self {
        Self {
            use_tls,
            host: host.to_string(),
            path_template: path_template.to_string(),
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_tls {
            "https"
        } else {
            "http"
        }
    }

    /// Full request URL for a position
    pub fn url(&self, latitude: f64, longitude: f64) -> String {
        let path = self
            .path_template
            .replace(LATITUDE_PLACEHOLDER, &format!("{:.6}", latitude))
            .replace(LONGITUDE_PLACEHOLDER, &format!("{:.6}", longitude));
        format!("{}://{}{}", self.scheme(), self.host, path)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(GatewayError::Config("sink host is empty".to_string()));
        }
        for placeholder in [LATITUDE_PLACEHOLDER, LONGITUDE_PLACEHOLDER] {
            if !self.path_template.contains(placeholder) {
                return Err(GatewayError::Config(format!(
                    "sink {} path template {:?} is missing {}",
                    self.host, self.path_template, placeholder
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub port: u16,
    pub max_sessions: usize,
    pub read_buffer_size: usize,
    pub request_timeout_secs: u64,
    pub sinks: Vec<SinkTarget>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_sessions: DEFAULT_MAX_SESSIONS,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            sinks: Self::builtin_sinks(),
        }
    }
}

impl GatewayConfig {
    /// Sinks compiled into the binary, used when no config file exists
    pub fn builtin_sinks() -> Vec<SinkTarget> {
        vec![
            SinkTarget::new(
                false,
                "localhost:8080",
                "/track?id=tkstar&lat={lat}&lon={lon}",
            ),
            SinkTarget::new(
                true,
                "tracker.example.com",
                "/api/position?route=1&latitude={lat}&longitude={lon}",
            ),
        ]
    }

    /// Load from the user config file, falling back to the built-in defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            GatewayError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save to the user config file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GatewayError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(path, contents)
            .map_err(|e| GatewayError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| GatewayError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("tk-star-gateway")
            .join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(GatewayError::Config("port must not be 0".to_string()));
        }
        if self.max_sessions == 0 {
            return Err(GatewayError::Config("max_sessions must be at least 1".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(GatewayError::Config("read_buffer_size must be at least 1".to_string()));
        }
        self.sinks.iter().try_for_each(SinkTarget::validate)
    }
}
