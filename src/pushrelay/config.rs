use std::fs;
use std::path::Path;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use crate::error::{PushError, ErrorCode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub id: String,
    pub addr: String,
    pub vapid: VapidConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub push: PushConfig,
}

/// Application server identity handed to the push service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VapidConfig {
    pub public_key: String,
    pub private_key: String,
    pub subject: String,
}

impl VapidConfig {
    pub fn validate(&self) -> Result<(), PushError> {
        if self.public_key.trim().is_empty() || self.private_key.trim().is_empty() {
            return Err(PushError::new(ErrorCode::ConfigInvalid, "VAPID public and private key must be set"));
        }
        if !(self.subject.starts_with("mailto:") || self.subject.starts_with("https://")) {
            return Err(PushError::new(
                ErrorCode::ConfigInvalid,
                format!("VAPID subject must be a mailto: or https: URL, got {:?}", self.subject),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub fetch_delay_ms: u64,
    pub report_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            fetch_delay_ms: 3_000,
            report_delay_ms: 5_000,
        }
    }
}

impl BackendConfig {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn report_delay(&self) -> Duration {
        Duration::from_millis(self.report_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub icon: Option<String>,
    pub default_url: String,
    pub delivery_timeout_ms: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            icon: None,
            default_url: "/web-notification".to_string(),
            delivery_timeout_ms: 5_000,
        }
    }
}

impl PushConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, PushError> {
        let content = fs::read_to_string(path)
            .map_err(|e| PushError::new(ErrorCode::ConfigInvalid, format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PushError> {
        toml::from_str(content)
            .map_err(|e| PushError::new(ErrorCode::ConfigInvalid, format!("Failed to parse TOML: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PushError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PushError::new(ErrorCode::ConfigInvalid, format!("Failed to serialize to TOML: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| PushError::new(ErrorCode::ConfigInvalid, format!("Failed to write config file: {}", e)))
    }
}
