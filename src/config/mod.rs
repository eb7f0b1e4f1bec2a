//! Configuration management
//!
//! Layered configuration for the prediction service:
//! 1. Built-in defaults
//! 2. TOML config file (`./stresscast.toml`, `~/.config/stresscast/config.toml`,
//!    or `/etc/stresscast/config.toml`, first found wins)
//! 3. `STRESSCAST_*` environment variables
//! 4. Command-line flags (applied by the binary)
//!
//! # Example
//!
//! ```rust,ignore
//! use stresscast::config::StressConfig;
//!
//! let config = StressConfig::load().unwrap();
//! println!("artifact: {}", config.model.artifact_path);
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, StressError, StressResult};

// ============================================================================
// Configuration Sections
// ============================================================================

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub general: GeneralConfig,
    pub model: ModelConfig,
    pub server: ServerSection,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log verbosity: quiet, normal, verbose
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "normal".to_string(),
        }
    }
}

/// Model artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the trained artifact bundle
    pub artifact_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "model.json".to_string(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Port to listen on
    pub port: u16,
    /// Host to bind to
    pub host: String,
    /// Enable permissive CORS
    pub cors_enabled: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
            cors_enabled: true,
            max_body_size: 64 * 1024,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

const VALID_LOG_LEVELS: [&str; 3] = ["quiet", "normal", "verbose"];

impl StressConfig {
    /// Load configuration: defaults, then the first config file found, then
    /// environment overrides.
    pub fn load() -> StressResult<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn from_file(path: impl AsRef<Path>) -> StressResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorCode::ConfigNotFound
            } else {
                ErrorCode::ConfigError
            };
            StressError::new(code, format!("Cannot read config file: {}", e))
                .with_context("path", path.display().to_string())
        })?;
        let config: StressConfig = toml::from_str(&data)?;
        Ok(config)
    }

    /// Search the standard locations for a config file
    fn find_config_file() -> Option<PathBuf> {
        let mut candidates = vec![PathBuf::from("stresscast.toml")];
        if let Ok(home) = env::var("HOME") {
            candidates.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("stresscast")
                    .join("config.toml"),
            );
        }
        candidates.push(PathBuf::from("/etc/stresscast/config.toml"));
        candidates.into_iter().find(|p| p.is_file())
    }

    /// Apply `STRESSCAST_*` environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("STRESSCAST_LOG_LEVEL") {
            self.general.log_level = v;
        }
        if let Ok(v) = env::var("STRESSCAST_ARTIFACT") {
            self.model.artifact_path = v;
        }
        if let Ok(v) = env::var("STRESSCAST_PORT") {
            if let Ok(port) = v.parse() {
                self.server.port = port;
            }
        }
        if let Ok(v) = env::var("STRESSCAST_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("STRESSCAST_CORS") {
            self.server.cors_enabled = matches!(v.as_str(), "1" | "true" | "yes");
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> StressResult<()> {
        if !VALID_LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(StressError::new(
                ErrorCode::InvalidConfigValue,
                format!(
                    "Unknown log level '{}' (expected one of: {})",
                    self.general.log_level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }
        if self.model.artifact_path.is_empty() {
            return Err(StressError::new(
                ErrorCode::InvalidConfigValue,
                "model.artifact_path must not be empty",
            ));
        }
        if self.server.max_body_size == 0 {
            return Err(StressError::new(
                ErrorCode::InvalidConfigValue,
                "server.max_body_size must be positive",
            ));
        }
        Ok(())
    }

    /// Serialize the configuration back to TOML
    pub fn to_toml(&self) -> StressResult<String> {
        toml::to_string_pretty(self).map_err(|e| StressError::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
