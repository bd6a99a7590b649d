//! Configuration management for opshub.
//!
//! Handles loading and saving configuration from TOML files.
//! Config files are stored in platform-specific locations:
//!
//! - **macOS/Linux**: `~/.config/opshub/config.toml`
//! - **Windows**: `%APPDATA%\opshub\config.toml`
//!
//! Credentials may also come from the environment: `OPSHUB_DEVOPS_PAT` and
//! `OPSHUB_INSIGHTS_API_KEY` take precedence over file values.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "opshub";

/// Environment variable overriding the work-tracking access token.
pub const DEVOPS_PAT_ENV: &str = "OPSHUB_DEVOPS_PAT";

/// Environment variable overriding the telemetry API key.
pub const INSIGHTS_API_KEY_ENV: &str = "OPSHUB_INSIGHTS_API_KEY";

// =============================================================================
// Configuration structures
// =============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Work-tracking/source-control remote configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devops: Option<DevOpsConfig>,

    /// Telemetry remote configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<InsightsConfig>,
}

/// Azure DevOps remote configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevOpsConfig {
    /// Organization name (first path segment of the remote base)
    pub organization: String,
    /// Default project scope for project-scoped operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Personal access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pat: Option<String>,
}

/// Application Insights remote configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Application id the query paths are rooted at
    pub application_id: String,
    /// API key sent on every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl DevOpsConfig {
    /// Access token, preferring the environment over the file.
    pub fn access_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(DEVOPS_PAT_ENV) {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        self.pat.clone().ok_or_else(|| {
            Error::Config(format!(
                "No personal access token: set devops.pat or {}",
                DEVOPS_PAT_ENV
            ))
        })
    }
}

impl InsightsConfig {
    /// API key, preferring the environment over the file.
    pub fn access_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(INSIGHTS_API_KEY_ENV) {
            if !key.is_empty() {
                return Ok(key);
            }
        }
        self.api_key.clone().ok_or_else(|| {
            Error::Config(format!(
                "No API key: set insights.api_key or {}",
                INSIGHTS_API_KEY_ENV
            ))
        })
    }
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `devops.organization`,
    /// `insights.api_key`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(Error::Config(format!(
                "Invalid config key '{}'. Expected format: section.field",
                key
            )));
        }

        let (section, field) = (parts[0], parts[1]);

        match section {
            "devops" => {
                let config = self.devops.get_or_insert_with(|| DevOpsConfig {
                    organization: String::new(),
                    project: None,
                    pat: None,
                });
                match field {
                    "organization" | "org" => config.organization = value.to_string(),
                    "project" => config.project = Some(value.to_string()),
                    "pat" | "token" => config.pat = Some(value.to_string()),
                    _ => {
                        return Err(Error::Config(format!(
                            "Unknown devops config field: {}",
                            field
                        )))
                    }
                }
            }
            "insights" => {
                let config = self.insights.get_or_insert_with(|| InsightsConfig {
                    application_id: String::new(),
                    api_key: None,
                });
                match field {
                    "application_id" | "app_id" => config.application_id = value.to_string(),
                    "api_key" | "key" => config.api_key = Some(value.to_string()),
                    _ => {
                        return Err(Error::Config(format!(
                            "Unknown insights config field: {}",
                            field
                        )))
                    }
                }
            }
            _ => {
                return Err(Error::Config(format!("Unknown section: {}", section)));
            }
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `devops.organization`)
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(Error::Config(format!(
                "Invalid config key '{}'. Expected format: section.field",
                key
            )));
        }

        let (section, field) = (parts[0], parts[1]);

        match section {
            "devops" => {
                let Some(config) = &self.devops else {
                    return Ok(None);
                };
                match field {
                    "organization" | "org" => Ok(Some(config.organization.clone())),
                    "project" => Ok(config.project.clone()),
                    "pat" | "token" => Ok(config.pat.clone()),
                    _ => Err(Error::Config(format!(
                        "Unknown devops config field: {}",
                        field
                    ))),
                }
            }
            "insights" => {
                let Some(config) = &self.insights else {
                    return Ok(None);
                };
                match field {
                    "application_id" | "app_id" => Ok(Some(config.application_id.clone())),
                    "api_key" | "key" => Ok(config.api_key.clone()),
                    _ => Err(Error::Config(format!(
                        "Unknown insights config field: {}",
                        field
                    ))),
                }
            }
            _ => Err(Error::Config(format!("Unknown section: {}", section))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
