//! Application configuration.
//!
//! Read from a YAML file named by `EXPENSE_TRACKER_CONFIG`, or
//! `./expense-tracker.yaml` when that variable is unset. A missing file means
//! defaults. `EXPENSE_TRACKER_DATA_DIR` and `EXPENSE_TRACKER_ADDR` override
//! the file.

use anyhow::{Context, Result};
use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::auth_service::{AuthService, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL_HOURS};
use crate::domain::date_bucket::{DateBucketer, DEFAULT_FALLBACK_MONTH_NAME};
use crate::domain::expense_form::ExpenseFormConfig;

pub const CONFIG_PATH_ENV: &str = "EXPENSE_TRACKER_CONFIG";
pub const DATA_DIR_ENV: &str = "EXPENSE_TRACKER_DATA_DIR";
pub const ADDR_ENV: &str = "EXPENSE_TRACKER_ADDR";
pub const DEFAULT_CONFIG_FILE: &str = "expense-tracker.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("UTC offset of {0} minutes is out of range")]
    InvalidUtcOffset(i32),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub display: DisplayConfig,
    pub validation: ValidationConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            cors_origin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
    /// Offset from UTC used for month and day buckets
    pub utc_offset_minutes: i32,
    /// Month label for records without a usable date
    pub fallback_month_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            utc_offset_minutes: 0,
            fallback_month_name: DEFAULT_FALLBACK_MONTH_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub require_category: bool,
    pub max_description_length: usize,
    pub payers: Vec<String>,
    pub categories: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let form = ExpenseFormConfig::default();
        Self {
            require_category: form.require_category,
            max_description_length: form.max_description_length,
            payers: form.payers,
            categories: form.categories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require `Authorization: Bearer <uid>` from an anonymous sign-in
    pub require_session: bool,
    pub session_ttl_hours: u32,
    /// Oldest sessions are dropped beyond this many
    pub max_sessions: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_session: false,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS as u32,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl AppConfig {
    /// Load from the configured file and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(
            std::env::var(DATA_DIR_ENV).ok(),
            std::env::var(ADDR_ENV).ok(),
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.utc_offset()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, data_dir: Option<String>, bind_address: Option<String>) {
        if let Some(data_dir) = data_dir.filter(|v| !v.trim().is_empty()) {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
        if let Some(bind_address) = bind_address.filter(|v| !v.trim().is_empty()) {
            self.server.bind_address = bind_address;
        }
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        let minutes = self.display.utc_offset_minutes;
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset(minutes))
    }

    pub fn bucketer(&self) -> Result<DateBucketer, ConfigError> {
        Ok(DateBucketer::new(
            self.utc_offset()?,
            self.display.fallback_month_name.clone(),
        ))
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::with_limits(
            Duration::hours(i64::from(self.auth.session_ttl_hours)),
            self.auth.max_sessions,
        )
    }

    pub fn form_config(&self) -> ExpenseFormConfig {
        ExpenseFormConfig {
            currency_symbol: self.display.currency_symbol.clone(),
            max_description_length: self.validation.max_description_length,
            require_category: self.validation.require_category,
            payers: self.validation.payers.clone(),
            categories: self.validation.categories.clone(),
        }
    }
}
