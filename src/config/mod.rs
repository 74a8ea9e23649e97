//! Configuration management for Dripfy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_API_BASE;
use crate::client::models::Role;
use crate::error::{ConfigError, Result};
use crate::i18n::Language;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Dripfy dashboard API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Role used to decide which approval steps are actionable
    #[serde(default)]
    pub role: Role,

    /// Language for SLA and approval messages
    #[serde(default)]
    pub language: Language,

    /// Dashboard page whose query string carries the audit filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,

    /// Override for the local SQLite store location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token: None,
            role: Role::default(),
            language: Language::default(),
            dashboard_url: None,
            store_path: None,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".dripfy").join("config.yaml"))
    }

    /// Resolve an optional `--config` value to a concrete path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Load from `path` (or the default location), falling back to defaults
    /// when no file exists yet. Parse errors are still reported.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        match Self::load_from(&path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Token lives in here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Apply command-line / environment overrides on top of the file values
    pub fn apply_overrides(
        &mut self,
        api_base: Option<&str>,
        token: Option<&str>,
        role: Option<Role>,
        language: Option<Language>,
    ) {
        if let Some(base) = api_base {
            self.api_base = base.to_string();
        }
        if let Some(token) = token {
            self.token = Some(token.to_string());
        }
        if let Some(role) = role {
            self.role = role;
        }
        if let Some(language) = language {
            self.language = language;
        }
    }

    /// Validate fields that cannot be checked by deserialization alone
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api_base)
            .map_err(|e| ConfigError::Invalid(format!("api_base '{}': {}", self.api_base, e)))?;
        if let Some(ref dashboard) = self.dashboard_url {
            url::Url::parse(dashboard)
                .map_err(|e| ConfigError::Invalid(format!("dashboard_url '{}': {}", dashboard, e)))?;
        }
        Ok(())
    }
}
