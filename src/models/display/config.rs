//! Resolved configuration display model

use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::config::Config;

/// One `SETTING / VALUE` row of `dripfy status`
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ConfigDisplay {
    #[tabled(rename = "SETTING")]
    pub setting: String,

    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl ConfigDisplay {
    fn row(setting: &str, value: impl Into<String>) -> Self {
        Self {
            setting: setting.to_string(),
            value: value.into(),
        }
    }

    /// Rows describing the effective configuration. The token is never shown.
    pub fn rows(config: &Config, config_path: &Path, config_found: bool, store: &str) -> Vec<Self> {
        let file = if config_found {
            config_path.display().to_string()
        } else {
            format!("{} (not found, using defaults)", config_path.display())
        };
        let token = if config.token.is_some() { "set" } else { "not set" };

        vec![
            Self::row("config file", file),
            Self::row("api base", config.api_base.clone()),
            Self::row("token", token),
            Self::row("role", config.role.to_string()),
            Self::row("language", config.language.as_str()),
            Self::row(
                "dashboard url",
                config.dashboard_url.clone().unwrap_or_else(|| "--".to_string()),
            ),
            Self::row("store", store),
        ]
    }
}
