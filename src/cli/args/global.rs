//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};
use crate::client::models::Role;
use crate::i18n::Language;

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.dripfy/config.yaml)
    pub config: Option<String>,

    /// API base URL override
    pub api_base: Option<String>,

    /// Access token override
    pub token: Option<String>,

    /// Role override for approval gating
    pub role: Option<Role>,

    /// Display language override
    pub language: Option<Language>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_base: cli.api_base.clone(),
            token: cli.token.clone(),
            role: cli.role,
            language: cli.lang,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }
}
