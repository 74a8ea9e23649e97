//! Command execution context
//!
//! Loads configuration, applies global overrides and builds the API client and
//! local store that command handlers share.

use log::{debug, warn};
use std::sync::Arc;

use crate::approval::ApprovalDesk;
use crate::audit::{AuditLogSession, DashboardLocation, SavedFilterRepository};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::DripfyClient;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::store::{KeyValueStore, MemoryStore, SqliteStore};

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    /// Configuration with CLI/env overrides applied
    pub config: Config,
    /// API client shared by the engines
    pub client: Arc<DripfyClient>,
    /// Local store for saved filter sets
    pub store: Arc<dyn KeyValueStore>,
    /// Where the store lives, for status output
    pub store_label: String,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// A missing config file is fine; defaults apply. The store falls back to
    /// memory when the SQLite file cannot be opened.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = resolve_config(opts)?;
        let client = Arc::new(DripfyClient::new(&config.api_base, config.token.clone())?);
        let (store, store_label) = open_store(&config);

        Ok(Self {
            config,
            client,
            store,
            store_label,
            format: opts.format,
        })
    }

    /// Dashboard location from `--link`, else the configured dashboard URL
    pub fn location(&self, link: Option<&str>) -> Result<Option<DashboardLocation>> {
        link.or(self.config.dashboard_url.as_deref())
            .map(DashboardLocation::parse)
            .transpose()
    }

    /// Same as [`CommandContext::location`] but required
    pub fn require_location(&self, link: Option<&str>) -> Result<DashboardLocation> {
        self.location(link)?.ok_or_else(|| {
            ConfigError::Invalid(
                "No dashboard URL. Pass --link or set dashboard_url in the config file.".to_string(),
            )
            .into()
        })
    }

    /// New audit session over the shared client and saved filter store
    pub fn audit_session(&self, location: Option<DashboardLocation>) -> AuditLogSession {
        let saved = SavedFilterRepository::load(self.store.clone());
        let session = AuditLogSession::new(self.client.clone(), saved);
        match location {
            Some(location) => session.with_location(location),
            None => session,
        }
    }

    /// New approval desk acting with the configured role and language
    pub fn approval_desk(&self) -> ApprovalDesk {
        ApprovalDesk::new(self.client.clone(), self.config.role, self.config.language)
    }
}

/// Load the config file and apply flag/env overrides
pub fn resolve_config(opts: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load_at(opts.config_ref())?;
    config.apply_overrides(
        opts.api_base.as_deref(),
        opts.token.as_deref(),
        opts.role,
        opts.language,
    );
    config.validate()?;
    Ok(config)
}

/// Open the SQLite store, or an in-memory one if that fails
pub fn open_store(config: &Config) -> (Arc<dyn KeyValueStore>, String) {
    let opened = match config.store_path {
        Some(ref path) => SqliteStore::open_at(path),
        None => SqliteStore::open(),
    };
    match opened {
        Ok(store) => {
            let label = store.path().display().to_string();
            debug!("Using store at {}", label);
            (Arc::new(store), label)
        }
        Err(e) => {
            warn!("Local store unavailable, saved filters will not persist: {}", e);
            (Arc::new(MemoryStore::new()), "memory (not persisted)".to_string())
        }
    }
}
