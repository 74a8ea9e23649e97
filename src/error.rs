//! Error types for the Dripfy CLI

use thiserror::Error;

/// Result type alias for Dripfy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// API-related errors
///
/// `Server` carries the message from the response body's `error` field when the
/// server supplied one, so it can be shown to the user verbatim.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Authentication failed. Run `dripfy init` to configure an access token.")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Message suitable for showing inline: the server's own text when it sent
    /// one, otherwise the full error description.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Server(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl Error {
    /// Inline message for a failed request; see [`ApiError::user_message`]
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `dripfy init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Local key-value store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not determine cache directory")]
    NoHome,

    #[error("Store I/O error: {0}")]
    Io(String),

    #[error("Store database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Approval decision errors
///
/// `NotActionable` and `Busy` are raised locally before any request is sent;
/// `DecisionFailed` wraps a failed round trip to the server.
#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Approval flow not found: {0}")]
    FlowNotFound(String),

    #[error("Step {step} not found in flow {flow}")]
    StepNotFound { flow: String, step: String },

    #[error("{0}")]
    NotActionable(String),

    #[error("Another approval action is still in progress")]
    Busy,

    #[error("{message}")]
    DecisionFailed {
        message: String,
        #[source]
        source: ApiError,
    },
}
