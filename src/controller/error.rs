//! Error types for the shared-db reconciler

use thiserror::Error;

use crate::hookenv::HookToolError;
use crate::resources::sql::SqlError;

/// Everything that can abort a hook run. Variants carry the name or path
/// they failed on so the hook log identifies the request.
#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to resolve hostname {hostname}: {reason}")]
    ResolutionError { hostname: String, reason: String },

    #[error("Credential store error for user {username}: {source}")]
    CredentialIoError {
        username: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid username for credential store: {0:?}")]
    InvalidUsernameError(String),

    #[error("Database engine error: {0}")]
    DatabaseEngineError(#[from] SqlError),

    #[error("Relation I/O error: {0}")]
    RelationIoError(#[from] HookToolError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl Error {
    /// Check if the next triggering hook event can be expected to succeed.
    ///
    /// Nothing is retried in process; this only classifies failures for logging.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::ResolutionError { .. } => true,
            Error::CredentialIoError { .. } => true,
            Error::DatabaseEngineError(e) => e.is_retryable(),
            Error::RelationIoError(_) => true,
            Error::InvalidUsernameError(_) => false,
            Error::ConfigError(_) => false,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
