//! Error types for the ownership migrator
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for migrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the migrator
#[derive(Error, Debug)]
pub enum Error {
    /// Listing the records of a zone failed
    #[error("Failed to list records in zone {zone}: {message}")]
    ProviderList {
        /// Zone identifier as passed to the provider
        zone: String,
        /// Error message
        message: String,
    },

    /// Creating, updating or deleting a single record failed
    #[error("Failed to {action} record {record}: {message}")]
    ProviderMutation {
        /// "upsert" or "delete"
        action: &'static str,
        /// Record name
        record: String,
        /// Error message
        message: String,
    },

    /// An ownership entry has no `external-dns/owner` key and cannot be rewritten
    #[error("`external-dns/owner` key not found in ownership entry: {0}")]
    OwnerKeyMissing(String),

    /// An ownership entry has no `external-dns/owner` key
    #[error("No owner in ownership entry: {0}")]
    OwnerNotFound(String),

    /// Collecting live hostnames from the cluster failed
    #[error("Hostname collection failed: {0}")]
    HostnameCollection(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a record listing error
    pub fn provider_list(zone: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderList {
            zone: zone.into(),
            message: message.into(),
        }
    }

    /// Create a record mutation error
    pub fn provider_mutation(
        action: &'static str,
        record: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderMutation {
            action,
            record: record.into(),
            message: message.into(),
        }
    }

    /// Create a hostname collection error
    pub fn hostname_collection(msg: impl Into<String>) -> Self {
        Self::HostnameCollection(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Map an HTTP status returned by a provider API to an error
    ///
    /// Shared by the REST-based adapters so that 401/403, 404, 409, 429 and
    /// 5xx surface the same way regardless of back end.
    pub fn from_status(provider: &str, status: u16, context: &str, body: &str) -> Self {
        match status {
            401 | 403 => Self::auth(format!(
                "{}: invalid credentials or insufficient permissions (status {})",
                provider, status
            )),
            404 => Self::not_found(format!("{}: {}", provider, context)),
            409 => Self::provider(
                provider,
                format!("Conflict while {}: record changed concurrently (status {})", context, status),
            ),
            429 => Self::rate_limited(format!("{}: status {}", provider, status)),
            500..=599 => Self::provider(
                provider,
                format!("Server error (transient) while {}: {} - {}", context, status, body),
            ),
            _ => Self::provider(provider, format!("{} failed: {} - {}", context, status, body)),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
