//! Error types for the Helicone redirector
//!
//! The redirect layer only creates configuration and routing errors. Transport
//! failures from reqwest pass through untouched, and proxy-side rejections are
//! ordinary HTTP responses that the redirector never interprets.

use reqwest::StatusCode;
use thiserror::Error;

use crate::provider::Provider;

/// Redirector errors
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("HELICONE_API_KEY is not configured; refusing to send an unauthenticated proxy request")]
    MissingCredential,

    #[error("Invalid Helicone credential: {0}")]
    InvalidCredential(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{url} belongs to provider {owner}, not {provider}")]
    ForeignProviderHost {
        provider: Provider,
        owner: Provider,
        url: String,
    },

    #[error("API key for provider {0} is not configured")]
    MissingProviderKey(Provider),

    #[error("Upstream error {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl RedirectError {
    /// Whether this error was produced by configuration rather than the network
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RedirectError::MissingCredential
                | RedirectError::InvalidCredential(_)
                | RedirectError::InvalidUrl(_)
                | RedirectError::ForeignProviderHost { .. }
                | RedirectError::MissingProviderKey(_)
                | RedirectError::Config(_)
        )
    }
}

/// Result type alias for convenience
pub type RedirectResult<T> = Result<T, RedirectError>;
