//! Startup-time errors.
//!
//! Runtime failures never surface as `Err`: a failed attempt is a
//! [`BackendError`](crate::client::BackendError) recorded against the backend,
//! and a failed request is a [`RoutingResult`](crate::routing::RoutingResult).

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors that prevent the router from starting.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Every configured backend was omitted (usually missing credentials).
    #[error("no backends available: every configured backend is missing credentials")]
    NoBackends,

    /// Two backends resolved to the same identity.
    #[error("duplicate backend name `{0}`")]
    DuplicateBackend(String),

    /// A backend's base URL could not be parsed.
    #[error("invalid base URL for backend `{name}`: {source}")]
    InvalidBaseUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The shared HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
