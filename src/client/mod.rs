//! Backend clients.
//!
//! A client performs exactly one remote call per [`BackendClient::complete`]
//! invocation. Health bookkeeping, rate limiting and timeouts live in the
//! layers above; implementations just report what happened.

pub mod http;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use http::HttpBackend;

/// Request handed to a single backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Prompt text sent as a single user message.
    pub prompt: String,
    /// Model identifier at the provider.
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Successful backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Generated text.
    pub content: String,
    /// Model the provider reports having used, when it says.
    pub model: Option<String>,
}

impl Completion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
        }
    }
}

/// Why a single attempt failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// Connection refused, DNS failure, reset, etc.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The attempt exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// One upstream text-generation provider.
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError>;
}
