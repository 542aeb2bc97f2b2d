//! HTTP clients for the supported provider APIs.
//!
//! # Responsibilities
//! - Build the provider-specific request (path, auth header, body shape)
//! - Map transport errors and non-success statuses to `BackendError`
//! - Extract the generated text from the provider's response body
//!
//! # Design Decisions
//! - One shared `reqwest::Client` for all backends (connection pooling)
//! - No retries here; the fallback executor decides what happens next
//! - Error bodies are truncated before they reach logs and results

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use crate::client::{BackendClient, BackendError, Completion, CompletionRequest};
use crate::registry::BackendKind;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_ERROR_BODY: usize = 512;

/// A provider reached over HTTPS.
pub struct HttpBackend {
    kind: BackendKind,
    base_url: Url,
    api_key: String,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(kind: BackendKind, base_url: Url, api_key: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            kind,
            base_url,
            api_key: api_key.into(),
            http,
        }
    }

    fn endpoint(&self, model: &str) -> Result<Url, BackendError> {
        let path = match self.kind {
            BackendKind::OpenAi => "v1/chat/completions".to_string(),
            BackendKind::Anthropic => "v1/messages".to_string(),
            BackendKind::Gemini => format!("v1beta/models/{}:generateContent", model),
        };
        self.base_url
            .join(&path)
            .map_err(|e| BackendError::Transport(format!("invalid endpoint: {}", e)))
    }

    fn build(&self, request: &CompletionRequest) -> Result<reqwest::RequestBuilder, BackendError> {
        let url = self.endpoint(&request.model)?;
        let builder = match self.kind {
            BackendKind::OpenAi => self
                .http
                .post(url)
                .bearer_auth(&self.api_key)
                .json(&json!({
                    "model": request.model,
                    "max_tokens": request.max_tokens,
                    "messages": [{ "role": "user", "content": request.prompt }],
                })),
            BackendKind::Anthropic => self
                .http
                .post(url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&json!({
                    "model": request.model,
                    "max_tokens": request.max_tokens,
                    "messages": [{ "role": "user", "content": request.prompt }],
                })),
            BackendKind::Gemini => self
                .http
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .json(&json!({
                    "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
                    "generationConfig": { "maxOutputTokens": request.max_tokens },
                })),
        };
        Ok(builder)
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        let response = self
            .build(request)?
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate(&mut body, MAX_ERROR_BODY);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        parse_completion(self.kind, &body)
    }
}

/// Extract generated text from a provider response body.
pub fn parse_completion(kind: BackendKind, body: &Value) -> Result<Completion, BackendError> {
    let content = match kind {
        BackendKind::OpenAi => body.pointer("/choices/0/message/content").and_then(Value::as_str),
        BackendKind::Anthropic => body.pointer("/content/0/text").and_then(Value::as_str),
        BackendKind::Gemini => body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str),
    };
    let content = content.ok_or_else(|| BackendError::Malformed(format!("no text in {} response", kind)))?;

    let model = match kind {
        BackendKind::OpenAi | BackendKind::Anthropic => body.get("model"),
        BackendKind::Gemini => body.get("modelVersion"),
    }
    .and_then(Value::as_str)
    .map(str::to_string);

    Ok(Completion {
        content: content.to_string(),
        model,
    })
}

fn truncate(text: &mut String, max: usize) {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
}
