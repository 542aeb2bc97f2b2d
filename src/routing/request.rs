//! Routing requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A generation request to be routed to one backend.
///
/// The prompt is opaque to the router; it is only measured for cost estimates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoutingRequest {
    /// Correlation id carried through every log event.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub prompt: String,

    /// Backends lacking any of these capabilities are not candidates.
    #[serde(default)]
    pub capabilities: BTreeSet<String>,

    /// Backend to try first, if configured.
    #[serde(default)]
    pub preferred: Option<String>,

    /// Cap on generated tokens; never above the backend's own limit.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl RoutingRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            capabilities: BTreeSet::new(),
            preferred: None,
            max_tokens: None,
        }
    }

    pub fn prefer(mut self, backend: impl Into<String>) -> Self {
        self.preferred = Some(backend.into());
        self
    }

    pub fn require<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(capabilities.into_iter().map(Into::into));
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Output budget for a backend whose own ceiling is `backend_max`.
    pub fn output_budget(&self, backend_max: u32) -> u32 {
        self.max_tokens.map_or(backend_max, |m| m.min(backend_max))
    }
}
