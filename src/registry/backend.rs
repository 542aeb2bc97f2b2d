//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single configured backend
//! - Hold its immutable limits, tier, cost and capabilities
//! - Own the client handle used to reach it

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::client::BackendClient;
use crate::registry::BackendKind;

/// Dense index of a backend inside its [`Registry`](crate::registry::Registry).
///
/// Only valid for the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(pub(crate) usize);

impl BackendId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Resolved, immutable configuration of one backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendConfig {
    /// Unique identity.
    pub name: String,
    pub kind: BackendKind,
    /// Model identifier sent upstream.
    pub model: String,
    /// Priority tier (lower = preferred).
    pub tier: u8,
    /// Requests allowed per rate-limit window.
    pub max_requests_per_window: u32,
    pub max_output_tokens: u32,
    /// USD per 1,000 processed tokens.
    pub cost_per_1k: f64,
    pub capabilities: BTreeSet<String>,
    #[serde(skip)]
    pub base_url: Url,
}

impl BackendConfig {
    /// Config populated entirely from the defaults for `kind`.
    pub fn for_kind(kind: BackendKind) -> Self {
        Self {
            name: kind.as_str().to_string(),
            kind,
            model: kind.default_model().to_string(),
            tier: kind.default_tier(),
            max_requests_per_window: kind.default_requests_per_window(),
            max_output_tokens: kind.default_max_output_tokens(),
            cost_per_1k: kind.default_cost_per_1k(),
            capabilities: kind.default_capabilities().iter().map(|c| c.to_string()).collect(),
            base_url: Url::parse(kind.default_base_url()).expect("built-in base URL is valid"),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_rate_limit(mut self, max_requests_per_window: u32) -> Self {
        self.max_requests_per_window = max_requests_per_window;
        self
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// True if this backend offers every capability in `required`.
    pub fn supports(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.capabilities)
    }

    /// Estimated USD cost for `units` processed tokens.
    pub fn estimate_cost(&self, units: usize) -> f64 {
        units as f64 / 1000.0 * self.cost_per_1k
    }
}

/// A configured backend: its config plus the client that reaches it.
pub struct Backend {
    pub id: BackendId,
    pub config: BackendConfig,
    pub client: Arc<dyn BackendClient>,
}

impl Backend {
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Rough token count for a payload: one unit per four characters.
pub fn estimate_units(prompt: &str, response: &str) -> usize {
    (prompt.chars().count() + response.chars().count()).div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_superset() {
        let config = BackendConfig::for_kind(BackendKind::Anthropic)
            .with_capabilities(["long-context", "function-calling"]);
        let want = |caps: &[&str]| caps.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>();

        assert!(config.supports(&want(&[])));
        assert!(config.supports(&want(&["long-context"])));
        assert!(config.supports(&want(&["long-context", "function-calling"])));
        assert!(!config.supports(&want(&["long-context", "multimodal"])));
    }

    #[test]
    fn test_cost_estimate() {
        let mut config = BackendConfig::for_kind(BackendKind::OpenAi);
        config.cost_per_1k = 0.002;
        assert_eq!(estimate_units("abcd", "efghi"), 3);
        assert!((config.estimate_cost(1500) - 0.003).abs() < 1e-12);
    }
}
