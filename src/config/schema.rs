//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::registry::BackendKind;

/// Root configuration for the router daemon.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener for the HTTP surface.
    pub listener: ListenerConfig,

    /// Potential backends. Entries without a credential are skipped at startup.
    pub backends: Vec<BackendEntry>,

    /// Health tracking thresholds.
    pub health: HealthConfig,

    /// Per-backend request window.
    pub rate_limit: RateLimitConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin endpoints.
    pub admin: AdminConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: BackendKind::ALL.iter().map(|kind| BackendEntry::new(*kind)).collect(),
            health: HealthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8090").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8090".to_string(),
        }
    }
}

/// One potential backend.
///
/// Only `kind` is required; everything else falls back to the kind's defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendEntry {
    /// Provider kind.
    pub kind: BackendKind,

    /// Unique identity; defaults to the kind name.
    #[serde(default)]
    pub name: Option<String>,

    /// Model identifier sent upstream.
    #[serde(default)]
    pub model: Option<String>,

    /// Inline API key. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable to read the API key from.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Override for the provider's API root.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Priority tier (lower = preferred).
    #[serde(default)]
    pub tier: Option<u8>,

    /// Maximum requests per rate-limit window.
    #[serde(default)]
    pub max_requests_per_minute: Option<u32>,

    /// Maximum output size in tokens.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,

    /// Cost in USD per 1,000 processed tokens.
    #[serde(default)]
    pub cost_per_1k: Option<f64>,

    /// Capability tags, e.g. "long-context".
    #[serde(default)]
    pub capabilities: Option<Vec<String>>,
}

impl BackendEntry {
    /// An entry that uses every default for `kind`.
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            name: None,
            model: None,
            api_key: None,
            api_key_env: None,
            base_url: None,
            tier: None,
            max_requests_per_minute: None,
            max_output_tokens: None,
            cost_per_1k: None,
            capabilities: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(self.kind.default_api_key_env())
    }
}

/// Health tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Consecutive failures before a backend is marked unhealthy.
    pub failure_threshold: u32,

    /// Seconds after the last failure before an unhealthy backend is retried.
    pub recovery_secs: u64,

    /// Response-time samples kept for the rolling average.
    pub latency_samples: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_secs: 300,
            latency_samples: 100,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Length of the fixed counting window in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { window_secs: 60 }
    }
}

/// Timeout configuration for backend calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for a single backend attempt in seconds.
    pub attempt_secs: u64,

    /// Deadline for a whole HTTP request to the router in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            attempt_secs: 60,
            request_secs: 180,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Expose `/admin/*`.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_backend_entry() {
        let config: RouterConfig = toml::from_str(
            r#"
            [[backends]]
            kind = "gemini"
            tier = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.backends.len(), 1);
        let entry = &config.backends[0];
        assert_eq!(entry.name(), "gemini");
        assert_eq!(entry.api_key_env(), "GEMINI_API_KEY");
        assert_eq!(entry.tier, Some(1));
        assert_eq!(config.health.failure_threshold, 3);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn test_default_lists_every_kind() {
        let config = RouterConfig::default();
        let names: Vec<&str> = config.backends.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["openai", "anthropic", "gemini"]);
    }
}
