//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check backend identities are unique
//! - Validate value ranges (limits > 0, timeouts > 0, tiers >= 1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::config::schema::RouterConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("backend `{0}` is defined more than once")]
    DuplicateBackend(String),

    #[error("backend `{0}`: tier must be at least 1")]
    ZeroTier(String),

    #[error("backend `{0}`: max_requests_per_minute must be greater than 0")]
    ZeroRequestLimit(String),

    #[error("backend `{0}`: max_output_tokens must be greater than 0")]
    ZeroOutputLimit(String),

    #[error("backend `{0}`: cost_per_1k must be a non-negative number")]
    InvalidCost(String),

    #[error("backend `{0}`: capability tags must not be empty")]
    EmptyCapability(String),

    #[error("backend `{name}`: invalid base_url `{url}`")]
    InvalidBaseUrl { name: String, url: String },

    #[error("{0} must be greater than 0")]
    ZeroValue(&'static str),

    #[error("listener bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for entry in &config.backends {
        let name = entry.name().to_string();
        if !seen.insert(name.clone()) {
            errors.push(ValidationError::DuplicateBackend(name.clone()));
        }
        if entry.tier == Some(0) {
            errors.push(ValidationError::ZeroTier(name.clone()));
        }
        if entry.max_requests_per_minute == Some(0) {
            errors.push(ValidationError::ZeroRequestLimit(name.clone()));
        }
        if entry.max_output_tokens == Some(0) {
            errors.push(ValidationError::ZeroOutputLimit(name.clone()));
        }
        if let Some(cost) = entry.cost_per_1k {
            if !cost.is_finite() || cost < 0.0 {
                errors.push(ValidationError::InvalidCost(name.clone()));
            }
        }
        if let Some(caps) = &entry.capabilities {
            if caps.iter().any(|c| c.trim().is_empty()) {
                errors.push(ValidationError::EmptyCapability(name.clone()));
            }
        }
        if let Some(url) = &entry.base_url {
            if Url::parse(url).is_err() {
                errors.push(ValidationError::InvalidBaseUrl { name: name.clone(), url: url.clone() });
            }
        }
    }

    if config.health.failure_threshold == 0 {
        errors.push(ValidationError::ZeroValue("health.failure_threshold"));
    }
    if config.health.latency_samples == 0 {
        errors.push(ValidationError::ZeroValue("health.latency_samples"));
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroValue("rate_limit.window_secs"));
    }
    if config.timeouts.attempt_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.attempt_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
