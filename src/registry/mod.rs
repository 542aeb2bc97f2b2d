//! Backend registry.
//!
//! # Data Flow
//! ```text
//! RouterConfig.backends (one entry per potential backend)
//!     → resolve credential (inline key or environment variable)
//!         - missing → backend omitted, logged
//!     → apply kind defaults to unset fields
//!     → Backend { id, config, client } pushed into the arena
//!     → zero backends → RouterError::NoBackends
//! ```
//!
//! # Design Decisions
//! - Arena indexed by `BackendId`; names resolve to ids once
//! - Immutable after construction, shared without locks
//! - Registry order is the tiebreak everywhere tiers are equal

pub mod backend;
pub mod kind;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::client::{BackendClient, HttpBackend};
use crate::config::{BackendEntry, RouterConfig};
use crate::error::RouterError;

pub use backend::{estimate_units, Backend, BackendConfig, BackendId};
pub use kind::BackendKind;

/// The fixed set of configured backends.
#[derive(Debug)]
pub struct Registry {
    backends: Vec<Backend>,
    index: HashMap<String, BackendId>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Build HTTP-backed backends from configuration.
    ///
    /// `credentials` maps an environment variable name to its value; pass
    /// `|var| std::env::var(var).ok()` for the process environment.
    pub fn from_config<F>(config: &RouterConfig, credentials: F) -> Result<Self, RouterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;

        let mut builder = Registry::builder();
        for entry in &config.backends {
            let api_key = entry
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .or_else(|| credentials(entry.api_key_env()).filter(|k| !k.is_empty()));

            let Some(api_key) = api_key else {
                tracing::info!(
                    backend = %entry.name(),
                    env = %entry.api_key_env(),
                    "No credential found, backend omitted"
                );
                continue;
            };

            let backend_config = resolve_entry(entry)?;
            let client = HttpBackend::new(entry.kind, backend_config.base_url.clone(), api_key, http.clone());
            builder = builder.backend(backend_config, Arc::new(client));
        }
        builder.build()
    }

    /// All backends in registry order.
    pub fn list_backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn get(&self, id: BackendId) -> Option<&Backend> {
        self.backends.get(id.0)
    }

    pub fn get_config(&self, id: BackendId) -> Option<&BackendConfig> {
        self.get(id).map(|b| &b.config)
    }

    /// Resolve a backend name to its id.
    pub fn lookup(&self, name: &str) -> Option<BackendId> {
        self.index.get(name).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.backends.iter().map(|b| b.id)
    }

    /// Ids sorted by ascending tier, registry order within a tier.
    pub fn by_tier(&self) -> Vec<BackendId> {
        let mut ids: Vec<BackendId> = self.ids().collect();
        // stable sort keeps registry order within a tier
        ids.sort_by_key(|id| self.backends[id.0].config.tier);
        ids
    }

    pub fn names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.config.name.clone()).collect()
    }

    pub fn limits(&self) -> Vec<u32> {
        self.backends.iter().map(|b| b.config.max_requests_per_window).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

/// Incrementally assembles a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<(BackendConfig, Arc<dyn BackendClient>)>,
}

impl RegistryBuilder {
    pub fn backend(mut self, config: BackendConfig, client: Arc<dyn BackendClient>) -> Self {
        self.entries.push((config, client));
        self
    }

    pub fn build(self) -> Result<Registry, RouterError> {
        if self.entries.is_empty() {
            return Err(RouterError::NoBackends);
        }

        let mut backends = Vec::with_capacity(self.entries.len());
        let mut index = HashMap::with_capacity(self.entries.len());
        for (i, (config, client)) in self.entries.into_iter().enumerate() {
            let id = BackendId(i);
            if index.insert(config.name.clone(), id).is_some() {
                return Err(RouterError::DuplicateBackend(config.name));
            }
            tracing::info!(
                backend = %config.name,
                kind = %config.kind,
                model = %config.model,
                tier = config.tier,
                rate_limit = config.max_requests_per_window,
                "Backend registered"
            );
            backends.push(Backend { id, config, client });
        }

        Ok(Registry { backends, index })
    }
}

fn resolve_entry(entry: &BackendEntry) -> Result<BackendConfig, RouterError> {
    let kind = entry.kind;
    let mut config = BackendConfig::for_kind(kind).with_name(entry.name());

    if let Some(model) = &entry.model {
        config.model = model.clone();
    }
    if let Some(tier) = entry.tier {
        config.tier = tier;
    }
    if let Some(limit) = entry.max_requests_per_minute {
        config.max_requests_per_window = limit;
    }
    if let Some(max_output) = entry.max_output_tokens {
        config.max_output_tokens = max_output;
    }
    if let Some(cost) = entry.cost_per_1k {
        config.cost_per_1k = cost;
    }
    if let Some(caps) = &entry.capabilities {
        config.capabilities = caps.iter().map(|c| c.trim().to_string()).collect();
    }
    if let Some(url) = &entry.base_url {
        config.base_url = Url::parse(url).map_err(|source| RouterError::InvalidBaseUrl {
            name: config.name.clone(),
            source,
        })?;
    }

    Ok(config)
}
