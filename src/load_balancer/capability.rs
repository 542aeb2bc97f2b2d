//! Capability-constrained selection.

use std::collections::BTreeSet;

use crate::load_balancer::{BackendView, LoadBalancer};
use crate::registry::BackendId;

/// Picks the lowest-tier healthy backend offering every required capability.
/// Ties go to registry order.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySelector {
    required: BTreeSet<String>,
}

impl CapabilitySelector {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }
}

impl LoadBalancer for CapabilitySelector {
    fn next_backend(&self, view: &BackendView<'_>) -> Option<BackendId> {
        view.registry.by_tier().into_iter().find(|id| {
            view.registry
                .get_config(*id)
                .is_some_and(|config| config.supports(&self.required))
                && view.health.is_healthy(*id)
        })
    }
}
