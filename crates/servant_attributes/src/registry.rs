//! # Provider Registry
//!
//! Picks the attribute provider to use among everything registered.
//! Providers are kept highest priority first; equal priorities keep
//! registration order. Availability is asked fresh on every lookup, so a
//! backend that loads or unloads at runtime is picked up immediately.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::provider::AttributeProvider;

/// Registered attribute providers, ordered by priority.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<Vec<Arc<dyn AttributeProvider>>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider.
    pub fn register(&self, provider: Arc<dyn AttributeProvider>) {
        let mut providers = self.providers.write();
        let at = providers.partition_point(|p| p.priority() >= provider.priority());
        tracing::info!(
            "Registered attribute provider {} (priority {})",
            provider.name(),
            provider.priority()
        );
        providers.insert(at, provider);
    }

    /// The highest-priority provider that is available right now.
    #[must_use]
    pub fn active(&self) -> Option<Arc<dyn AttributeProvider>> {
        self.providers
            .read()
            .iter()
            .find(|p| p.is_available())
            .cloned()
    }

    /// Every registered provider, highest priority first.
    #[must_use]
    pub fn providers(&self) -> Vec<Arc<dyn AttributeProvider>> {
        self.providers.read().clone()
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}
