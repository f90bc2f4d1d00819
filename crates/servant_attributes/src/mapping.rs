//! # Attribute Mapping Table
//!
//! Internal attribute keys -> backend-native keys, for one backend.
//!
//! The forward table is ordered by internal key. Reverse lookups are
//! computed on demand by walking it in that order, so when two internal keys
//! share a backend key the lexicographically last one wins. Such backend keys
//! are reported by [`AttributeMapping::ambiguous_backend_keys`] and logged
//! when the table is built from configuration.

use std::collections::{BTreeMap, HashMap};

use crate::config::StatsConfig;

/// Key mapping between the game's attribute names and one backend's names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeMapping {
    /// Backend these keys belong to.
    backend: String,
    /// Internal key -> backend key.
    forward: BTreeMap<String, String>,
}

impl AttributeMapping {
    /// Creates an empty mapping for `backend`.
    #[must_use]
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            forward: BTreeMap::new(),
        }
    }

    /// Builds the mapping for `backend` from a stats document.
    ///
    /// Entries without a `mapping.<backend>` field are skipped.
    #[must_use]
    pub fn from_config(config: &StatsConfig, backend: &str) -> Self {
        let mut mapping = Self::new(backend);
        for (key, entry) in &config.stats {
            if let Some(backend_key) = entry.mapping.get(backend) {
                mapping.insert(key.clone(), backend_key.clone());
            }
        }

        for shared in mapping.ambiguous_backend_keys() {
            tracing::warn!(
                "{backend} key {shared} is mapped from several attributes; \
                 reverse lookups resolve to {:?}",
                mapping.internal_key(shared)
            );
        }
        tracing::info!("Loaded {} {backend} attribute mappings", mapping.len());
        mapping
    }

    /// Maps `key` to `backend_key`, returning the previous backend key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        backend_key: impl Into<String>,
    ) -> Option<String> {
        self.forward.insert(key.into(), backend_key.into())
    }

    /// Backend this mapping targets.
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Backend key for an internal key.
    #[must_use]
    pub fn backend_key(&self, key: &str) -> Option<&str> {
        self.forward.get(key).map(String::as_str)
    }

    /// Internal key for a backend key (last internal key wins).
    #[must_use]
    pub fn internal_key(&self, backend_key: &str) -> Option<&str> {
        self.forward
            .iter()
            .filter(|(_, b)| b.as_str() == backend_key)
            .map(|(k, _)| k.as_str())
            .last()
    }

    /// Backend key -> internal key for every mapped attribute.
    #[must_use]
    pub fn inverted(&self) -> HashMap<&str, &str> {
        self.forward
            .iter()
            .map(|(k, b)| (b.as_str(), k.as_str()))
            .collect()
    }

    /// Backend keys that more than one internal key maps to, sorted.
    #[must_use]
    pub fn ambiguous_backend_keys(&self) -> Vec<&str> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for backend_key in self.forward.values() {
            *counts.entry(backend_key.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(b, _)| b)
            .collect()
    }

    /// Iterates `(internal key, backend key)` pairs in internal-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(k, b)| (k.as_str(), b.as_str()))
    }

    /// Number of mapped attributes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns true if nothing is mapped.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
