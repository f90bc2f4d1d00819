//! # AttributePlus Bridge
//!
//! [`AttributeProvider`] over the AttributePlus stat backend.
//!
//! ## Data Flow
//!
//! ```text
//! set_value(e, "max_health", 40)
//!     │  mapping: max_health -> 生命力
//!     ▼
//! backend.attribute_data(e).apply_source("servant_max_health", {生命力: [40]}, ADD)
//!
//! add_temporary_modifier(e, "max_health", 10, 100 ticks)
//!     │  same submission, tagged "servant_temp_max_health"
//!     ▼
//! TickScheduler ── 100 ticks ──► ModifierExpiry ──► clear if tag still present
//! ```
//!
//! Every public operation is total. Missing mappings are silent; backend
//! failures are logged and read as `0.0` or dropped.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use servant_core::{EntityId, Tick, TickScheduler, Ticks};

use crate::backend::{AttributeBackend, BackendState, SourceOperation, StaticSource};
use crate::config::StatsConfig;
use crate::error::{AttributeError, AttributeResult};
use crate::mapping::AttributeMapping;
use crate::provider::AttributeProvider;

/// Backend name used for `mapping.<backend>` lookups and as provider name.
pub const ATTRIBUTE_PLUS: &str = "attributeplus";

/// Source id prefix for values written by [`AttributeProvider::set_value`].
pub const SOURCE_PREFIX: &str = "servant_";

/// Source id prefix for temporary modifiers.
pub const TEMP_SOURCE_PREFIX: &str = "servant_temp_";

/// What an expiring temporary modifier removes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Clear every externally applied source on the entity.
    ///
    /// Coarse: other servant values on the same entity go too.
    #[default]
    ClearAll,
    /// Remove only the expiring modifier's own source.
    SourceOnly,
}

/// Bridge configuration.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Backend name for mapping lookups.
    pub backend_name: String,
    /// Location of the stats document.
    pub stats_path: PathBuf,
    /// Provider priority.
    pub priority: i32,
    /// Expiry clearing policy.
    pub expiry_policy: ExpiryPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            backend_name: ATTRIBUTE_PLUS.to_string(),
            stats_path: PathBuf::from("plugins/Servant/stats.toml"),
            priority: 100,
            expiry_policy: ExpiryPolicy::ClearAll,
        }
    }
}

/// A pending temporary modifier removal.
///
/// Holds only identifiers; backend state is looked up when it fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModifierExpiry {
    /// Entity the modifier was applied to.
    pub entity: EntityId,
    /// Internal attribute key.
    pub key: String,
    /// Backend source id tagging the modifier.
    pub source_id: String,
}

/// Attribute provider backed by AttributePlus.
pub struct AttributePlusProvider<B: AttributeBackend> {
    backend: B,
    mapping: AttributeMapping,
    priority: i32,
    expiry_policy: ExpiryPolicy,
    expiries: Mutex<TickScheduler<ModifierExpiry>>,
}

impl<B: AttributeBackend> AttributePlusProvider<B> {
    /// Creates the bridge, loading the mapping from `config.stats_path`.
    ///
    /// A missing stats file is replaced by the default first. If the
    /// document cannot be loaded the bridge starts with an empty mapping.
    pub fn new(backend: B, config: BridgeConfig) -> Self {
        let mapping = match StatsConfig::load_or_bootstrap(&config.stats_path) {
            Ok(stats) => AttributeMapping::from_config(&stats, &config.backend_name),
            Err(err) => {
                tracing::warn!("Attribute mapping unavailable, bridging nothing: {err}");
                AttributeMapping::new(config.backend_name.clone())
            }
        };
        Self::with_mapping(backend, mapping)
            .with_priority(config.priority)
            .with_expiry_policy(config.expiry_policy)
    }

    /// Creates the bridge around an already-built mapping.
    pub fn with_mapping(backend: B, mapping: AttributeMapping) -> Self {
        let defaults = BridgeConfig::default();
        Self {
            backend,
            mapping,
            priority: defaults.priority,
            expiry_policy: defaults.expiry_policy,
            expiries: Mutex::new(TickScheduler::new()),
        }
    }

    /// Sets the provider priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the expiry clearing policy.
    #[must_use]
    pub fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    /// The loaded mapping table.
    #[must_use]
    pub fn mapping(&self) -> &AttributeMapping {
        &self.mapping
    }

    /// The backend client.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Backend key for an internal attribute key.
    #[must_use]
    pub fn get_mapped_attribute_name(&self, key: &str) -> Option<&str> {
        self.mapping.backend_key(key)
    }

    /// Converts internal point values to backend `[min, max]` ranges.
    ///
    /// Unmapped keys are dropped.
    #[must_use]
    pub fn map_attributes(&self, attributes: &HashMap<String, f64>) -> HashMap<String, Vec<f64>> {
        attributes
            .iter()
            .filter_map(|(key, &value)| {
                self.mapping
                    .backend_key(key)
                    .map(|backend_key| (backend_key.to_string(), vec![value, value]))
            })
            .collect()
    }

    /// Converts backend value lists back to internal point values.
    ///
    /// Uses the second element (the effective maximum) when present, else
    /// the first. Keys with no reverse mapping or no values are dropped.
    #[must_use]
    pub fn map_attributes_back(
        &self,
        attributes: &HashMap<String, Vec<f64>>,
    ) -> HashMap<String, f64> {
        let inverted = self.mapping.inverted();
        attributes
            .iter()
            .filter_map(|(backend_key, values)| {
                let key = inverted.get(backend_key.as_str())?;
                let value = values.get(1).or_else(|| values.first())?;
                Some(((*key).to_string(), *value))
            })
            .collect()
    }

    /// Advances the expiry clock one tick and fires every due expiry.
    ///
    /// Returns how many expiries fired. Call once per simulation tick.
    pub fn tick(&self) -> usize {
        let due = self.expiries.lock().advance();
        for expiry in &due {
            match self.fire_expiry(expiry) {
                Ok(true) => tracing::debug!(
                    "Expired modifier {} on entity {}",
                    expiry.source_id,
                    expiry.entity
                ),
                Ok(false) => {}
                Err(err) => tracing::warn!("Modifier expiry {} dropped: {err}", expiry.source_id),
            }
        }
        due.len()
    }

    /// Number of temporary modifiers waiting to expire.
    #[must_use]
    pub fn pending_expiries(&self) -> usize {
        self.expiries.lock().len()
    }

    /// Pending expiries with the tick each is due on, earliest first.
    #[must_use]
    pub fn scheduled_expiries(&self) -> Vec<(Tick, ModifierExpiry)> {
        self.expiries
            .lock()
            .iter()
            .map(|(due, expiry)| (due, expiry.clone()))
            .collect()
    }

    /// Backend key for `key`, or a mapping miss.
    fn resolve(&self, key: &str) -> AttributeResult<&str> {
        self.mapping
            .backend_key(key)
            .ok_or_else(|| AttributeError::MappingMiss {
                key: key.to_string(),
                backend: self.mapping.backend().to_string(),
            })
    }

    /// Backend state for `entity`, `None` if the backend has none.
    fn state(&self, operation: &'static str, entity: EntityId) -> AttributeResult<Option<B::State>> {
        if !self.backend.is_loaded() {
            return Err(AttributeError::BackendUnavailable(
                self.mapping.backend().to_string(),
            ));
        }
        self.backend
            .attribute_data(entity)
            .map_err(|e| AttributeError::backend_call(operation, entity, e))
    }

    fn read(&self, entity: EntityId, key: &str) -> AttributeResult<f64> {
        let backend_key = self.resolve(key)?;
        let Some(state) = self.state("read", entity)? else {
            return Ok(0.0);
        };
        let values = state
            .attribute_value(backend_key)
            .map_err(|e| AttributeError::backend_call("read", entity, e))?;
        Ok(values.and_then(|v| v.first().copied()).unwrap_or(0.0))
    }

    /// Applies `value` as an additive source tagged `source_id`.
    ///
    /// Returns `false` if the entity has no backend state.
    fn submit(
        &self,
        operation: &'static str,
        entity: EntityId,
        backend_key: &str,
        source_id: &str,
        value: f64,
    ) -> AttributeResult<bool> {
        let Some(state) = self.state(operation, entity)? else {
            return Ok(false);
        };
        state
            .apply_source(
                source_id,
                StaticSource::single(backend_key, value),
                SourceOperation::Add,
                true,
            )
            .map_err(|e| AttributeError::backend_call(operation, entity, e))?;
        Ok(true)
    }

    /// Clears the modifier's state if its source is still applied.
    ///
    /// Returns whether anything was cleared.
    fn fire_expiry(&self, expiry: &ModifierExpiry) -> AttributeResult<bool> {
        let entity = expiry.entity;
        let call_err = |e| AttributeError::backend_call("expire", entity, e);

        let Some(state) = self.state("expire", entity)? else {
            return Ok(false);
        };
        if !state.applied_source_ids().map_err(call_err)?.contains(&expiry.source_id) {
            return Ok(false);
        }
        match self.expiry_policy {
            ExpiryPolicy::ClearAll => state.clear_applied_sources().map_err(call_err)?,
            ExpiryPolicy::SourceOnly => {
                state.remove_source(&expiry.source_id).map_err(call_err)?;
            }
        }
        Ok(true)
    }

    /// Logs a failed write unless it was a plain mapping miss.
    fn report_write(
        &self,
        operation: &str,
        entity: EntityId,
        key: &str,
        result: AttributeResult<bool>,
    ) {
        match result {
            Ok(true) | Err(AttributeError::MappingMiss { .. }) => {}
            Ok(false) => tracing::debug!(
                "No {} state for entity {entity}, {operation} of {key} skipped",
                self.mapping.backend()
            ),
            Err(AttributeError::BackendUnavailable(_)) => {
                tracing::debug!("{operation} of {key} on entity {entity} skipped: backend not loaded");
            }
            Err(err) => tracing::warn!("{operation} of {key} on entity {entity} failed: {err}"),
        }
    }
}

impl<B: AttributeBackend> AttributeProvider for AttributePlusProvider<B> {
    fn name(&self) -> &str {
        self.mapping.backend()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_available(&self) -> bool {
        self.backend.is_loaded()
    }

    fn get_value(&self, entity: EntityId, key: &str) -> f64 {
        match self.read(entity, key) {
            Ok(value) => value,
            Err(AttributeError::MappingMiss { .. } | AttributeError::BackendUnavailable(_)) => 0.0,
            Err(err) => {
                tracing::warn!("Reading {key} on entity {entity} failed, using 0: {err}");
                0.0
            }
        }
    }

    fn set_value(&self, entity: EntityId, key: &str, value: f64) {
        let result = self.resolve(key).and_then(|backend_key| {
            self.submit("set", entity, backend_key, &format!("{SOURCE_PREFIX}{key}"), value)
        });
        self.report_write("set", entity, key, result);
    }

    fn add_temporary_modifier(&self, entity: EntityId, key: &str, value: f64, duration: Ticks) {
        let source_id = format!("{TEMP_SOURCE_PREFIX}{key}");
        let result = self
            .resolve(key)
            .and_then(|backend_key| self.submit("modify", entity, backend_key, &source_id, value));

        let applied = matches!(result, Ok(true));
        self.report_write("modify", entity, key, result);
        if applied {
            self.expiries.lock().schedule(
                duration,
                ModifierExpiry {
                    entity,
                    key: key.to_string(),
                    source_id,
                },
            );
        }
    }
}
