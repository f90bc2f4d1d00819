//! # Backend Client Interface
//!
//! The slice of the external attribute backend the bridge consumes.
//!
//! ```text
//! AttributeBackend::attribute_data(entity) ──► Option<BackendState>
//!                                                 │
//!     attribute_value(key) ◄──────────────────────┤
//!     apply_source(id, StaticSource, op, prio) ◄──┤
//!     applied_source_ids() / remove_source() ◄────┤
//!     clear_applied_sources() ◄───────────────────┘
//! ```
//!
//! The backend stores contributions as named *sources*. Applying a source id
//! that is already present replaces it, so a caller re-applying its own tag
//! overwrites rather than stacks.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use servant_core::EntityId;
use thiserror::Error;

/// Failure reported by the backend for a single call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    /// Creates a backend error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// How a source combines with the entity's other sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceOperation {
    /// Values are added to the attribute.
    #[default]
    Add,
    /// Values are subtracted from the attribute.
    Take,
}

/// A fixed set of values keyed by backend attribute name.
///
/// Each value list is the backend's range form: `[value]` for a point,
/// `[min, max]` for a range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticSource {
    /// Backend key -> values.
    pub values: BTreeMap<String, Vec<f64>>,
}

impl StaticSource {
    /// A source carrying one point value for one backend key.
    #[must_use]
    pub fn single(backend_key: impl Into<String>, value: f64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(backend_key.into(), vec![value]);
        Self { values }
    }
}

/// Client for the external attribute backend.
pub trait AttributeBackend: Send + Sync {
    /// Per-entity state handle.
    type State: BackendState;

    /// Whether the backend plugin is loaded right now.
    fn is_loaded(&self) -> bool;

    /// Looks up the backend's state for `entity`, `None` if it has none.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure if the lookup itself fails.
    fn attribute_data(&self, entity: EntityId) -> Result<Option<Self::State>, BackendError>;
}

/// The backend's attribute state for one entity.
pub trait BackendState {
    /// Current value list for `backend_key`, `None` if the backend has none.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure.
    fn attribute_value(&self, backend_key: &str) -> Result<Option<Vec<f64>>, BackendError>;

    /// Applies `source` under `source_id`, replacing any source with that id.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure.
    fn apply_source(
        &self,
        source_id: &str,
        source: StaticSource,
        operation: SourceOperation,
        priority: bool,
    ) -> Result<(), BackendError>;

    /// Removes one source, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure.
    fn remove_source(&self, source_id: &str) -> Result<bool, BackendError>;

    /// Removes every externally applied source.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure.
    fn clear_applied_sources(&self) -> Result<(), BackendError>;

    /// Ids of every externally applied source.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure.
    fn applied_source_ids(&self) -> Result<HashSet<String>, BackendError>;
}

// ============================================================================
// MOCK IMPLEMENTATIONS (For Testing)
// ============================================================================

/// One applied source inside the mock.
#[derive(Clone, Debug)]
struct MockSource {
    source: StaticSource,
    operation: SourceOperation,
}

/// Shared state behind every clone of the mock and its state handles.
#[derive(Debug, Default)]
struct MockLedger {
    /// Entity -> source id -> applied source.
    entities: HashMap<EntityId, BTreeMap<String, MockSource>>,
    /// Number of trait calls received.
    calls: usize,
    /// When set, every trait call fails.
    failing: bool,
}

impl MockLedger {
    /// Counts one call and fails it if the ledger is failing.
    fn record_call(&mut self) -> Result<(), BackendError> {
        self.calls += 1;
        if self.failing {
            Err(BackendError::new("simulated backend failure"))
        } else {
            Ok(())
        }
    }
}

/// In-process attribute backend for tests and simulations.
///
/// Entities only have backend state after [`register_entity`]. Values are
/// summed element-wise over every source that carries the key. Clones share
/// the same ledger.
///
/// [`register_entity`]: MockAttributeBackend::register_entity
#[derive(Clone, Debug)]
pub struct MockAttributeBackend {
    loaded: Arc<AtomicBool>,
    ledger: Arc<Mutex<MockLedger>>,
}

impl MockAttributeBackend {
    /// Creates a loaded mock backend with no entities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaded: Arc::new(AtomicBool::new(true)),
            ledger: Arc::new(Mutex::new(MockLedger::default())),
        }
    }

    /// Simulates the backend plugin being loaded or unloaded.
    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::SeqCst);
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.ledger.lock().failing = failing;
    }

    /// Gives `entity` (empty) backend state.
    pub fn register_entity(&self, entity: EntityId) {
        self.ledger.lock().entities.entry(entity).or_default();
    }

    /// Drops `entity`'s backend state, as if it despawned.
    pub fn forget_entity(&self, entity: EntityId) {
        self.ledger.lock().entities.remove(&entity);
    }

    /// Number of trait calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.ledger.lock().calls
    }

    /// Sorted source ids applied to `entity` (not counted as a call).
    #[must_use]
    pub fn source_ids(&self, entity: EntityId) -> Vec<String> {
        self.ledger
            .lock()
            .entities
            .get(&entity)
            .map(|sources| sources.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Combined value list of `backend_key` on `entity` (not counted as a call).
    #[must_use]
    pub fn value(&self, entity: EntityId, backend_key: &str) -> Option<Vec<f64>> {
        self.ledger
            .lock()
            .entities
            .get(&entity)
            .and_then(|sources| combine(sources, backend_key))
    }
}

impl Default for MockAttributeBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Sums every source's values for `backend_key`, element-wise.
fn combine(sources: &BTreeMap<String, MockSource>, backend_key: &str) -> Option<Vec<f64>> {
    let mut total: Option<Vec<f64>> = None;
    for applied in sources.values() {
        let Some(values) = applied.source.values.get(backend_key) else {
            continue;
        };
        let sum = total.get_or_insert_with(Vec::new);
        if sum.len() < values.len() {
            sum.resize(values.len(), 0.0);
        }
        for (slot, v) in sum.iter_mut().zip(values) {
            match applied.operation {
                SourceOperation::Add => *slot += v,
                SourceOperation::Take => *slot -= v,
            }
        }
    }
    total
}

impl AttributeBackend for MockAttributeBackend {
    type State = MockBackendState;

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn attribute_data(&self, entity: EntityId) -> Result<Option<Self::State>, BackendError> {
        let mut ledger = self.ledger.lock();
        ledger.record_call()?;
        Ok(ledger.entities.contains_key(&entity).then(|| MockBackendState {
            entity,
            ledger: Arc::clone(&self.ledger),
        }))
    }
}

/// State handle returned by [`MockAttributeBackend`].
#[derive(Clone, Debug)]
pub struct MockBackendState {
    entity: EntityId,
    ledger: Arc<Mutex<MockLedger>>,
}

impl MockBackendState {
    /// Runs `f` on this entity's sources after recording the call.
    ///
    /// A vanished entity behaves as an entity with no sources.
    fn with_sources<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, MockSource>) -> R,
    ) -> Result<R, BackendError> {
        let mut ledger = self.ledger.lock();
        ledger.record_call()?;
        let mut vanished = BTreeMap::new();
        let sources = ledger.entities.get_mut(&self.entity).unwrap_or(&mut vanished);
        Ok(f(sources))
    }
}

impl BackendState for MockBackendState {
    fn attribute_value(&self, backend_key: &str) -> Result<Option<Vec<f64>>, BackendError> {
        self.with_sources(|sources| combine(sources, backend_key))
    }

    fn apply_source(
        &self,
        source_id: &str,
        source: StaticSource,
        operation: SourceOperation,
        _priority: bool,
    ) -> Result<(), BackendError> {
        self.with_sources(|sources| {
            sources.insert(source_id.to_string(), MockSource { source, operation });
        })
    }

    fn remove_source(&self, source_id: &str) -> Result<bool, BackendError> {
        self.with_sources(|sources| sources.remove(source_id).is_some())
    }

    fn clear_applied_sources(&self) -> Result<(), BackendError> {
        self.with_sources(BTreeMap::clear)
    }

    fn applied_source_ids(&self) -> Result<HashSet<String>, BackendError> {
        self.with_sources(|sources| sources.keys().cloned().collect())
    }
}
