//! # Proxy Collaborators
//!
//! Traits the interceptor and combat resolver consume. The host's servant
//! manager implements them; [`ProxyRoster`], [`BasicProxy`] and
//! [`MockNotifier`] are in-process versions for simple hosts and tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use servant_core::EntityId;

use crate::allocator::SyntheticIdAllocator;

/// Life state of a proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyState {
    /// Health above zero; can take hits.
    Alive,
    /// Health at or below zero. Terminal.
    Dead,
}

impl ProxyState {
    /// State implied by a health value.
    #[inline]
    #[must_use]
    pub fn from_health(health: f64) -> Self {
        if health > 0.0 {
            Self::Alive
        } else {
            Self::Dead
        }
    }
}

/// A servant stand-in addressed by a synthetic entity id.
pub trait ProxyEntity: Send + Sync {
    /// Primary synthetic id.
    fn entity_id(&self) -> EntityId;

    /// Player who owns the servant.
    fn owner(&self) -> EntityId;

    /// Current health.
    fn health(&self) -> f64;

    /// Overwrites current health.
    fn set_health(&self, health: f64);

    /// Subtracts `damage` from a living proxy as one atomic step.
    ///
    /// Returns `(before, after)` health, or `None` if health was already at
    /// or below zero. Of any number of concurrent calls, exactly one sees
    /// `after <= 0.0`.
    fn apply_damage(&self, damage: f64) -> Option<(f64, f64)>;

    /// Whether `candidate` addresses this proxy.
    ///
    /// Proxies drawn as several client-side entities override this to
    /// accept any of their ids.
    fn is_proxy_for(&self, candidate: EntityId) -> bool {
        self.entity_id() == candidate
    }

    /// Current life state.
    fn state(&self) -> ProxyState {
        ProxyState::from_health(self.health())
    }
}

/// The owning manager's view of live proxies.
pub trait ProxyRegistry: Send + Sync {
    /// Snapshot of every live proxy, in no particular order.
    ///
    /// Must be callable from I/O threads.
    fn proxies(&self) -> Vec<Arc<dyn ProxyEntity>>;

    /// Removes the proxy with primary id `id`, returning whether it existed.
    ///
    /// Must be visible to the next [`proxies`](Self::proxies) call.
    fn remove(&self, id: EntityId) -> bool;

    /// First live proxy answering to `target`.
    ///
    /// Called for every interaction packet on I/O threads. The default scans
    /// a [`proxies`](Self::proxies) snapshot; registries that can search in
    /// place should override it.
    fn find(&self, target: EntityId) -> Option<Arc<dyn ProxyEntity>> {
        self.proxies().into_iter().find(|p| p.is_proxy_for(target))
    }
}

/// Delivers chat notifications to players.
pub trait Notifier: Send + Sync {
    /// Sends `message` to `player`.
    fn notify(&self, player: EntityId, message: &str);
}

/// Minimal proxy: one synthetic id, an owner, and health.
#[derive(Debug)]
pub struct BasicProxy {
    id: EntityId,
    owner: EntityId,
    /// `f64` bits.
    health: AtomicU64,
}

impl BasicProxy {
    /// Creates a proxy with an explicit id.
    #[must_use]
    pub fn new(id: EntityId, owner: EntityId, health: f64) -> Self {
        Self {
            id,
            owner,
            health: AtomicU64::new(health.to_bits()),
        }
    }

    /// Creates a proxy with an id from the global allocator.
    #[must_use]
    pub fn spawn(owner: EntityId, health: f64) -> Arc<Self> {
        Arc::new(Self::new(
            SyntheticIdAllocator::global().next_id(),
            owner,
            health,
        ))
    }

    /// Primary synthetic id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }
}

impl ProxyEntity for BasicProxy {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn health(&self) -> f64 {
        f64::from_bits(self.health.load(Ordering::Acquire))
    }

    fn set_health(&self, health: f64) {
        self.health.store(health.to_bits(), Ordering::Release);
    }

    fn apply_damage(&self, damage: f64) -> Option<(f64, f64)> {
        self.health
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let health = f64::from_bits(bits);
                (health > 0.0).then(|| (health - damage).to_bits())
            })
            .ok()
            .map(|bits| {
                let before = f64::from_bits(bits);
                (before, before - damage)
            })
    }
}

/// In-process proxy registry.
#[derive(Default)]
pub struct ProxyRoster {
    proxies: RwLock<Vec<Arc<dyn ProxyEntity>>>,
}

impl ProxyRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a proxy.
    pub fn add(&self, proxy: Arc<dyn ProxyEntity>) {
        self.proxies.write().push(proxy);
    }

    /// Number of live proxies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.read().len()
    }

    /// Returns true if no proxy is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.read().is_empty()
    }
}

impl ProxyRegistry for ProxyRoster {
    fn proxies(&self) -> Vec<Arc<dyn ProxyEntity>> {
        self.proxies.read().clone()
    }

    fn remove(&self, id: EntityId) -> bool {
        let mut proxies = self.proxies.write();
        let before = proxies.len();
        proxies.retain(|p| p.entity_id() != id);
        proxies.len() != before
    }

    fn find(&self, target: EntityId) -> Option<Arc<dyn ProxyEntity>> {
        self.proxies
            .read()
            .iter()
            .find(|p| p.is_proxy_for(target))
            .cloned()
    }
}

// ============================================================================
// MOCK IMPLEMENTATIONS (For Testing)
// ============================================================================

/// Notifier that records every message.
#[derive(Debug, Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<(EntityId, String)>>,
}

impl MockNotifier {
    /// Creates an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<(EntityId, String)> {
        self.sent.lock().clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, player: EntityId, message: &str) {
        self.sent.lock().push((player, message.to_string()));
    }
}
