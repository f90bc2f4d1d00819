//! # Proxy Combat Resolution
//!
//! What happens when a player hits a servant proxy.
//!
//! ## States
//!
//! - **Alive**: health above zero. A hit subtracts [`PROXY_HIT_DAMAGE`].
//! - **Dead**: health at or below zero. The proxy is removed from its
//!   registry, and owner and attacker are told. Terminal: later hits on the
//!   same proxy do nothing, so removal happens exactly once, even when hits
//!   race in from several I/O threads.
//!
//! Owners cannot damage their own servants.
//!
//! ## Dispatch
//!
//! The interceptor hands hits to a [`CombatDispatch`]. [`CombatResolver`]
//! resolves inline; [`CombatQueue`] ships the hit over a channel so the
//! simulation thread can resolve it with [`CombatResolver::drain`].

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use servant_core::EntityId;

use crate::error::{NetworkError, NetworkResult};
use crate::proxy::{Notifier, ProxyEntity, ProxyRegistry};

/// Damage dealt by one hit on a proxy.
pub const PROXY_HIT_DAMAGE: f64 = 1.0;

/// Sent to the owner when their servant dies.
pub const OWNER_DEFEAT_MESSAGE: &str = "Your servant was defeated!";

/// Sent to the player who landed the killing hit.
pub const ACTOR_DEFEAT_MESSAGE: &str = "You defeated a servant!";

/// Result of one hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CombatOutcome {
    /// Owner hit their own servant; nothing happened.
    SelfHit,
    /// The proxy was already dead; nothing happened.
    AlreadyDefeated,
    /// The proxy took damage and survived.
    Damaged {
        /// Health left.
        remaining: f64,
    },
    /// The proxy died and was removed.
    Defeated,
}

/// Resolves hits against proxies.
pub struct CombatResolver {
    registry: Arc<dyn ProxyRegistry>,
    notifier: Arc<dyn Notifier>,
    damage: f64,
}

impl CombatResolver {
    /// Creates a resolver dealing [`PROXY_HIT_DAMAGE`] per hit.
    #[must_use]
    pub fn new(registry: Arc<dyn ProxyRegistry>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            registry,
            notifier,
            damage: PROXY_HIT_DAMAGE,
        }
    }

    /// Sets the damage per hit.
    #[must_use]
    pub fn with_damage(mut self, damage: f64) -> Self {
        self.damage = damage;
        self
    }

    /// Applies one hit by `actor` on `proxy`.
    ///
    /// Safe to call from several threads at once: the damage step is atomic
    /// on the proxy, so only one caller ever sees the killing blow.
    pub fn resolve(&self, actor: EntityId, proxy: &dyn ProxyEntity) -> CombatOutcome {
        let owner = proxy.owner();
        if actor == owner {
            return CombatOutcome::SelfHit;
        }

        let Some((_, remaining)) = proxy.apply_damage(self.damage) else {
            return CombatOutcome::AlreadyDefeated;
        };
        if remaining > 0.0 {
            return CombatOutcome::Damaged { remaining };
        }

        let id = proxy.entity_id();
        if !self.registry.remove(id) {
            tracing::debug!("Servant {id} was already gone from its registry");
        }
        self.notifier.notify(owner, OWNER_DEFEAT_MESSAGE);
        self.notifier.notify(actor, ACTOR_DEFEAT_MESSAGE);
        tracing::info!("Servant {id} of {owner} defeated by {actor}");
        CombatOutcome::Defeated
    }

    /// Resolves every queued hit, in arrival order.
    pub fn drain(&self, requests: &Receiver<CombatRequest>) -> Vec<CombatOutcome> {
        requests
            .try_iter()
            .map(|request| self.resolve(request.actor, request.proxy.as_ref()))
            .collect()
    }
}

/// Where the interceptor sends a detected hit.
pub trait CombatDispatch: Send + Sync {
    /// Handles a hit by `actor` on `proxy`.
    ///
    /// # Errors
    ///
    /// Returns an error if the hit could not be delivered.
    fn dispatch(&self, actor: EntityId, proxy: Arc<dyn ProxyEntity>) -> NetworkResult<()>;
}

impl CombatDispatch for CombatResolver {
    fn dispatch(&self, actor: EntityId, proxy: Arc<dyn ProxyEntity>) -> NetworkResult<()> {
        self.resolve(actor, proxy.as_ref());
        Ok(())
    }
}

/// A hit waiting for the simulation thread.
#[derive(Clone)]
pub struct CombatRequest {
    /// Player who hit.
    pub actor: EntityId,
    /// Proxy that was hit.
    pub proxy: Arc<dyn ProxyEntity>,
}

impl fmt::Debug for CombatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatRequest")
            .field("actor", &self.actor)
            .field("proxy", &self.proxy.entity_id())
            .finish()
    }
}

/// Sending half of the I/O -> simulation hand-off.
#[derive(Clone, Debug)]
pub struct CombatQueue {
    sender: Sender<CombatRequest>,
}

impl CombatQueue {
    /// Creates a queue holding at most `capacity` pending hits.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<CombatRequest>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, receiver)
    }

    /// Creates a queue with no capacity limit.
    #[must_use]
    pub fn unbounded() -> (Self, Receiver<CombatRequest>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl CombatDispatch for CombatQueue {
    fn dispatch(&self, actor: EntityId, proxy: Arc<dyn ProxyEntity>) -> NetworkResult<()> {
        self.sender
            .try_send(CombatRequest { actor, proxy })
            .map_err(|e| match e {
                TrySendError::Full(_) => NetworkError::QueueFull,
                TrySendError::Disconnected(_) => NetworkError::QueueDisconnected,
            })
    }
}
