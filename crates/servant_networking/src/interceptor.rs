//! # Interaction Interceptor
//!
//! Runs on the network I/O thread for every inbound packet and steals
//! attacks aimed at servant proxies before the host engine sees them.
//!
//! ## Flow
//!
//! ```text
//! packet ── type != InteractEntity ──────────────────────► pass through
//!   │
//!   ├─ payload too short ─────────────── debug log ──────► pass through
//!   │
//!   ├─ target matches no proxy ──────────────────────────► pass through
//!   │
//!   └─ first matching proxy ── dispatch ── set_handled ──► consumed
//! ```
//!
//! Only the target id is read; the rest of the payload is never decoded.
//! The handler itself never mutates proxy state, it only dispatches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use servant_core::EntityId;

use crate::allocator::SyntheticIdAllocator;
use crate::combat::CombatDispatch;
use crate::protocol::{InteractEntity, PacketEvent, PacketType};
use crate::proxy::ProxyRegistry;

/// Snapshot of interceptor counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterceptorStats {
    /// Packets inspected.
    pub packets_seen: u64,
    /// Interaction packets whose target was read.
    pub interactions: u64,
    /// Interactions that hit a proxy.
    pub proxy_hits: u64,
    /// Interaction payloads too short to read.
    pub malformed: u64,
    /// Hits the dispatcher refused.
    pub dispatch_failures: u64,
}

/// Live counters, bumped from the I/O thread.
#[derive(Debug, Default)]
struct Counters {
    packets_seen: AtomicU64,
    interactions: AtomicU64,
    proxy_hits: AtomicU64,
    malformed: AtomicU64,
    dispatch_failures: AtomicU64,
}

impl Counters {
    #[inline]
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> InterceptorStats {
        InterceptorStats {
            packets_seen: self.packets_seen.load(Ordering::Relaxed),
            interactions: self.interactions.load(Ordering::Relaxed),
            proxy_hits: self.proxy_hits.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
        }
    }
}

/// Inbound packet listener for proxy combat.
pub struct PacketHandler<D: CombatDispatch> {
    registry: Arc<dyn ProxyRegistry>,
    dispatch: D,
    counters: Counters,
}

impl<D: CombatDispatch> PacketHandler<D> {
    /// Creates a handler scanning `registry` and sending hits to `dispatch`.
    #[must_use]
    pub fn new(registry: Arc<dyn ProxyRegistry>, dispatch: D) -> Self {
        Self {
            registry,
            dispatch,
            counters: Counters::default(),
        }
    }

    /// Takes a fresh id for a new proxy from the process-wide allocator.
    #[must_use]
    pub fn next_entity_id() -> EntityId {
        SyntheticIdAllocator::global().next_id()
    }

    /// Inspects one inbound packet.
    ///
    /// Marks the event handled if it was an attack or use on a proxy.
    /// Always returns `true`: the listener stays registered.
    pub fn on_packet_receiving(&self, event: &mut PacketEvent) -> bool {
        Counters::bump(&self.counters.packets_seen);

        let packet = event.packet();
        if packet.packet_type != PacketType::InteractEntity {
            return true;
        }

        let target = match InteractEntity::read_target(&packet.payload) {
            Ok(target) => target,
            Err(e) => {
                Counters::bump(&self.counters.malformed);
                tracing::debug!("Ignoring interaction from {}: {e}", event.player());
                return true;
            }
        };
        Counters::bump(&self.counters.interactions);

        let Some(proxy) = self.registry.find(target) else {
            return true;
        };

        Counters::bump(&self.counters.proxy_hits);
        let actor = event.player();
        if let Err(e) = self.dispatch.dispatch(actor, proxy) {
            Counters::bump(&self.counters.dispatch_failures);
            tracing::warn!("Dropped hit by {actor} on servant {target}: {e}");
        }
        event.set_handled();
        true
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> InterceptorStats {
        self.counters.snapshot()
    }

    /// The combat dispatcher.
    #[inline]
    #[must_use]
    pub fn dispatch(&self) -> &D {
        &self.dispatch
    }
}
