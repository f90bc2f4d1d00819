//! # Servant Networking - The Proxy Interceptor
//!
//! Combat against servant proxies: stand-in entities that exist only as
//! packets on the wire, never in the host simulation.
//!
//! ## Architecture
//!
//! ```text
//! I/O THREAD                                   SIMULATION THREAD
//!   │                                                 │
//!   │ InteractEntity { target }                       │
//!   ▼                                                 │
//! PacketHandler ── scan ProxyRegistry ── hit? ──┐     │
//!   │                                           │     │
//!   │ mark handled (engine never sees it)       ▼     │
//!   │                              CombatQueue ─────► CombatResolver::drain
//!   │                                                 │  damage / death
//!   │                                                 │  remove + notify
//! ```
//!
//! Proxy ids come from [`SyntheticIdAllocator`], a lock-free counter that
//! walks down a reserved range the host never assigns to real entities.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use servant_core::EntityId;
//! use servant_networking::{
//!     BasicProxy, CombatQueue, InboundPacket, InteractEntity, PacketEvent, PacketHandler,
//!     ProxyRoster,
//! };
//!
//! let roster = Arc::new(ProxyRoster::new());
//! let proxy = BasicProxy::spawn(EntityId::new(1), 5.0);
//! roster.add(proxy.clone());
//!
//! let (queue, requests) = CombatQueue::unbounded();
//! let handler = PacketHandler::new(roster, queue);
//!
//! let mut event = PacketEvent::new(
//!     EntityId::new(2),
//!     InboundPacket::interact(InteractEntity::attack(proxy.id())),
//! );
//! assert!(handler.on_packet_receiving(&mut event));
//! assert!(event.is_handled());
//! assert_eq!(requests.len(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod allocator;
pub mod combat;
pub mod error;
pub mod interceptor;
pub mod protocol;
pub mod proxy;

// Re-exports for convenience
pub use allocator::{SyntheticIdAllocator, SYNTHETIC_ID_FLOOR, SYNTHETIC_ID_SEED};
pub use combat::{
    CombatDispatch, CombatOutcome, CombatQueue, CombatRequest, CombatResolver,
    ACTOR_DEFEAT_MESSAGE, OWNER_DEFEAT_MESSAGE, PROXY_HIT_DAMAGE,
};
pub use error::{NetworkError, NetworkResult};
pub use interceptor::{InterceptorStats, PacketHandler};
pub use protocol::{InboundPacket, InteractEntity, PacketEvent, PacketType};
pub use proxy::{
    BasicProxy, MockNotifier, Notifier, ProxyEntity, ProxyRegistry, ProxyRoster, ProxyState,
};

/// Capacity of the combat hand-off queue used by hosts that don't pick one.
pub const DEFAULT_COMBAT_QUEUE_CAPACITY: usize = 1024;
