//! # Servant Core
//!
//! Shared vocabulary for the servant bridge crates.
//!
//! ## Contents
//!
//! - [`EntityId`]: the host's signed 32-bit entity identifier. Real entities
//!   are numbered upward from zero by the server; servant proxies draw from a
//!   reserved synthetic range further up (see `servant_networking`).
//! - [`TickScheduler`]: one-shot deferred actions keyed by elapsed simulation
//!   ticks, never by wall-clock time.
//!
//! ## Example
//!
//! ```rust
//! use servant_core::{EntityId, TickScheduler};
//!
//! let mut scheduler = TickScheduler::new();
//! scheduler.schedule(2, EntityId::new(7));
//!
//! assert!(scheduler.advance().is_empty());
//! assert_eq!(scheduler.advance(), vec![EntityId::new(7)]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod entity;
pub mod schedule;

pub use entity::EntityId;
pub use schedule::{Tick, TickScheduler, Ticks};

/// Simulation ticks per second on the host (one "time unit" is one tick).
pub const TICKS_PER_SECOND: u64 = 20;
