//! # Attribute Provider Contract
//!
//! The capability every stat backend integration exposes to the game.
//!
//! ```text
//! Game code ──► ProviderRegistry::active() ──► dyn AttributeProvider
//!                                                 │
//!                              ┌──────────────────┴─────────────┐
//!                              ▼                                ▼
//!                    AttributePlusProvider              (other backends)
//! ```
//!
//! Every method is total: a missing mapping or a failing backend is absorbed
//! by the implementation, never returned to the caller.

use servant_core::{EntityId, Ticks};

/// A pluggable source of numeric entity attributes.
pub trait AttributeProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Selection priority; higher wins when several providers are available.
    fn priority(&self) -> i32;

    /// Whether the backing system is present right now.
    ///
    /// Implementations must re-check on every call rather than cache.
    fn is_available(&self) -> bool;

    /// Reads the current value of `key` for `entity`, or `0.0` if unknown.
    fn get_value(&self, entity: EntityId, key: &str) -> f64;

    /// Writes `value` for `key` on `entity`.
    fn set_value(&self, entity: EntityId, key: &str, value: f64);

    /// Applies `value` to `key` on `entity` for `duration` ticks.
    fn add_temporary_modifier(&self, entity: EntityId, key: &str, value: f64, duration: Ticks);
}
