//! # Entity Identifiers
//!
//! The host addresses every entity, real or synthetic, through one signed
//! 32-bit id space. The bridge never owns entity lifecycles; it only carries
//! the id around and compares it.

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Identifier of a host entity (player, mob, or servant proxy).
///
/// Layout-compatible with a little-endian `i32` on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct EntityId(i32);

impl EntityId {
    /// Wraps a raw host id.
    #[inline]
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw host id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for EntityId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
