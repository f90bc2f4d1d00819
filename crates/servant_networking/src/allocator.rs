//! # Synthetic Entity Id Allocation
//!
//! Servant proxies need entity ids the host will never hand to a real
//! entity. Real ids are assigned upward from zero; proxy ids are taken
//! downward from the middle of the `i32` range:
//!
//! ```text
//! 0 ──── real ids ───► ... FLOOR ◄── synthetic ids ── SEED ... i32::MAX
//!                          MAX/4                      MAX/2
//! ```
//!
//! Ids are never reused or freed. Running past the floor is not handled
//! beyond a one-time error log; at expected proxy counts a process never
//! gets there.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use servant_core::EntityId;

/// First value of the counter; ids handed out are strictly below it.
pub const SYNTHETIC_ID_SEED: i32 = i32::MAX / 2;

/// Lowest id inside the reserved range.
pub const SYNTHETIC_ID_FLOOR: i32 = i32::MAX / 4;

static GLOBAL: SyntheticIdAllocator = SyntheticIdAllocator::new();

/// Lock-free, monotonically decreasing id source.
#[derive(Debug)]
pub struct SyntheticIdAllocator {
    counter: AtomicI32,
    exhausted: AtomicBool,
}

impl SyntheticIdAllocator {
    /// Creates an allocator seeded at [`SYNTHETIC_ID_SEED`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicI32::new(SYNTHETIC_ID_SEED),
            exhausted: AtomicBool::new(false),
        }
    }

    /// The process-wide allocator.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Takes the next id.
    ///
    /// Safe to call from any thread; a single atomic decrement.
    pub fn next_id(&self) -> EntityId {
        let id = self.counter.fetch_sub(1, Ordering::Relaxed).wrapping_sub(1);
        if id < SYNTHETIC_ID_FLOOR && !self.exhausted.swap(true, Ordering::Relaxed) {
            tracing::error!("Synthetic entity id range exhausted, ids now overlap real entities");
        }
        EntityId::new(id)
    }

    /// Ids left before the floor is crossed.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        let current = self.counter.load(Ordering::Relaxed);
        u32::try_from(current.saturating_sub(SYNTHETIC_ID_FLOOR)).unwrap_or(0)
    }

    /// Whether `id` lies in the reserved synthetic range.
    #[inline]
    #[must_use]
    pub const fn is_synthetic(id: EntityId) -> bool {
        id.raw() >= SYNTHETIC_ID_FLOOR && id.raw() < SYNTHETIC_ID_SEED
    }
}

impl Default for SyntheticIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
