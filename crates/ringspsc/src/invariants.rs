//! Debug assertion macros for ring buffer invariants.
//!
//! Only active in debug builds (`#[cfg(debug_assertions)]`), so there is
//! zero overhead in release builds.

// =============================================================================
// Index Range
// =============================================================================

/// Assert that a wrapped index addresses a slot of the ring.
///
/// **Invariant**: `head` and `tail` always lie in `[0, capacity)`
///
/// Used in: `slot()` before touching storage
macro_rules! debug_assert_index_in_bounds {
    ($idx:expr, $capacity:expr) => {
        debug_assert!(
            $idx < $capacity,
            "index {} outside ring of capacity {}",
            $idx,
            $capacity
        )
    };
}

// =============================================================================
// Live Range
// =============================================================================

/// Assert that a slot holds a constructed element.
///
/// **Invariant**: `buffer[pos]` is initialized ⟺ `pos ∈ [tail, head)` (mod capacity)
///
/// Used in: `try_pop_unchecked()` before moving out, `clear()` before dropping
macro_rules! debug_assert_live_slot {
    ($pos:expr, $tail:expr, $head:expr, $mask:expr) => {
        debug_assert!(
            ($pos.wrapping_sub($tail) & $mask) < ($head.wrapping_sub($tail) & $mask),
            "slot {} outside live range [{}, {})",
            $pos,
            $tail,
            $head
        )
    };
}

// =============================================================================
// Spare Slot
// =============================================================================

/// Assert that the ring never holds `capacity` elements.
///
/// **Invariant**: one slot stays free so that `head == tail` only means empty
///
/// Used in: `clear()` while walking the live range
macro_rules! debug_assert_spare_slot {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count < $capacity,
            "live count {} reached capacity {}; spare slot consumed",
            $count,
            $capacity
        )
    };
}

pub(crate) use debug_assert_index_in_bounds;
pub(crate) use debug_assert_live_slot;
pub(crate) use debug_assert_spare_slot;
