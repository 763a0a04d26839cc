use crate::invariants::{
    debug_assert_index_in_bounds, debug_assert_live_slot, debug_assert_spare_slot,
};
use crate::trace::debug;
use crate::{Config, ConfigError, Consumer, EmplaceError, Producer, PushError};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// `head` and `tail` are wrapped indices in [0, capacity). One slot is always
// left free, so `head == tail` means empty and `(head + 1) & mask == tail`
// means full. No separate count is shared between the two threads.
//
// ## Memory Ordering Protocol
//
// **Producer (push):**
// 1. Load `head` with Relaxed (only the producer writes head)
// 2. Load `tail` with Acquire (pairs with the consumer's Release store of tail;
//    the slot the consumer just vacated is now free to overwrite)
// 3. Write the value into `buffer[head]`
// 4. Store `head + 1` with Release (publishes the constructed element)
//
// **Consumer (pop):**
// 1. Load `tail` with Relaxed (only the consumer writes tail)
// 2. Load `head` with Acquire (pairs with the producer's Release store of head;
//    the element in `buffer[tail]` is fully constructed)
// 3. Move the value out of `buffer[tail]`
// 4. Store `tail + 1` with Release (hands the slot back to the producer)
//
// These are the only two cross-thread synchronization points. Relaxing
// either Acquire load is a data race on the slot contents.
//
// ## Slot Ownership
//
// - Slots in [tail, head) hold live elements and belong to the consumer.
// - Slots in [head, tail - 1) are uninitialized and belong to the producer.
// - Ownership of `buffer[head]` moves to the consumer at the Release store of
//   head; ownership of `buffer[tail]` moves back at the Release store of tail.
//
// Liveness is never read from the slot memory itself, only from the indices.
//
// =============================================================================

/// SPSC ring buffer - the core building block.
///
/// A bounded single-producer single-consumer queue with lock-free,
/// non-blocking operations:
/// - `head` and `tail` on separate cache lines to prevent false sharing
/// - power-of-two capacity, indices wrap with a mask
/// - one spare slot distinguishes full from empty
///
/// Use [`Ring::split`] to obtain the safe [`Producer`] / [`Consumer`] pair.
/// The `*_unchecked` methods are the raw role operations; they are `unsafe`
/// because the ring cannot detect a second producer or consumer.
#[repr(C)]
pub struct Ring<T> {
    // === PRODUCER HOT ===
    /// Next slot the producer writes (written by producer, read by consumer)
    head: CachePadded<AtomicUsize>,

    // === CONSUMER HOT ===
    /// Next slot the consumer reads (written by consumer, read by producer)
    tail: CachePadded<AtomicUsize>,

    // === CONFIG ===
    config: Config,

    // === DATA BUFFER ===
    /// Fixed-size slot storage. A slot is initialized exactly while its index
    /// lies in [tail, head).
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// Safety: Ring is Send + Sync as long as T is Send.
// Values move between threads through the buffer; the index protocol above
// guarantees a slot is never accessed by both roles at once.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    /// Creates a new ring buffer with the given configuration.
    pub fn new(config: Config) -> Self {
        let capacity = config.capacity();

        let buffer: Box<[UnsafeCell<MaybeUninit<T>>]> = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();

        debug!(capacity, "ring allocated");

        Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            config,
            buffer,
        }
    }

    /// Creates a new ring buffer with `capacity` slots.
    ///
    /// Fails if `capacity` is below 2 or not a power of two.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Config::new(capacity).map(Self::new)
    }

    /// Splits the ring into its producer and consumer handles.
    pub fn split(self) -> (Producer<T>, Consumer<T>) {
        crate::handle::split(self)
    }

    // ---------------------------------------------------------------------
    // CONSTANTS & STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of slots (a power of two).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Returns the maximum number of elements held at once (`capacity - 1`).
    #[inline]
    pub fn usable_capacity(&self) -> usize {
        self.config.usable_capacity()
    }

    /// Returns the configuration the ring was built with.
    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }

    #[inline]
    fn mask(&self) -> usize {
        self.config.mask()
    }

    /// Returns the number of live elements.
    ///
    /// Racy snapshot when called while the other role is active.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) & self.mask()
    }

    /// Returns true if the ring is empty.
    ///
    /// Racy snapshot when called while the other role is active; use it for
    /// diagnostics, never to decide whether a pop will succeed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Acquire) == self.head.load(Ordering::Acquire)
    }

    /// Returns true if the ring is full.
    ///
    /// Racy snapshot when called while the other role is active; use it for
    /// diagnostics, never to decide whether a push will succeed.
    #[inline]
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let next = (head + 1) & self.mask();
        next == self.tail.load(Ordering::Acquire)
    }

    /// Pointer to the storage of slot `idx`.
    #[inline]
    fn slot(&self, idx: usize) -> *mut T {
        debug_assert_index_in_bounds!(idx, self.capacity());
        self.buffer[idx].get().cast::<T>()
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Pushes `value`, or hands it back if the ring is full.
    ///
    /// # Safety
    ///
    /// Only one thread may act as producer, and producer calls must not
    /// overlap (no concurrent or re-entrant `*_push*` calls).
    #[inline]
    pub unsafe fn try_push_unchecked(&self, value: T) -> Result<(), PushError<T>> {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & self.mask();

        if next == self.tail.load(Ordering::Acquire) {
            return Err(PushError::Full(value));
        }

        // SAFETY: `head` is outside [tail, head), so the slot is uninitialized
        // and owned by the producer until the Release store below.
        unsafe {
            ptr::write(self.slot(head), value);
        }

        self.head.store(next, Ordering::Release);
        Ok(())
    }

    /// Constructs an element with `make` directly before publishing it.
    ///
    /// `make` only runs when a slot is free. If it returns `Err` (or panics),
    /// `head` is not advanced and the slot stays unconstructed.
    ///
    /// # Safety
    ///
    /// Same contract as [`try_push_unchecked`](Self::try_push_unchecked).
    /// Additionally `make` must not push into this ring.
    #[inline]
    pub unsafe fn try_push_with_unchecked<E, F>(&self, make: F) -> Result<(), EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & self.mask();

        if next == self.tail.load(Ordering::Acquire) {
            return Err(EmplaceError::Full);
        }

        let value = make().map_err(EmplaceError::Construct)?;

        // SAFETY: as in try_push_unchecked; `make` did not touch this ring.
        unsafe {
            ptr::write(self.slot(head), value);
        }

        self.head.store(next, Ordering::Release);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Pops the oldest element, or returns `None` if the ring is empty.
    ///
    /// # Safety
    ///
    /// Only one thread may act as consumer, and consumer calls must not
    /// overlap.
    #[inline]
    pub unsafe fn try_pop_unchecked(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        debug_assert_live_slot!(tail, tail, head, self.mask());

        // SAFETY: `tail` is inside [tail, head): the producer constructed it
        // before its Release store of head, which our Acquire load observed.
        // Reading moves the value out; the slot is uninitialized afterwards
        // and is never dropped again.
        let value = unsafe { ptr::read(self.slot(tail)) };

        self.tail.store((tail + 1) & self.mask(), Ordering::Release);
        Some(value)
    }

    /// Pops the oldest element into `out`. Returns `false` if empty.
    ///
    /// The previous value of `*out` is dropped when an element is delivered.
    ///
    /// # Safety
    ///
    /// Same contract as [`try_pop_unchecked`](Self::try_pop_unchecked).
    #[inline]
    pub unsafe fn try_pop_into_unchecked(&self, out: &mut T) -> bool {
        match unsafe { self.try_pop_unchecked() } {
            Some(value) => {
                *out = value;
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // SINGLE-OWNER API
    // ---------------------------------------------------------------------
    //
    // `&mut self` proves neither role is active, so these are safe.

    /// Pushes `value` with exclusive access.
    pub fn push_mut(&mut self, value: T) -> Result<(), PushError<T>> {
        // SAFETY: `&mut self` excludes every other producer and consumer.
        unsafe { self.try_push_unchecked(value) }
    }

    /// Pops the oldest element with exclusive access.
    pub fn pop_mut(&mut self) -> Option<T> {
        // SAFETY: `&mut self` excludes every other producer and consumer.
        unsafe { self.try_pop_unchecked() }
    }

    // ---------------------------------------------------------------------
    // LIFECYCLE
    // ---------------------------------------------------------------------

    /// Destroys every live element, leaving the ring empty and reusable.
    ///
    /// Returns how many elements were destroyed. Requires exclusive access,
    /// i.e. both roles have stopped.
    pub fn clear(&mut self) -> usize {
        let mask = self.mask();
        let capacity = self.capacity();
        let head = *self.head.get_mut();
        let start = *self.tail.get_mut();
        let mut tail = start;
        let mut dropped = 0;

        while tail != head {
            debug_assert_live_slot!(tail, start, head, mask);
            debug_assert_spare_slot!(dropped + 1, capacity);

            let slot = tail;
            tail = (tail + 1) & mask;
            // Advance first so a panicking destructor cannot cause a double drop.
            *self.tail.get_mut() = tail;

            // SAFETY: `slot` was in [tail, head) and is dropped exactly once;
            // it left the live range before the destructor runs.
            unsafe {
                ptr::drop_in_place(self.buffer[slot].get_mut().as_mut_ptr());
            }
            dropped += 1;
        }

        if dropped > 0 {
            debug!(dropped, capacity, "ring cleared");
        }
        dropped
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        // Drop all live items in the ring
        self.clear();
    }
}

impl<T> fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &self.capacity())
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring<T>(capacity: usize) -> Ring<T> {
        Ring::with_capacity(capacity).unwrap()
    }

    #[test]
    fn test_ring_new_is_empty() {
        let ring = ring::<u64>(8);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 8);
        assert_eq!(ring.usable_capacity(), 7);
    }

    #[test]
    fn test_ring_rejects_bad_capacity() {
        for capacity in [0, 1, 3, 6, 100] {
            assert!(Ring::<u64>::with_capacity(capacity).is_err(), "capacity {}", capacity);
        }
    }

    #[test]
    fn test_ring_full_boundary() {
        let mut ring = ring::<u64>(8);

        for i in 0..7 {
            assert!(ring.push_mut(i).is_ok(), "push {} should fit", i);
        }
        assert!(ring.is_full());
        assert_eq!(ring.len(), 7);
        assert_eq!(ring.push_mut(7).unwrap_err().into_inner(), 7);

        // One pop frees exactly one slot
        assert_eq!(ring.pop_mut(), Some(0));
        assert!(ring.push_mut(7).is_ok());
        assert!(ring.push_mut(8).is_err());
    }

    #[test]
    fn test_ring_smallest_capacity() {
        let mut ring = ring::<u32>(2);

        assert!(ring.push_mut(1).is_ok());
        assert!(ring.push_mut(2).is_err());
        assert_eq!(ring.pop_mut(), Some(1));
        assert_eq!(ring.pop_mut(), None);
        assert!(ring.push_mut(3).is_ok());
        assert_eq!(ring.pop_mut(), Some(3));
    }

    #[test]
    fn test_ring_wraps_in_fifo_order() {
        let mut ring = ring::<u64>(4);
        let mut expected = 0;

        // Many laps around a 4-slot ring
        for i in 0..100u64 {
            assert!(ring.push_mut(i).is_ok());
            if i % 3 == 2 {
                while let Some(v) = ring.pop_mut() {
                    assert_eq!(v, expected);
                    expected += 1;
                }
            }
        }
        while let Some(v) = ring.pop_mut() {
            assert_eq!(v, expected);
            expected += 1;
        }
        assert_eq!(expected, 100);
    }

    #[test]
    fn test_ring_pop_into() {
        let ring = ring::<String>(4);
        let mut out = String::from("stale");

        unsafe {
            assert!(!ring.try_pop_into_unchecked(&mut out));
            assert_eq!(out, "stale");

            ring.try_push_unchecked(String::from("fresh")).unwrap();
            assert!(ring.try_pop_into_unchecked(&mut out));
        }
        assert_eq!(out, "fresh");
        assert!(ring.is_empty());
    }

    #[test]
    fn test_push_with_constructor_error_leaves_ring_untouched() {
        let ring = ring::<u64>(4);

        unsafe {
            ring.try_push_unchecked(1).unwrap();

            let err = ring
                .try_push_with_unchecked(|| Err::<u64, _>("parse failure"))
                .unwrap_err();
            assert_eq!(err, EmplaceError::Construct("parse failure"));
            assert_eq!(ring.len(), 1);

            ring.try_push_with_unchecked(|| Ok::<_, ()>(2)).unwrap();
            assert_eq!(ring.try_pop_unchecked(), Some(1));
            assert_eq!(ring.try_pop_unchecked(), Some(2));
            assert_eq!(ring.try_pop_unchecked(), None);
        }
    }

    #[test]
    fn test_push_with_full_skips_constructor() {
        let ring = ring::<u64>(2);
        let mut called = false;

        unsafe {
            ring.try_push_unchecked(1).unwrap();
            let err = ring
                .try_push_with_unchecked(|| {
                    called = true;
                    Ok::<_, ()>(2)
                })
                .unwrap_err();
            assert!(err.is_recoverable());
        }
        assert!(!called);
    }

    #[test]
    fn test_push_with_panicking_constructor() {
        let ring = ring::<String>(4);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe {
            let _ = ring.try_push_with_unchecked(|| -> Result<String, ()> {
                panic!("constructor blew up")
            });
        }));
        assert!(result.is_err());
        assert!(ring.is_empty());

        unsafe {
            ring.try_push_unchecked(String::from("after")).unwrap();
            assert_eq!(ring.try_pop_unchecked().as_deref(), Some("after"));
        }
    }

    #[test]
    fn test_head_and_tail_on_separate_cache_lines() {
        let ring = ring::<u8>(2);
        let head = ptr::addr_of!(ring.head) as usize;
        let tail = ptr::addr_of!(ring.tail) as usize;
        assert!(
            head.abs_diff(tail) >= 64,
            "head/tail only {} bytes apart",
            head.abs_diff(tail)
        );
        assert!(std::mem::align_of::<CachePadded<AtomicUsize>>() >= 64);
    }

    #[test]
    fn test_clear_returns_count_and_resets() {
        let mut ring = ring::<String>(8);
        for i in 0..5 {
            ring.push_mut(format!("item_{}", i)).unwrap();
        }
        assert_eq!(ring.pop_mut().as_deref(), Some("item_0"));

        assert_eq!(ring.clear(), 4);
        assert!(ring.is_empty());
        assert_eq!(ring.clear(), 0);

        ring.push_mut(String::from("reused")).unwrap();
        assert_eq!(ring.pop_mut().as_deref(), Some("reused"));
    }

    #[test]
    fn test_drop_unconsumed_items() {
        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        struct DropTracker(#[allow(dead_code)] u64);

        impl Drop for DropTracker {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        {
            let mut ring = ring::<DropTracker>(16);

            // Write 5 items
            for i in 0..5 {
                assert!(ring.push_mut(DropTracker(i)).is_ok());
            }

            // Consume only 2
            drop(ring.pop_mut());
            drop(ring.pop_mut());
            assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 2);

            // Ring drops with 3 unconsumed items
        }

        // All 5 should be dropped now
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_drop_across_wrap_point() {
        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        struct DropTracker;

        impl Drop for DropTracker {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        {
            let mut ring = ring::<DropTracker>(4);
            // Move tail to slot 3 so the live range wraps
            for _ in 0..3 {
                assert!(ring.push_mut(DropTracker).is_ok());
                drop(ring.pop_mut());
            }
            assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 3);

            for _ in 0..3 {
                assert!(ring.push_mut(DropTracker).is_ok());
            }
            assert!(ring.is_full());
        }

        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_debug_output() {
        let ring = ring::<u8>(4);
        let text = format!("{:?}", ring);
        assert!(text.starts_with("Ring"));
        assert!(text.contains("capacity: 4"));
    }
}
