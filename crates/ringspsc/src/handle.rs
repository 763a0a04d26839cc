//! Producer and consumer handles.
//!
//! [`Ring::split`] moves the ring behind an [`Arc`] and returns exactly one
//! handle per role. Handles are [`Send`] but neither [`Sync`] nor [`Clone`],
//! so a second producer or consumer cannot be created in safe code.
//!
//! ```
//! use ringspsc_rs::{channel, Config};
//! use std::thread;
//!
//! let (mut producer, mut consumer) = channel::<u64>(Config::new(1024).unwrap());
//!
//! let handle = thread::spawn(move || {
//!     for i in 0..10_000 {
//!         while producer.try_push(i).is_err() {
//!             std::hint::spin_loop();
//!         }
//!     }
//! });
//!
//! let mut sum = 0;
//! for _ in 0..10_000 {
//!     loop {
//!         if let Some(v) = consumer.try_pop() {
//!             sum += v;
//!             break;
//!         }
//!         std::hint::spin_loop();
//!     }
//! }
//! handle.join().unwrap();
//! assert_eq!(sum, 10_000 * 9_999 / 2);
//! ```

use crate::trace::debug;
use crate::{Config, EmplaceError, PushError, ReuniteError, Ring};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{fence, Ordering};
use std::sync::Arc;

/// Marker type to opt-out of `Sync` while remaining `Send`.
type PhantomUnsync = PhantomData<Cell<&'static ()>>;

/// Write end of the ring.
///
/// `Producer` is [`Send`] but **not** [`Sync`]: it can move to the producer
/// thread, but `&Producer` cannot be shared.
pub struct Producer<T> {
    ring: Arc<Ring<T>>,
    _unsync: PhantomUnsync,
}

/// Read end of the ring.
///
/// Same thread-safety semantics as [`Producer`].
pub struct Consumer<T> {
    ring: Arc<Ring<T>>,
    _unsync: PhantomUnsync,
}

/// Creates a ring with the given configuration and splits it.
pub fn channel<T>(config: Config) -> (Producer<T>, Consumer<T>) {
    Ring::new(config).split()
}

pub(crate) fn split<T>(ring: Ring<T>) -> (Producer<T>, Consumer<T>) {
    let ring = Arc::new(ring);
    (
        Producer {
            ring: Arc::clone(&ring),
            _unsync: PhantomData,
        },
        Consumer {
            ring,
            _unsync: PhantomData,
        },
    )
}

/// Recovers exclusive ownership of the ring from its two handles.
///
/// Taking both handles by value is the quiescence proof: once the threads
/// that used them have been joined, no operation can be in flight. The
/// returned ring still holds any unconsumed elements; call
/// [`Ring::clear`] or drop it.
///
/// Handles of different rings are handed back in the error.
pub fn reunite<T>(
    producer: Producer<T>,
    consumer: Consumer<T>,
) -> Result<Ring<T>, ReuniteError<T>> {
    if !Arc::ptr_eq(&producer.ring, &consumer.ring) {
        return Err(ReuniteError { producer, consumer });
    }

    drop(producer);
    match Arc::into_inner(consumer.ring) {
        Some(ring) => {
            debug!(len = ring.len(), "ring reunited");
            Ok(ring)
        }
        // Handles are not Clone and split() creates exactly two references.
        None => unreachable!("ring shared beyond its producer and consumer"),
    }
}

impl<T> Producer<T> {
    /// Pushes `value`, or hands it back in [`PushError::Full`].
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), PushError<T>> {
        // SAFETY: this is the only producer handle and `&mut self` rules out
        // overlapping calls.
        unsafe { self.ring.try_push_unchecked(value) }
    }

    /// Pushes `value`, returning `false` (and dropping it) if the ring is full.
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        self.try_push(value).is_ok()
    }

    /// Pushes the element produced by `make`, which only runs if a slot is free.
    ///
    /// A constructor failure is reported as [`EmplaceError::Construct`] and
    /// leaves the ring exactly as it was.
    #[inline]
    pub fn try_push_with<E, F>(&mut self, make: F) -> Result<(), EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // SAFETY: as in try_push; `make` cannot reach this handle while it is
        // mutably borrowed, so it cannot push re-entrantly.
        unsafe { self.ring.try_push_with_unchecked(make) }
    }

    /// Returns the number of slots (a power of two).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns the number of live elements (racy snapshot).
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if the ring is empty (racy snapshot).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns true if the ring is full (racy snapshot).
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Returns true if the consumer has been dropped.
    #[inline]
    pub fn is_abandoned(&self) -> bool {
        let abandoned = Arc::strong_count(&self.ring) < 2;
        if abandoned {
            fence(Ordering::Acquire);
        }
        abandoned
    }
}

impl<T> Consumer<T> {
    /// Pops the oldest element, or returns `None` if the ring is empty.
    #[inline]
    pub fn try_pop(&mut self) -> Option<T> {
        // SAFETY: this is the only consumer handle and `&mut self` rules out
        // overlapping calls.
        unsafe { self.ring.try_pop_unchecked() }
    }

    /// Pops the oldest element into `out`, returning `false` if empty.
    #[inline]
    pub fn try_pop_into(&mut self, out: &mut T) -> bool {
        // SAFETY: see try_pop.
        unsafe { self.ring.try_pop_into_unchecked(out) }
    }

    /// Returns the number of slots (a power of two).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns the number of live elements (racy snapshot).
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if the ring is empty (racy snapshot).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns true if the ring is full (racy snapshot).
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Returns true if the producer has been dropped.
    ///
    /// Once this returns `true`, every element the producer pushed is
    /// visible to [`try_pop`](Self::try_pop).
    #[inline]
    pub fn is_abandoned(&self) -> bool {
        let abandoned = Arc::strong_count(&self.ring) < 2;
        if abandoned {
            // Pairs with the Release decrement in the producer's Arc drop.
            fence(Ordering::Acquire);
        }
        abandoned
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("ring", &self.ring).finish()
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("ring", &self.ring).finish()
    }
}
