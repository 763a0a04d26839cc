//! Error types for ring construction and the producer/consumer operations.

use crate::{Consumer, Producer};
use std::fmt;
use thiserror::Error;

/// Capacity policy violation, reported before any ring exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Fewer than two slots: no room for an element next to the spare slot.
    #[error("ring capacity must be at least 2 (got {capacity})")]
    TooSmall {
        /// The rejected capacity.
        capacity: usize,
    },
    /// Capacity is not a power of two, so indices cannot wrap with a mask.
    #[error("ring capacity must be a power of two (got {capacity})")]
    NotPowerOfTwo {
        /// The rejected capacity.
        capacity: usize,
    },
    /// `1 << bits` does not fit in `usize`.
    #[error("ring capacity 2^{bits} does not fit in usize")]
    TooLarge {
        /// The rejected exponent.
        bits: u8,
    },
}

/// The ring was full; the rejected value is handed back.
#[derive(Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError<T> {
    /// No free slot. Contains the value that could not be pushed.
    #[error("ring buffer is full")]
    Full(T),
}

impl<T> PushError<T> {
    /// Returns the value that could not be pushed.
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) => value,
        }
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
        }
    }
}

/// Failure of [`Producer::try_push_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmplaceError<E> {
    /// No free slot. The constructor was not invoked.
    #[error("ring buffer is full")]
    Full,
    /// The constructor failed. Nothing was added to the ring.
    #[error("element construction failed: {0}")]
    Construct(E),
}

impl<E> EmplaceError<E> {
    /// Returns `true` if the push can succeed later once the consumer frees a slot.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Returns the constructor's error, if that is what failed.
    #[inline]
    pub fn into_construct_error(self) -> Option<E> {
        match self {
            Self::Full => None,
            Self::Construct(e) => Some(e),
        }
    }
}

/// [`reunite`](crate::reunite) was given handles of two different rings.
///
/// Both handles are returned untouched.
#[derive(Error)]
#[error("producer and consumer belong to different rings")]
pub struct ReuniteError<T> {
    /// The producer that was passed in.
    pub producer: Producer<T>,
    /// The consumer that was passed in.
    pub consumer: Consumer<T>,
}

impl<T> fmt::Debug for ReuniteError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReuniteError")
            .field("producer", &self.producer)
            .field("consumer", &self.consumer)
            .finish()
    }
}
