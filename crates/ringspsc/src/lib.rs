//! RingSPSC - Lock-Free Single-Producer Single-Consumer Ring Buffer
//!
//! A bounded circular queue that moves values of any type from exactly one
//! producing thread to exactly one consuming thread. Coordination uses two
//! atomic indices and acquire/release ordering only: no locks, no
//! compare-and-swap loops.
//!
//! # Key Features
//!
//! - `head` and `tail` padded onto separate cache lines (no false sharing)
//! - Power-of-two capacity, index wrap with a single bitwise AND
//! - One spare slot distinguishes full from empty, no shared counter
//! - Elements are constructed in a slot on push and moved out on pop;
//!   teardown drops whatever is still live
//! - Non-blocking `try_*` operations; retry policy belongs to the caller
//!
//! # Example
//!
//! ```
//! use ringspsc_rs::{Config, PushError, Ring};
//!
//! let (mut producer, mut consumer) = Ring::<u64>::new(Config::new(4).unwrap()).split();
//!
//! // Capacity 4 holds 3 elements
//! assert!(producer.try_push(1).is_ok());
//! assert!(producer.try_push(2).is_ok());
//! assert!(producer.try_push(3).is_ok());
//! assert_eq!(producer.try_push(4), Err(PushError::Full(4)));
//!
//! assert_eq!(consumer.try_pop(), Some(1));
//! assert!(producer.try_push(4).is_ok());
//! ```

mod config;
mod error;
mod handle;
mod invariants;
mod ring;
pub mod trace;

pub use config::{Config, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use error::{ConfigError, EmplaceError, PushError, ReuniteError};
pub use handle::{channel, reunite, Consumer, Producer};
pub use ring::Ring;
