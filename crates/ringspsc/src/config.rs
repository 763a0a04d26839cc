use crate::ConfigError;

/// Compile-time capacity check for [`Config::fixed`].
struct CapacityCheck<const N: usize>;

impl<const N: usize> CapacityCheck<N> {
    const OK: () = assert!(
        N >= 2 && N.is_power_of_two(),
        "ring capacity must be a power of two >= 2"
    );
}

/// Validated capacity for a [`Ring`](crate::Ring).
///
/// A `Config` can only be obtained through a constructor that enforces the
/// capacity policy (power of two, at least 2), so every ring built from one
/// can wrap its indices with `& mask` instead of a modulo.
///
/// The capacity counts slots. One slot is always kept free to tell a full
/// ring from an empty one, so a ring holds at most `capacity() - 1` elements.
///
/// ```
/// use ringspsc_rs::{Config, ConfigError};
///
/// assert_eq!(Config::new(1024).unwrap().capacity(), 1024);
/// assert_eq!(Config::new(3), Err(ConfigError::NotPowerOfTwo { capacity: 3 }));
/// assert_eq!(Config::new(1), Err(ConfigError::TooSmall { capacity: 1 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// Capacity as a power of 2 (capacity = 1 << ring_bits, ring_bits >= 1)
    ring_bits: u8,
}

impl Config {
    /// Creates a configuration for a ring with `capacity` slots.
    pub const fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity < 2 {
            return Err(ConfigError::TooSmall { capacity });
        }
        if !capacity.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { capacity });
        }
        Ok(Self {
            ring_bits: capacity.trailing_zeros() as u8,
        })
    }

    /// Creates a configuration for a ring with `1 << bits` slots.
    pub const fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        if bits == 0 {
            return Err(ConfigError::TooSmall { capacity: 1 });
        }
        if bits as u32 >= usize::BITS {
            return Err(ConfigError::TooLarge { bits });
        }
        Ok(Self { ring_bits: bits })
    }

    /// Creates a configuration whose capacity is checked at compile time.
    ///
    /// ```
    /// use ringspsc_rs::Config;
    ///
    /// const SMALL: Config = Config::fixed::<64>();
    /// assert_eq!(SMALL.capacity(), 64);
    /// ```
    ///
    /// A capacity that is not a power of two does not build:
    ///
    /// ```compile_fail
    /// let _ = ringspsc_rs::Config::fixed::<3>();
    /// ```
    ///
    /// Neither does a capacity below 2:
    ///
    /// ```compile_fail
    /// let _ = ringspsc_rs::Config::fixed::<1>();
    /// ```
    ///
    /// ```compile_fail
    /// let _ = ringspsc_rs::Config::fixed::<0>();
    /// ```
    pub const fn fixed<const N: usize>() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = CapacityCheck::<N>::OK;
        Self {
            ring_bits: N.trailing_zeros() as u8,
        }
    }

    /// Returns the number of slots in the ring.
    #[inline]
    pub const fn capacity(&self) -> usize {
        1 << self.ring_bits
    }

    /// Returns the mask for index wrapping.
    #[inline]
    pub const fn mask(&self) -> usize {
        self.capacity() - 1
    }

    /// Returns `log2(capacity)`.
    #[inline]
    pub const fn bits(&self) -> u8 {
        self.ring_bits
    }

    /// Returns the maximum number of elements the ring can hold at once.
    #[inline]
    pub const fn usable_capacity(&self) -> usize {
        self.capacity() - 1
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::fixed::<65536>() // 64K slots
    }
}

impl TryFrom<usize> for Config {
    type Error = ConfigError;

    fn try_from(capacity: usize) -> Result<Self, Self::Error> {
        Self::new(capacity)
    }
}

/// Low latency configuration (4K slots, fits in L1 cache for small `T`)
pub const LOW_LATENCY_CONFIG: Config = Config::fixed::<4096>();

/// High throughput configuration (256K slots)
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::fixed::<262_144>();
