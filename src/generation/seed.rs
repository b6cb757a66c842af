//! # Seed Utilities
//!
//! Turns the persisted seed string into reproducible numeric quantities.
//!
//! Two families of randomness feed generation: hash-derived *counts*
//! (how many zones, shops, roaming characters) which must reproduce exactly
//! from the same seed, and free-running draws (placement jitter, terrain
//! shapes) which use an ordinary [`rand::rngs::StdRng`] passed by the
//! caller. Only the counts are seed-deterministic; regenerating from the
//! same seed yields the same feature counts but not the same shapes. That
//! split is long-standing observed behavior and is kept as-is.

use crate::{VeldtError, VeldtResult};
use serde::{Deserialize, Serialize};

/// A validated hex seed string, e.g. an MD5 digest captured at
/// game-creation time.
///
/// # Examples
///
/// ```
/// use veldt::WorldSeed;
///
/// let seed = WorldSeed::new("d41d8cd98f00b204e9800998ecf8427e").unwrap();
/// assert_eq!(seed.count_at(0, 4), seed.count_at(0, 4));
/// assert!(WorldSeed::new("not hex!").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSeed {
    hex: String,
}

impl WorldSeed {
    /// Wraps and validates a seed string. The string must be non-empty and
    /// consist solely of hex digits; anything else is a fatal generation
    /// precondition.
    pub fn new(seed: impl Into<String>) -> VeldtResult<Self> {
        let hex: String = seed.into().to_lowercase();
        if hex.is_empty() {
            return Err(VeldtError::InvalidSeed("empty seed string".to_string()));
        }
        if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(VeldtError::InvalidSeed(format!(
                "non-hex character {:?} in seed",
                bad
            )));
        }
        Ok(Self { hex })
    }

    /// The normalized seed string.
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Sums the numeric values of `len` hex digits starting at `offset`.
    ///
    /// Indices wrap modulo the seed length, so substrings longer than the
    /// seed extend around rather than failing.
    pub fn count_at(&self, offset: usize, len: usize) -> u32 {
        let digits: Vec<u32> = self
            .hex
            .chars()
            .map(|c| c.to_digit(16).unwrap_or(0))
            .collect();
        (0..len)
            .map(|i| digits[(offset + i) % digits.len()])
            .sum()
    }

    /// A hash-derived count clamped into `[min, max]` (inclusive).
    pub fn bounded_count(&self, offset: usize, len: usize, min: u32, max: u32) -> u32 {
        debug_assert!(min <= max);
        min + self.count_at(offset, len) % (max - min + 1)
    }

    /// Folds the seed into a `u64` suitable for seeding a free-running RNG
    /// when a caller wants repeatable shapes (tests do; the game does not).
    pub fn rng_seed(&self) -> u64 {
        self.hex
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
                (acc ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
            })
    }
}
