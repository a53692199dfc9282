//! DeterministicRng - Seeded Random Number Generator
//!
//! TigerStyle: ChaCha20-based RNG. Every simulated value in Leibniz (seed
//! vectors, embeddings, synthetic papers) flows through this type so the same
//! seed always reproduces the same data.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Modulus applied to text hashes before they become seeds (2^32).
const TEXT_SEED_MODULUS: u64 = 1 << 32;

/// Derive a seed from text content alone.
///
/// The hash of `text` reduced modulo 2^32 is the only entropy source, so the
/// result is independent of call order and of any other RNG in the process.
///
/// # Example
/// ```
/// use leibniz_core::dst::text_seed;
/// assert_eq!(text_seed("sparse attention"), text_seed("sparse attention"));
/// assert!(text_seed("sparse attention") < (1 << 32));
/// ```
#[must_use]
pub fn text_seed(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish() % TEXT_SEED_MODULUS;

    // Postcondition
    debug_assert!(seed < TEXT_SEED_MODULUS, "seed must fit in 32 bits");
    seed
}

/// A deterministic random number generator.
///
/// TigerStyle:
/// - Same seed always produces same sequence
/// - Fork creates independent streams
/// - All randomness flows through this
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    rng: ChaCha20Rng,
    seed: u64,
    /// Counter for generating fork seeds
    fork_counter: u64,
}

impl DeterministicRng {
    /// Create a new RNG with the given seed.
    ///
    /// # Example
    /// ```
    /// use leibniz_core::dst::DeterministicRng;
    /// let mut rng = DeterministicRng::new(42);
    /// let value = rng.next_float();
    /// assert!((0.0..1.0).contains(&value));
    /// ```
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Create an RNG seeded only by the content of `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(text_seed(text))
    }

    /// Get the original seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random float in [0, 1).
    pub fn next_float(&mut self) -> f64 {
        let value = self.rng.gen::<f64>();

        // Postcondition
        assert!((0.0..1.0).contains(&value), "float must be in [0, 1)");
        value
    }

    /// Generate a random float in [min, max).
    ///
    /// # Panics
    /// Panics if min >= max.
    pub fn next_float_range(&mut self, min: f64, max: f64) -> f64 {
        // Precondition
        assert!(min < max, "min ({}) must be < max ({})", min, max);

        min + self.next_float() * (max - min)
    }

    /// Generate a random integer in [min, max] (inclusive).
    ///
    /// # Panics
    /// Panics if min > max.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        // Precondition
        assert!(min <= max, "min ({}) must be <= max ({})", min, max);

        self.rng.gen_range(min..=max)
    }

    /// Generate a random usize in [min, max] (inclusive).
    ///
    /// # Panics
    /// Panics if min > max.
    pub fn next_usize(&mut self, min: usize, max: usize) -> usize {
        // Precondition
        assert!(min <= max, "min ({}) must be <= max ({})", min, max);

        self.rng.gen_range(min..=max)
    }

    /// Choose a random element from a slice.
    ///
    /// # Panics
    /// Panics if the slice is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        // Precondition
        assert!(!items.is_empty(), "cannot choose from empty slice");

        let index = self.next_usize(0, items.len() - 1);
        &items[index]
    }

    /// Generate `len` floats uniformly distributed in [-1, 1).
    pub fn next_signed_floats(&mut self, len: usize) -> Vec<f32> {
        let values: Vec<f32> = (0..len)
            .map(|_| (self.next_float() * 2.0 - 1.0) as f32)
            .collect();

        // Postcondition
        debug_assert_eq!(values.len(), len, "must generate requested floats");
        values
    }

    /// Create an independent fork of this RNG.
    ///
    /// # Example
    /// ```
    /// use leibniz_core::dst::DeterministicRng;
    /// let mut rng = DeterministicRng::new(42);
    /// let fork1 = rng.fork();
    /// let fork2 = rng.fork();
    /// assert_ne!(fork1.seed(), fork2.seed());
    /// ```
    pub fn fork(&mut self) -> Self {
        // Golden ratio constant for good distribution
        let fork_seed = self.seed.wrapping_add(
            self.fork_counter
                .wrapping_add(1)
                .wrapping_mul(0x9E37_79B9_7F4A_7C15),
        );
        self.fork_counter += 1;

        Self::new(fork_seed)
    }
}
