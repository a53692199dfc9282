//! SimConfig - Seed Selection for Replayable Runs
//!
//! TigerStyle: A run's seed is either pinned through `DST_SEED` or drawn
//! fresh, and it is logged either way so a failing run can be replayed.

use rand::Rng;

/// Environment variable that pins the simulation seed.
pub const DST_SEED_ENV: &str = "DST_SEED";

/// Seed selection for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    seed: u64,
}

impl SimConfig {
    /// Create config with explicit seed.
    ///
    /// # Example
    /// ```
    /// use leibniz_core::dst::SimConfig;
    /// let config = SimConfig::with_seed(12345);
    /// assert_eq!(config.seed(), 12345);
    /// ```
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Create config from the process's `DST_SEED`, or a fresh random seed.
    #[must_use]
    pub fn from_env_or_random() -> Self {
        Self::from_seed_var(std::env::var(DST_SEED_ENV).ok().as_deref())
    }

    /// Create config from a raw `DST_SEED` value.
    ///
    /// `None` or an unparsable value yields a fresh random seed. The chosen
    /// seed is logged in every case.
    ///
    /// # Example
    /// ```
    /// use leibniz_core::dst::SimConfig;
    /// assert_eq!(SimConfig::from_seed_var(Some(" 42 ")).seed(), 42);
    /// ```
    #[must_use]
    pub fn from_seed_var(raw: Option<&str>) -> Self {
        let pinned = raw.and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                tracing::warn!(value = %raw, "DST_SEED is not a valid u64, using a random seed");
                None
            }
        });

        match pinned {
            Some(seed) => {
                tracing::info!(seed, "DST: using pinned seed");
                Self::with_seed(seed)
            }
            None => {
                let seed = rand::thread_rng().gen::<u64>();
                tracing::info!(seed, "DST: generated random seed (replay with DST_SEED={seed})");
                Self::with_seed(seed)
            }
        }
    }

    /// Get the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_env_or_random()
    }
}
