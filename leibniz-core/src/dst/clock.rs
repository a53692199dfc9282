//! SimClock - Simulated Time
//!
//! TigerStyle: The TTL cache reads expiry against this clock when one is
//! injected, so tests step time forward instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::constants::{DST_TIME_ADVANCE_MS_MAX, TIME_MS_PER_SEC};

/// Millisecond clock that only moves when told to.
///
/// Clones share one time value, so a test can hold a handle while the cache
/// under test reads another.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    epoch_ms: Arc<AtomicU64>,
}

impl SimClock {
    /// Clock at the Unix epoch.
    ///
    /// # Example
    /// ```
    /// use leibniz_core::dst::SimClock;
    /// let clock = SimClock::new();
    /// assert_eq!(clock.now_ms(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::at_ms(0)
    }

    /// Clock at `start_ms` milliseconds past the epoch.
    #[must_use]
    pub fn at_ms(start_ms: u64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Milliseconds since the epoch.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }

    /// Whole seconds since the epoch.
    #[must_use]
    pub fn now_secs(&self) -> u64 {
        self.now_ms() / TIME_MS_PER_SEC
    }

    /// Current time as a UTC timestamp, saturating at chrono's range.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        let ms = i64::try_from(self.now_ms()).unwrap_or(i64::MAX);
        DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Step forward by `ms`, returning the new time.
    ///
    /// # Panics
    /// Panics if `ms` exceeds `DST_TIME_ADVANCE_MS_MAX` (one day). Longer
    /// jumps are made in several steps.
    pub fn advance_ms(&self, ms: u64) -> u64 {
        // Precondition
        assert!(
            ms <= DST_TIME_ADVANCE_MS_MAX,
            "advance_ms({ms}) exceeds max ({DST_TIME_ADVANCE_MS_MAX})"
        );

        let before = self.epoch_ms.fetch_add(ms, Ordering::SeqCst);
        before.saturating_add(ms)
    }

    /// Step forward by `secs`, returning the new time in milliseconds.
    ///
    /// # Panics
    /// Same bound as [`advance_ms`](Self::advance_ms).
    pub fn advance_secs(&self, secs: u64) -> u64 {
        self.advance_ms(secs.saturating_mul(TIME_MS_PER_SEC))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_epoch() {
        let clock = SimClock::new();
        assert_eq!(clock.now_ms(), 0);
        assert_eq!(clock.now().timestamp_millis(), 0);
    }

    #[test]
    fn test_advance() {
        let clock = SimClock::at_ms(500);
        assert_eq!(clock.advance_ms(1_000), 1_500);
        assert_eq!(clock.advance_secs(2), 3_500);
        assert_eq!(clock.now_secs(), 3);
        assert_eq!(clock.now().timestamp_millis(), 3_500);
    }

    #[test]
    fn test_one_day_steps_accumulate() {
        let clock = SimClock::new();
        for _ in 0..30 {
            clock.advance_secs(86_400);
        }
        assert_eq!(clock.now_secs(), 30 * 86_400);
    }

    #[test]
    #[should_panic(expected = "advance_ms")]
    fn test_advance_past_one_day_panics() {
        SimClock::new().advance_ms(DST_TIME_ADVANCE_MS_MAX + 1);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = SimClock::new();
        let handle = clock.clone();
        clock.advance_ms(1_000);
        assert_eq!(handle.now_ms(), 1_000);
    }
}
