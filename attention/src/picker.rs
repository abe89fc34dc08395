//! Random payload selection for producers and the driver

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::DurationRange;

/// Picks subjects and durations for events
///
/// Each task owns its own picker so no RNG is shared across tasks.
#[derive(Debug)]
pub struct Picker {
    rng: StdRng,
}

impl Picker {
    /// Create a picker, seeded when `seed` is given and from the OS otherwise
    pub fn new(seed: Option<u64>) -> Self {
        debug!(?seed, "Picker::new: called");
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Derive a picker for a named task so that seeded runs give each task its own stream
    pub fn for_task(seed: Option<u64>, salt: u64) -> Self {
        Self::new(seed.map(|s| s.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(salt)))
    }

    /// Pick one subject from the pool
    ///
    /// Returns an empty string for an empty pool; `Config::validate` rules that out.
    pub fn subject(&mut self, pool: &[String]) -> String {
        pool.choose(&mut self.rng).cloned().unwrap_or_default()
    }

    /// Pick a duration in `[min, max)`
    pub fn duration(&mut self, range: DurationRange) -> Duration {
        if range.max <= range.min {
            return range.min_duration();
        }
        Duration::from_millis(self.rng.random_range(range.min..range.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seeded_pickers_repeat() {
        let pool: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let mut first = Picker::new(Some(42));
        let mut second = Picker::new(Some(42));
        for _ in 0..16 {
            assert_eq!(first.subject(&pool), second.subject(&pool));
        }
    }

    #[test]
    fn test_fixed_range_is_exact() {
        let mut picker = Picker::new(Some(1));
        assert_eq!(picker.duration(DurationRange::fixed(30)), Duration::from_millis(30));
    }

    #[test]
    fn test_empty_pool() {
        let mut picker = Picker::new(Some(1));
        assert_eq!(picker.subject(&[]), "");
    }

    proptest! {
        #[test]
        fn prop_duration_within_half_open_range(seed in any::<u64>(), min in 0u64..10_000, span in 1u64..10_000) {
            let mut picker = Picker::new(Some(seed));
            let range = DurationRange::new(min, min + span);
            let picked = picker.duration(range);
            prop_assert!(picked >= range.min_duration());
            prop_assert!(picked < Duration::from_millis(range.max));
        }

        #[test]
        fn prop_subject_comes_from_pool(seed in any::<u64>(), pool in proptest::collection::vec("[a-z]{1,8}", 1..8)) {
            let mut picker = Picker::new(Some(seed));
            let picked = picker.subject(&pool);
            prop_assert!(pool.contains(&picked));
        }
    }
}
