use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Exp1;

use crate::pool::SpeedClass;

const MIN_DURATION: Duration = Duration::from_nanos(1);

/// Whole milliseconds, rounded up so that any nonzero duration reports at
/// least 1. Saturates at `u64::MAX`.
pub fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

/// Draws simulated cleaning times.
///
/// A slow team needs `base` on average, mid teams `base / 2` and fast teams
/// `base / 4`. Individual durations are exponentially distributed around that
/// mean (rate `1 / mean`).
#[derive(Debug, Clone)]
pub struct CleaningTimer {
    base: Duration,
    rng: ChaCha8Rng,
}

impl CleaningTimer {
    /// Timer seeded from OS entropy.
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Deterministic timer for tests and reproducible runs.
    pub fn with_seed(base: Duration, seed: u64) -> Self {
        Self {
            base,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Expected cleaning time for a team of the given speed.
    pub fn mean(&self, speed: SpeedClass) -> Duration {
        self.base / speed.divisor()
    }

    /// Never returns a zero duration.
    pub fn sample(&mut self, speed: SpeedClass) -> Duration {
        let scale: f64 = self.rng.sample(Exp1);
        let secs = self.mean(speed).as_secs_f64() * scale;
        Duration::try_from_secs_f64(secs)
            .unwrap_or(Duration::MAX)
            .max(MIN_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mean(timer: &mut CleaningTimer, speed: SpeedClass, n: u32) -> f64 {
        let total: f64 = (0..n).map(|_| timer.sample(speed).as_secs_f64()).sum();
        total / n as f64
    }

    #[test]
    fn mean_halves_per_class() {
        let timer = CleaningTimer::with_seed(Duration::from_secs(600), 1);
        assert_eq!(timer.mean(SpeedClass::Slow), Duration::from_secs(600));
        assert_eq!(timer.mean(SpeedClass::Mid), Duration::from_secs(300));
        assert_eq!(timer.mean(SpeedClass::Fast), Duration::from_secs(150));
    }

    #[test]
    fn sample_means_track_class_means() {
        let mut timer = CleaningTimer::with_seed(Duration::from_secs(100), 42);
        let n = 20_000;

        let slow = sample_mean(&mut timer, SpeedClass::Slow, n);
        let mid = sample_mean(&mut timer, SpeedClass::Mid, n);
        let fast = sample_mean(&mut timer, SpeedClass::Fast, n);

        // Standard error of an Exp mean over 20k draws is mean/141, so 5% is
        // several standard errors wide.
        assert!((slow - 100.0).abs() < 5.0, "slow mean {}", slow);
        assert!((mid - 50.0).abs() < 2.5, "mid mean {}", mid);
        assert!((fast - 25.0).abs() < 1.25, "fast mean {}", fast);
    }

    #[test]
    fn same_seed_same_durations() {
        let mut a = CleaningTimer::with_seed(Duration::from_secs(10), 9);
        let mut b = CleaningTimer::with_seed(Duration::from_secs(10), 9);
        for speed in SpeedClass::ALL {
            assert_eq!(a.sample(speed), b.sample(speed));
        }
    }

    #[test]
    fn duration_ms_rounds_up() {
        assert_eq!(duration_ms(Duration::ZERO), 0);
        assert_eq!(duration_ms(Duration::from_nanos(1)), 1);
        assert_eq!(duration_ms(Duration::from_micros(250)), 1);
        assert_eq!(duration_ms(Duration::from_millis(1)), 1);
        assert_eq!(duration_ms(Duration::from_millis(1) + Duration::from_nanos(1)), 2);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn zero_base_still_yields_positive_duration() {
        let mut timer = CleaningTimer::with_seed(Duration::ZERO, 4);
        for speed in SpeedClass::ALL {
            assert_eq!(timer.sample(speed), Duration::from_nanos(1));
        }
    }

    #[test]
    fn samples_are_positive() {
        let mut timer = CleaningTimer::with_seed(Duration::from_secs(1), 3);
        for _ in 0..1000 {
            assert!(timer.sample(SpeedClass::Fast) > Duration::ZERO);
        }
    }
}
