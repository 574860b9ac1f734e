//! Randomised interval spreading, so cards introduced together drift apart.

use num_traits::ToPrimitive;
use rand::Rng;
use rand::rngs::StdRng;

/// Inclusive fuzz window for a review interval. The window widens with the
/// interval, but never drops below one day.
#[must_use]
pub(crate) fn fuzz_interval_range(interval: u32) -> (u32, u32) {
    if interval < 2 {
        return (1, 1);
    }
    if interval == 2 {
        return (2, 3);
    }
    let fuzz = if interval < 7 {
        (f64::from(interval) * 0.25) as u32
    } else if interval < 30 {
        ((f64::from(interval) * 0.15) as u32).max(2)
    } else {
        ((f64::from(interval) * 0.05) as u32).max(4)
    }
    .max(1);
    (interval - fuzz, interval + fuzz)
}

/// Pick a fuzzed interval from the window around `interval`.
pub(crate) fn fuzzed_interval(rng: &mut StdRng, interval: u32) -> u32 {
    let (low, high) = fuzz_interval_range(interval);
    rng.gen_range(low..=high)
}

/// Scale an interval by the deck's multiplier and force it past `previous`.
#[must_use]
pub(crate) fn constrained_interval(interval: f64, interval_multiplier: f32, previous: u32) -> u32 {
    let scaled = (interval * f64::from(interval_multiplier)).ceil();
    scaled.to_u32().unwrap_or(u32::MAX).max(previous + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn short_intervals_have_fixed_windows() {
        assert_eq!(fuzz_interval_range(0), (1, 1));
        assert_eq!(fuzz_interval_range(1), (1, 1));
        assert_eq!(fuzz_interval_range(2), (2, 3));
    }

    #[test]
    fn windows_widen_with_the_interval() {
        assert_eq!(fuzz_interval_range(4), (3, 5));
        assert_eq!(fuzz_interval_range(10), (8, 12));
        assert_eq!(fuzz_interval_range(100), (95, 105));
    }

    #[test]
    fn fuzzed_interval_stays_inside_the_window() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let picked = fuzzed_interval(&mut rng, 10);
            assert!((8..=12).contains(&picked));
        }
    }

    #[test]
    fn same_seed_gives_the_same_fuzz() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let left: Vec<u32> = (0..10).map(|_| fuzzed_interval(&mut a, 25)).collect();
        let right: Vec<u32> = (0..10).map(|_| fuzzed_interval(&mut b, 25)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn constrained_interval_rounds_up_and_outgrows_previous() {
        assert_eq!(constrained_interval(27.5, 1.0, 12), 28);
        assert_eq!(constrained_interval(12.0, 1.0, 10), 12);
        assert_eq!(constrained_interval(5.0, 1.0, 10), 11);
        assert_eq!(constrained_interval(10.0, 1.3, 10), 13);
    }
}
