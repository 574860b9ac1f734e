//! Mapping wall-clock time onto the collection's day grid.

/// The current day index and the second at which it ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    /// Whole days elapsed since the collection was created.
    pub today: u32,
    /// Unix second at which `today` rolls over to `today + 1`.
    pub day_cutoff_secs: i64,
}

/// Compute scheduling time for `now`, relative to the collection creation
/// stamp. A clock set before the creation stamp pins the day at zero.
#[must_use]
pub fn timing_for(creation_stamp_secs: i64, now_secs: i64) -> Timing {
    let today = ((now_secs - creation_stamp_secs) / 86_400).max(0) as u32;
    Timing {
        today,
        day_cutoff_secs: creation_stamp_secs + (i64::from(today) + 1) * 86_400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_zero_spans_the_first_86400_seconds() {
        let timing = timing_for(1_000, 1_000);
        assert_eq!(timing.today, 0);
        assert_eq!(timing.day_cutoff_secs, 1_000 + 86_400);

        let timing = timing_for(1_000, 1_000 + 86_399);
        assert_eq!(timing.today, 0);
    }

    #[test]
    fn rollover_lands_on_the_cutoff() {
        let timing = timing_for(1_000, 1_000 + 86_400);
        assert_eq!(timing.today, 1);
        assert_eq!(timing.day_cutoff_secs, 1_000 + 2 * 86_400);
    }

    #[test]
    fn clock_before_creation_clamps_to_day_zero() {
        assert_eq!(timing_for(10_000, 500).today, 0);
    }
}
