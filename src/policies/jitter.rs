//! # Jitter for restart delays.
//!
//! [`JitterPolicy`] spreads restarts of agents that failed together (for example
//! after the same upstream outage) so they do not all come back at once.

use std::time::Duration;

use rand::Rng;

/// Randomization applied to restart delays.
///
/// With anything other than `None`, successive delays are no longer guaranteed
/// to be non-decreasing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Exact backoff delay.
    #[default]
    None,
    /// Uniform in `[0, base]`.
    Full,
    /// `base / 2` plus uniform in `[0, base / 2]`.
    Equal,
    /// Uniform in `[floor, base × 3]`, capped at `max`.
    Decorrelated,
}

impl JitterPolicy {
    /// Jitters a clamped backoff delay.
    ///
    /// `floor` and `max` bound the decorrelated variant; the others only use `base`.
    pub fn apply(self, base: Duration, floor: Duration, max: Duration) -> Duration {
        let base_ms = millis(base);
        let ms = match self {
            JitterPolicy::None => return base,
            JitterPolicy::Full => uniform(0, base_ms),
            JitterPolicy::Equal => {
                let half = base_ms / 2;
                half + uniform(0, half)
            }
            JitterPolicy::Decorrelated => {
                let lo = millis(floor);
                let hi = base_ms.saturating_mul(3).min(millis(max)).max(lo);
                uniform(lo, hi)
            }
        };
        Duration::from_millis(ms)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Uniform in `[lo, hi]`; `lo` when the range is empty.
fn uniform(lo: u64, hi: u64) -> u64 {
    if hi <= lo {
        return lo;
    }
    rand::rng().random_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn none_is_identity() {
        let d = 250 * MS;
        assert_eq!(JitterPolicy::None.apply(d, MS, 10 * d), d);
        assert_eq!(JitterPolicy::default(), JitterPolicy::None);
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO, MS, MS), Duration::ZERO);
        assert_eq!(JitterPolicy::Equal.apply(Duration::ZERO, MS, MS), Duration::ZERO);
    }

    #[test]
    fn decorrelated_with_base_at_cap_returns_floor() {
        let d = 100 * MS;
        assert_eq!(JitterPolicy::Decorrelated.apply(d, d, d), d);
    }

    #[test]
    fn bounds_hold() {
        for _ in 0..200 {
            let full = JitterPolicy::Full.apply(300 * MS, MS, 5000 * MS);
            assert!(full <= 300 * MS);
            let equal = JitterPolicy::Equal.apply(300 * MS, MS, 5000 * MS);
            assert!(equal >= 150 * MS && equal <= 300 * MS);
            let dec = JitterPolicy::Decorrelated.apply(300 * MS, 100 * MS, 500 * MS);
            assert!(dec >= 100 * MS && dec <= 500 * MS);
        }
    }
}
