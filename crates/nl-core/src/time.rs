//! Virtual-clock schedule arithmetic.
//!
//! The virtual clock is a plain `f64` in milliseconds, driven externally
//! step by step. Sampling schedules are defined as multiples of a period,
//! so the one operation everything hinges on is "is `t` a multiple of the
//! period", which must tolerate the roundoff of accumulated time steps
//! (`0.1 + 0.1 + 0.1 != 0.3` in `f64`).

use crate::numeric::Real;

/// Slack for schedule comparisons, in milliseconds.
///
/// Flat absolute tolerance on the distance to the nearest period multiple.
/// A relative term would outgrow the period itself for long experiments,
/// turning every query time into a schedule hit.
pub const SCHEDULE_TOL_MS: Real = 1e-8;

/// Whether `t_ms` lands on a multiple of `period_ms`.
///
/// Both distances to the nearest multiple (remainder near zero, remainder
/// near the full period) are checked. `period_ms` is assumed positive;
/// callers validate at construction.
pub fn is_period_multiple(t_ms: Real, period_ms: Real) -> bool {
    let rem = (t_ms % period_ms).abs();
    rem <= SCHEDULE_TOL_MS || (period_ms - rem) <= SCHEDULE_TOL_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiples() {
        assert!(is_period_multiple(0.0, 1.0));
        assert!(is_period_multiple(1.0, 1.0));
        assert!(is_period_multiple(2.0, 1.0));
        assert!(is_period_multiple(15.0, 2.5));
    }

    #[test]
    fn off_schedule_times() {
        assert!(!is_period_multiple(1.2, 1.0));
        assert!(!is_period_multiple(2.3, 1.0));
        assert!(!is_period_multiple(2.4, 1.0));
        assert!(!is_period_multiple(0.5, 1.0));
    }

    #[test]
    fn accumulated_step_roundoff() {
        // Summing dt never reproduces the multiple exactly.
        let dt = 0.1;
        let mut t = 0.0;
        let mut hits = 0;
        for _ in 0..30 {
            t += dt;
            if is_period_multiple(t, 0.3) {
                hits += 1;
            }
        }
        assert_eq!(hits, 10);
    }

    #[test]
    fn fractional_period() {
        assert!(is_period_multiple(0.6, 0.2));
        assert!(!is_period_multiple(0.7, 0.2));
    }

    #[test]
    fn integer_valued_times() {
        assert!(is_period_multiple(1.0e9, 1.0));
        assert!(!is_period_multiple(1.0e6 + 0.5, 1.0));
    }
}
