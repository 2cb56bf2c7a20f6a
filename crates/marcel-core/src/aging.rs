// Step 5: age adjustment around a peak age of 29.
//
// Younger players improve by 0.6% per year short of the peak, older players
// decline by 0.3% per year past it. Good stats scale by (1 + adj), bad stats
// by (1 - adj).

pub const PEAK_AGE: f64 = 29.0;
const YOUNG_RATE: f64 = 0.006;
const OLD_RATE: f64 = 0.003;

/// Multiplicative adjustment for a player of `age`: positive below the peak,
/// zero at it, negative above it.
pub fn age_adjustment(age: f64) -> f64 {
    if age >= PEAK_AGE {
        OLD_RATE * (PEAK_AGE - age)
    } else {
        YOUNG_RATE * (PEAK_AGE - age)
    }
}

/// Apply the age curve in place. `good` and `bad` are stat indexes; anything
/// in neither (the playing-time denominators) is left alone.
pub fn apply_age_curve(stats: &mut [f64], age: f64, good: &[usize], bad: &[usize]) {
    let adj = age_adjustment(age);
    for &i in good {
        stats[i] *= 1.0 + adj;
    }
    for &i in bad {
        stats[i] *= 1.0 - adj;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn adjustment_at_peak_is_zero() {
        assert_eq!(age_adjustment(29.0), 0.0);
    }

    #[test]
    fn adjustment_young_and_old() {
        assert!(approx_eq(age_adjustment(25.0), 0.024, 1e-12));
        assert!(approx_eq(age_adjustment(28.0), 0.006, 1e-12));
        assert!(approx_eq(age_adjustment(33.0), -0.012, 1e-12));
    }

    #[test]
    fn peak_age_leaves_stats_unchanged() {
        let mut stats = vec![600.0, 150.0, 120.0];
        apply_age_curve(&mut stats, 29.0, &[1], &[2]);
        assert_eq!(stats, vec![600.0, 150.0, 120.0]);
    }

    #[test]
    fn good_and_bad_move_in_opposite_directions() {
        let mut young = vec![600.0, 100.0, 100.0];
        apply_age_curve(&mut young, 24.0, &[1], &[2]);
        assert_eq!(young[0], 600.0);
        assert!(approx_eq(young[1], 103.0, 1e-9));
        assert!(approx_eq(young[2], 97.0, 1e-9));

        let mut old = vec![600.0, 100.0, 100.0];
        apply_age_curve(&mut old, 35.0, &[1], &[2]);
        assert!(approx_eq(old[1], 98.2, 1e-9));
        assert!(approx_eq(old[2], 101.8, 1e-9));
    }
}
