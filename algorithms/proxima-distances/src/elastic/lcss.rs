#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::ArrayView1;
use proxima::Float;

use super::{clamp_limit, Distance};

/// Longest common subsequence distance.
///
/// Two elements match when they are within `epsilon` of each other; the
/// longest chain of in-order matches inside a diagonal band of half-width
/// `window` (negative: unrestricted) is counted and turned into a distance:
///
/// `d = 1 - matched / len`
///
/// so identical series score 0 and series with no matching elements score 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Lcss<F> {
    epsilon: F,
    window: isize,
}

impl<F: Float> Lcss<F> {
    pub fn new(epsilon: F, window: isize) -> Self {
        Lcss { epsilon, window }
    }

    pub fn epsilon(&self) -> F {
        self.epsilon
    }

    pub fn window(&self) -> isize {
        self.window
    }
}

impl<F: Float> Distance<F> for Lcss<F> {
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F {
        let n = a.len();
        let m = b.len();
        let delta = if self.window < 0 {
            m
        } else {
            self.window as usize
        };
        let eps = self.epsilon;

        // Smallest match count that still beats the limit. Negative means the
        // limit can never be hit, so abandoning is disabled.
        let needed = (F::one() - limit) * F::cast(n);
        let target = if needed < F::zero() {
            None
        } else {
            Some(needed.floor() + F::one())
        };

        let mut prev = vec![0usize; m + 1];
        let mut curr = vec![0usize; m + 1];

        for i in 1..=n {
            std::mem::swap(&mut prev, &mut curr);
            curr.fill(0);
            let lo = 1.max(i.saturating_sub(delta));
            let hi = (i + delta).min(m);
            let mut row_best = 0;
            for j in lo..=hi {
                let matched = b[j - 1] + eps >= a[i - 1] && b[j - 1] - eps <= a[i - 1];
                let count = if matched {
                    prev[j - 1] + 1
                } else {
                    prev[j].max(curr[j - 1])
                };
                curr[j] = count;
                row_best = row_best.max(count);
            }
            // at most one more match per remaining row
            if let Some(target) = target {
                if F::cast(row_best + (n - i)) < target {
                    return F::infinity();
                }
            }
        }

        let best = curr.iter().copied().max().unwrap_or(0);
        let d = F::one() - F::cast(best) / F::cast(n);
        clamp_limit(d, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::rngs::SmallRng;

    #[test]
    fn identical_series_are_zero() {
        let a = array![1.0, 2.0, 3.0, 4.0];
        let lcss = Lcss::new(0.1, -1);
        assert_abs_diff_eq!(lcss.distance(a.view(), a.view()), 0.0);
    }

    #[test]
    fn infinite_epsilon_matches_everything() {
        let mut rng = SmallRng::seed_from_u64(29);
        let a: Array1<f64> = Array1::random_using(20, Uniform::new(-5.0, 5.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(20, Uniform::new(-5.0, 5.0), &mut rng);
        let lcss = Lcss::new(f64::INFINITY, -1);
        assert_abs_diff_eq!(lcss.distance(a.view(), b.view()), 0.0);
    }

    #[test]
    fn counts_matches_within_epsilon() {
        // three of four elements line up
        let a = array![1.0, 2.0, 3.0, 4.0];
        let b = array![1.0, 2.0, 3.0, 10.0];
        let lcss = Lcss::new(0.1, -1);
        assert_abs_diff_eq!(lcss.distance(a.view(), b.view()), 0.25);
    }

    #[test]
    fn bounded_matches_exact_or_abandons() {
        let mut rng = SmallRng::seed_from_u64(31);
        for window in [-1isize, 4] {
            let lcss = Lcss::new(0.2, window);
            let a: Array1<f64> = Array1::random_using(25, Uniform::new(-1.0, 1.0), &mut rng);
            let b: Array1<f64> = Array1::random_using(25, Uniform::new(-1.0, 1.0), &mut rng);
            let exact = lcss.distance(a.view(), b.view());
            assert!(exact > 0.0);
            assert_abs_diff_eq!(lcss.bounded(a.view(), b.view(), exact + 1e-9), exact);
            assert_eq!(lcss.bounded(a.view(), b.view(), exact), f64::INFINITY);
            assert_eq!(lcss.bounded(a.view(), b.view(), exact * 0.5), f64::INFINITY);
        }
    }
}
