#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::ArrayView1;
use proxima::Float;

use super::{clamp_limit, sq, Distance};

/// Weighted dynamic time warping.
///
/// Instead of a hard warping window, every cell cost is multiplied by a
/// logistic weight of the index offset `|i - j|`:
///
/// `w[k] = 1 / (1 + e^(-g * (k - m/2)))`
///
/// `g` controls the steepness: zero weighs all offsets equally (plain
/// unconstrained DTW halved), large values punish off-diagonal matches so
/// hard the alignment approaches the diagonal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Wdtw<F> {
    g: F,
}

impl<F: Float> Wdtw<F> {
    pub fn new(g: F) -> Self {
        Wdtw { g }
    }

    pub fn g(&self) -> F {
        self.g
    }

    fn weights(&self, len: usize) -> Vec<F> {
        let half = F::cast(len) / F::cast(2);
        (0..len)
            .map(|i| F::one() / (F::one() + (-self.g * (F::cast(i) - half)).exp()))
            .collect()
    }
}

impl<F: Float> Distance<F> for Wdtw<F> {
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F {
        let n = a.len();
        let m = b.len();
        let inf = F::infinity();
        let weights = self.weights(n.max(m));

        let mut prev = vec![inf; m];
        let mut curr = vec![inf; m];

        curr[0] = weights[0] * sq(a[0], b[0]);
        for j in 1..m {
            curr[j] = curr[j - 1] + weights[j] * sq(a[0], b[j]);
        }
        if !curr.iter().any(|&c| c < limit) {
            return inf;
        }

        for i in 1..n {
            std::mem::swap(&mut prev, &mut curr);
            curr[0] = prev[0] + weights[i] * sq(a[i], b[0]);
            let mut too_big = !(curr[0] < limit);
            for j in 1..m {
                let mut min = curr[j - 1];
                if prev[j] < min {
                    min = prev[j];
                }
                if prev[j - 1] < min {
                    min = prev[j - 1];
                }
                let offset = if i > j { i - j } else { j - i };
                curr[j] = min + weights[offset] * sq(a[i], b[j]);
                if too_big && curr[j] < limit {
                    too_big = false;
                }
            }
            if too_big {
                return inf;
            }
        }

        clamp_limit(curr[m - 1], limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Distance, Dtw};
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::rngs::SmallRng;

    #[test]
    fn zero_g_is_half_weighted_dtw() {
        // g = 0 makes every weight exactly 0.5
        let mut rng = SmallRng::seed_from_u64(13);
        let a: Array1<f64> = Array1::random_using(15, Uniform::new(-1.0, 1.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(15, Uniform::new(-1.0, 1.0), &mut rng);
        let wdtw = Wdtw::new(0.0).distance(a.view(), b.view());
        let dtw = Dtw::unrestricted().distance(a.view(), b.view());
        assert_abs_diff_eq!(wdtw, 0.5 * dtw, epsilon = 1e-9);
    }

    #[test]
    fn symmetric() {
        let mut rng = SmallRng::seed_from_u64(17);
        let a: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let wdtw = Wdtw::new(0.3);
        assert_abs_diff_eq!(
            wdtw.distance(a.view(), b.view()),
            wdtw.distance(b.view(), a.view()),
            epsilon = 1e-9
        );
    }

    #[test]
    fn bounded_matches_exact_or_abandons() {
        let mut rng = SmallRng::seed_from_u64(19);
        let a: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let wdtw = Wdtw::new(0.05);
        let exact = wdtw.distance(a.view(), b.view());
        assert_abs_diff_eq!(wdtw.bounded(a.view(), b.view(), exact + 1e-9), exact);
        assert_eq!(wdtw.bounded(a.view(), b.view(), exact), f64::INFINITY);
        assert_eq!(wdtw.bounded(a.view(), b.view(), exact * 0.1), f64::INFINITY);
    }
}
