#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::ArrayView1;
use proxima::Float;

use super::{clamp_limit, sq, Distance};

/// Dynamic time warping with a Sakoe-Chiba band.
///
/// `window` is the warping window in cells: an alignment cell `(i, j)` is
/// reachable when `|i - j| <= window`. A negative window removes the
/// restriction entirely; a window of zero forces the diagonal, degenerating
/// to the squared Euclidean distance on equal-length series.
///
/// Early abandon is row-based: once no cell of a row is below the limit, no
/// warping path can finish below it, and the computation stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Dtw {
    window: isize,
}

impl Dtw {
    pub fn new(window: isize) -> Self {
        Dtw { window }
    }

    /// DTW without a warping restriction.
    pub fn unrestricted() -> Self {
        Dtw { window: -1 }
    }

    pub fn window(&self) -> isize {
        self.window
    }
}

impl Default for Dtw {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl<F: Float> Distance<F> for Dtw {
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F {
        let n = a.len();
        let m = b.len();
        let inf = F::infinity();
        // + 1 to include the current cell
        let ws = if self.window < 0 {
            n.max(m)
        } else {
            self.window as usize + 1
        };

        let mut prev = vec![inf; m];
        let mut curr = vec![inf; m];

        curr[0] = sq(a[0], b[0]);
        for j in 1..m.min(ws) {
            curr[j] = curr[j - 1] + sq(a[0], b[j]);
        }

        for i in 1..n {
            std::mem::swap(&mut prev, &mut curr);
            for c in curr.iter_mut() {
                *c = inf;
            }
            let start = if ws < i { i - ws + 1 } else { 1 };
            if i < ws {
                curr[0] = prev[0] + sq(a[i], b[0]);
            }
            let mut too_big = !(curr[start - 1] < limit);
            let end = (i + ws).min(m);
            for j in start..end {
                let mut min = curr[j - 1];
                if prev[j] < min {
                    min = prev[j];
                }
                if prev[j - 1] < min {
                    min = prev[j - 1];
                }
                curr[j] = min + sq(a[i], b[j]);
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
    use crate::Euclidean;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::rngs::SmallRng;

    #[test]
    fn known_alignment() {
        // b lags a by one step; one warp absorbs the shift
        let a = array![1.0, 2.0, 3.0, 4.0];
        let b = array![1.0, 1.0, 2.0, 3.0];
        let d = Dtw::unrestricted().distance(a.view(), b.view());
        assert_abs_diff_eq!(d, 1.0);
    }

    #[test]
    fn zero_window_is_euclidean() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..10 {
            let a: Array1<f64> = Array1::random_using(20, Uniform::new(-2.0, 2.0), &mut rng);
            let b: Array1<f64> = Array1::random_using(20, Uniform::new(-2.0, 2.0), &mut rng);
            assert_abs_diff_eq!(
                Dtw::new(0).distance(a.view(), b.view()),
                Euclidean.distance(a.view(), b.view()),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn symmetric() {
        let mut rng = SmallRng::seed_from_u64(11);
        let a: Array1<f64> = Array1::random_using(30, Uniform::new(-1.0, 1.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(30, Uniform::new(-1.0, 1.0), &mut rng);
        for dtw in [Dtw::unrestricted(), Dtw::new(3)] {
            assert_abs_diff_eq!(
                dtw.distance(a.view(), b.view()),
                dtw.distance(b.view(), a.view()),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn bounded_matches_exact_or_abandons() {
        let mut rng = SmallRng::seed_from_u64(3);
        for window in [-1isize, 0, 2, 5] {
            let dtw = Dtw::new(window);
            let a: Array1<f64> = Array1::random_using(25, Uniform::new(-1.0, 1.0), &mut rng);
            let b: Array1<f64> = Array1::random_using(25, Uniform::new(-1.0, 1.0), &mut rng);
            let exact = dtw.distance(a.view(), b.view());
            assert_abs_diff_eq!(dtw.bounded(a.view(), b.view(), exact + 1e-9), exact);
            assert_eq!(dtw.bounded(a.view(), b.view(), exact), f64::INFINITY);
            assert_eq!(dtw.bounded(a.view(), b.view(), exact * 0.5), f64::INFINITY);
        }
    }

    #[test]
    fn identical_series_are_zero() {
        let a = array![0.0, 1.0, -1.0, 0.5];
        assert_abs_diff_eq!(Dtw::unrestricted().distance(a.view(), a.view()), 0.0);
    }
}
