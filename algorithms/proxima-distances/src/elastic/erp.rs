#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::ArrayView1;
use proxima::Float;

use super::{clamp_limit, sq, Distance};

/// Edit distance with real penalty.
///
/// An edit-distance relative of DTW: instead of repeating elements to absorb
/// a shift, a series may take a gap move, which is charged the squared
/// difference against the fixed reference value `penalty`. Matches are
/// charged the squared difference of the matched values. The alignment is
/// restricted to a band of half-width `window` around the diagonal
/// (negative: unrestricted).
///
/// When move costs tie, deletion is preferred over insertion over match.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Erp<F> {
    penalty: F,
    window: isize,
}

impl<F: Float> Erp<F> {
    pub fn new(penalty: F, window: isize) -> Self {
        Erp { penalty, window }
    }

    pub fn penalty(&self) -> F {
        self.penalty
    }

    pub fn window(&self) -> isize {
        self.window
    }
}

impl<F: Float> Distance<F> for Erp<F> {
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F {
        let n = a.len();
        let m = b.len();
        let inf = F::infinity();
        let band = if self.window < 0 {
            n.max(m)
        } else {
            self.window as usize
        };
        let g = self.penalty;

        let mut prev = vec![F::zero(); m];
        let mut curr = vec![F::zero(); m];

        for i in 0..n {
            std::mem::swap(&mut prev, &mut curr);
            for c in curr.iter_mut() {
                *c = inf;
            }
            let l = i.saturating_sub(band + 1);
            let r = (i + band + 1).min(m - 1);
            let mut row_min = inf;
            for j in l..=r {
                let offset = if i > j { i - j } else { j - i };
                if offset > band {
                    continue;
                }
                let cost = if i + j == 0 {
                    F::zero()
                } else {
                    let gap_a = sq(a[i], g);
                    let gap_b = sq(g, b[j]);
                    let both = sq(a[i], b[j]);
                    let del = if j > 0 { curr[j - 1] + gap_b } else { inf };
                    let ins = if i > 0 { prev[j] + gap_a } else { inf };
                    let mat = if i > 0 && j > 0 { prev[j - 1] + both } else { inf };
                    if i == 0 || (j != 0 && mat > del && del < ins) {
                        del
                    } else if j == 0 || (i != 0 && mat > ins && ins < del) {
                        ins
                    } else {
                        mat
                    }
                };
                curr[j] = cost;
                if cost < row_min {
                    row_min = cost;
                }
            }
            if !(row_min < limit) {
                return inf;
            }
        }

        clamp_limit(curr[m - 1], limit)
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
    fn identical_series_are_free() {
        let a = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let erp = Erp::new(0.5, -1);
        assert_abs_diff_eq!(erp.distance(a.view(), a.view()), 0.0);
    }

    #[test]
    fn extra_element_pays_squared_gap_cost() {
        // the trailing 5 has no partner and is charged against the penalty
        let a = array![0.0, 0.0, 5.0];
        let b = array![0.0, 0.0];
        let erp = Erp::new(0.0, -1);
        assert_abs_diff_eq!(erp.distance(a.view(), b.view()), 25.0);
    }

    #[test]
    fn bounded_matches_exact_or_abandons() {
        let mut rng = SmallRng::seed_from_u64(23);
        for window in [-1isize, 3] {
            let erp = Erp::new(0.25, window);
            let a: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
            let b: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
            let exact = erp.distance(a.view(), b.view());
            assert_abs_diff_eq!(erp.bounded(a.view(), b.view(), exact + 1e-9), exact);
            assert_eq!(erp.bounded(a.view(), b.view(), exact), f64::INFINITY);
            assert_eq!(erp.bounded(a.view(), b.view(), exact * 0.5), f64::INFINITY);
        }
    }
}
