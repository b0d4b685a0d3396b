#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::ArrayView1;
use proxima::Float;

use super::{clamp_limit, sq, Distance};

/// Time warp edit distance.
///
/// Combines an edit distance with a stiffness term: matches pay the squared
/// difference of the matched pair (and of the preceding pair), weighted by
/// `nu` times the timestamp drift; deletions on either side pay the local
/// squared step plus the constant `lambda` penalty. Timestamps are taken as
/// the sample indices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Twe<F> {
    nu: F,
    lambda: F,
}

impl<F: Float> Twe<F> {
    pub fn new(nu: F, lambda: F) -> Self {
        Twe { nu, lambda }
    }

    pub fn nu(&self) -> F {
        self.nu
    }

    pub fn lambda(&self) -> F {
        self.lambda
    }
}

// squared step cost of deleting element i of s, with an implicit leading zero
fn self_cost<F: Float>(s: ArrayView1<F>, i: usize) -> F {
    if i == 0 {
        s[0] * s[0]
    } else {
        sq(s[i - 1], s[i])
    }
}

impl<F: Float> Distance<F> for Twe<F> {
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F {
        let n = a.len();
        let m = b.len();
        let inf = F::infinity();
        let del_step = self.lambda + self.nu;

        let mut prev = vec![F::zero(); m + 1];
        let mut curr = vec![F::zero(); m + 1];

        curr[0] = F::zero();
        for j in 1..=m {
            curr[j] = curr[j - 1] + self_cost(b, j - 1) + del_step;
        }

        for i in 1..=n {
            std::mem::swap(&mut prev, &mut curr);
            curr[0] = prev[0] + self_cost(a, i - 1) + del_step;
            let mut row_min = curr[0];
            for j in 1..=m {
                let mut local = sq(a[i - 1], b[j - 1]);
                let mut drift = F::cast(if i > j { i - j } else { j - i });
                if i > 1 && j > 1 {
                    local = local + sq(a[i - 2], b[j - 2]);
                    drift = drift + drift;
                }
                let mat = prev[j - 1] + self.nu * drift + local;
                let del_a = prev[j] + self_cost(a, i - 1) + del_step;
                let del_b = curr[j - 1] + self_cost(b, j - 1) + del_step;
                let cell = mat.min(del_a).min(del_b);
                curr[j] = cell;
                if cell < row_min {
                    row_min = cell;
                }
            }
            if !(row_min < limit) {
                return inf;
            }
        }

        clamp_limit(curr[m], limit)
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
        let a = array![1.0, -0.5, 2.0, 0.0];
        assert_abs_diff_eq!(Twe::new(0.01, 0.1).distance(a.view(), a.view()), 0.0);
    }

    #[test]
    fn symmetric() {
        let mut rng = SmallRng::seed_from_u64(43);
        let a: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let twe = Twe::new(0.001, 0.05);
        assert_abs_diff_eq!(
            twe.distance(a.view(), b.view()),
            twe.distance(b.view(), a.view()),
            epsilon = 1e-9
        );
    }

    #[test]
    fn bounded_matches_exact_or_abandons() {
        let mut rng = SmallRng::seed_from_u64(47);
        let a: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let twe = Twe::new(0.01, 0.1);
        let exact = twe.distance(a.view(), b.view());
        assert_abs_diff_eq!(twe.bounded(a.view(), b.view(), exact + 1e-9), exact);
        assert_eq!(twe.bounded(a.view(), b.view(), exact), f64::INFINITY);
        assert_eq!(twe.bounded(a.view(), b.view(), exact * 0.5), f64::INFINITY);
    }
}
