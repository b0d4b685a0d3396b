#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::ArrayView1;
use proxima::Float;

use super::{clamp_limit, Distance};

/// Move-split-merge distance.
///
/// An edit distance over three moves: substituting a value (move, charged the
/// absolute difference), duplicating a value (split) and collapsing two equal
/// values (merge). Split and merge carry the fixed `cost`, plus the distance
/// to the nearer neighbour when the inserted value does not lie between the
/// adjacent values. All costs are absolute differences, not squared.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Msm<F> {
    cost: F,
}

impl<F: Float> Msm<F> {
    pub fn new(cost: F) -> Self {
        Msm { cost }
    }

    pub fn cost(&self) -> F {
        self.cost
    }

    fn split_merge(&self, new: F, x: F, y: F) -> F {
        if (x <= new && new <= y) || (y <= new && new <= x) {
            self.cost
        } else {
            self.cost + (new - x).abs().min((new - y).abs())
        }
    }
}

impl<F: Float> Distance<F> for Msm<F> {
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F {
        let n = a.len();
        let m = b.len();
        let inf = F::infinity();

        let mut prev = vec![inf; m];
        let mut curr = vec![inf; m];

        curr[0] = (a[0] - b[0]).abs();
        for j in 1..m {
            curr[j] = curr[j - 1] + self.split_merge(b[j], a[0], b[j - 1]);
        }
        if !curr.iter().any(|&c| c < limit) {
            return inf;
        }

        for i in 1..n {
            std::mem::swap(&mut prev, &mut curr);
            curr[0] = prev[0] + self.split_merge(a[i], a[i - 1], b[0]);
            let mut row_min = curr[0];
            for j in 1..m {
                let mat = prev[j - 1] + (a[i] - b[j]).abs();
                let split = prev[j] + self.split_merge(a[i], a[i - 1], b[j]);
                let merge = curr[j - 1] + self.split_merge(b[j], a[i], b[j - 1]);
                let cell = mat.min(split).min(merge);
                curr[j] = cell;
                if cell < row_min {
                    row_min = cell;
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
    fn identical_series_are_zero() {
        let a = array![0.5, 1.5, -2.0, 3.0];
        assert_abs_diff_eq!(Msm::new(1.0).distance(a.view(), a.view()), 0.0);
    }

    #[test]
    fn substitution_costs_absolute_difference() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![1.0, 2.0, 4.0];
        assert_abs_diff_eq!(Msm::new(1.0).distance(a.view(), b.view()), 1.0);
    }

    #[test]
    fn symmetric() {
        let mut rng = SmallRng::seed_from_u64(37);
        let a: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let msm = Msm::new(0.1);
        assert_abs_diff_eq!(
            msm.distance(a.view(), b.view()),
            msm.distance(b.view(), a.view()),
            epsilon = 1e-9
        );
    }

    #[test]
    fn bounded_matches_exact_or_abandons() {
        let mut rng = SmallRng::seed_from_u64(41);
        let a: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let b: Array1<f64> = Array1::random_using(20, Uniform::new(-1.0, 1.0), &mut rng);
        let msm = Msm::new(0.05);
        let exact = msm.distance(a.view(), b.view());
        assert_abs_diff_eq!(msm.bounded(a.view(), b.view(), exact + 1e-9), exact);
        assert_eq!(msm.bounded(a.view(), b.view(), exact), f64::INFINITY);
        assert_eq!(msm.bounded(a.view(), b.view(), exact * 0.5), f64::INFINITY);
    }
}
