#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::ArrayView1;
use proxima::Float;

use super::{clamp_limit, sq, Distance};

/// Squared Euclidean distance.
///
/// The squared form keeps it order-equivalent with the true Euclidean
/// distance while staying in the same cost space as the alignment measures,
/// which all accumulate squared pointwise costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Euclidean;

impl Euclidean {
    pub fn new() -> Self {
        Euclidean
    }
}

impl<F: Float> Distance<F> for Euclidean {
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F {
        let mut sum = F::zero();
        for (&x, &y) in a.iter().zip(b.iter()) {
            sum = sum + sq(x, y);
            if sum >= limit {
                return F::infinity();
            }
        }
        clamp_limit(sum, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn squared_sum() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![2.0, 4.0, 6.0];
        let d = Euclidean.distance(a.view(), b.view());
        assert_abs_diff_eq!(d, 1.0 + 4.0 + 9.0);
    }

    #[test]
    fn symmetric() {
        let a = array![0.5, -1.0, 2.5];
        let b = array![1.5, 0.0, -0.5];
        assert_abs_diff_eq!(
            Euclidean.distance(a.view(), b.view()),
            Euclidean.distance(b.view(), a.view())
        );
    }

    #[test]
    fn abandons_at_limit() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![2.0, 4.0, 6.0];
        let exact = Euclidean.distance(a.view(), b.view());
        assert_abs_diff_eq!(Euclidean.bounded(a.view(), b.view(), exact + 1e-9), exact);
        assert_eq!(Euclidean.bounded(a.view(), b.view(), exact), f64::INFINITY);
        assert_eq!(Euclidean.bounded(a.view(), b.view(), 2.0), f64::INFINITY);
    }
}
