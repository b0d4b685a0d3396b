mod derivative;
mod dtw;
mod erp;
mod euclidean;
mod lcss;
mod measure;
mod msm;
mod twe;
mod wdtw;

pub use derivative::first_derivative;
pub use dtw::Dtw;
pub use erp::Erp;
pub use euclidean::Euclidean;
pub use lcss::Lcss;
pub use measure::ElasticMeasure;
pub use msm::Msm;
pub use twe::Twe;
pub use wdtw::Wdtw;

use ndarray::ArrayView1;
use proxima::Float;

/// A pairwise distance over equal-length series.
///
/// Implementations guarantee the early-abandon contract: for any `limit`,
/// `bounded(a, b, limit)` equals `distance(a, b)` whenever the true distance
/// is below `limit`, and is positive infinity otherwise. A partial or
/// otherwise incorrect finite value is never returned.
pub trait Distance<F: Float> {
    /// Distance with an early-abandon limit.
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F;

    /// Full distance, without abandoning.
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.bounded(a, b, F::infinity())
    }
}

#[inline]
pub(crate) fn sq<F: Float>(x: F, y: F) -> F {
    let d = x - y;
    d * d
}

/// Clamp a finished dynamic-programming result against the abandon limit, so
/// `bounded` never reports a finite value at or above it.
#[inline]
pub(crate) fn clamp_limit<F: Float>(d: F, limit: F) -> F {
    if d < limit {
        d
    } else {
        F::infinity()
    }
}
