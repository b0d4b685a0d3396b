#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use std::fmt;

use ndarray::ArrayView1;
use proxima::Float;

use super::{first_derivative, Distance, Dtw, Erp, Euclidean, Lcss, Msm, Twe, Wdtw};

/// A fully configured elastic measure, dispatching to one of the concrete
/// distances. The derivative variants transform both series with
/// [`first_derivative`] before delegating.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum ElasticMeasure<F> {
    Euclidean(Euclidean),
    Dtw(Dtw),
    Ddtw(Dtw),
    Wdtw(Wdtw<F>),
    Wddtw(Wdtw<F>),
    Erp(Erp<F>),
    Lcss(Lcss<F>),
    Msm(Msm<F>),
    Twe(Twe<F>),
}

impl<F> ElasticMeasure<F> {
    pub fn name(&self) -> &'static str {
        match self {
            ElasticMeasure::Euclidean(_) => "euclidean",
            ElasticMeasure::Dtw(_) => "dtw",
            ElasticMeasure::Ddtw(_) => "ddtw",
            ElasticMeasure::Wdtw(_) => "wdtw",
            ElasticMeasure::Wddtw(_) => "wddtw",
            ElasticMeasure::Erp(_) => "erp",
            ElasticMeasure::Lcss(_) => "lcss",
            ElasticMeasure::Msm(_) => "msm",
            ElasticMeasure::Twe(_) => "twe",
        }
    }
}

impl<F> fmt::Display for ElasticMeasure<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<F: Float> Distance<F> for ElasticMeasure<F> {
    fn bounded(&self, a: ArrayView1<F>, b: ArrayView1<F>, limit: F) -> F {
        match self {
            ElasticMeasure::Euclidean(d) => d.bounded(a, b, limit),
            ElasticMeasure::Dtw(d) => d.bounded(a, b, limit),
            ElasticMeasure::Wdtw(d) => d.bounded(a, b, limit),
            ElasticMeasure::Erp(d) => d.bounded(a, b, limit),
            ElasticMeasure::Lcss(d) => d.bounded(a, b, limit),
            ElasticMeasure::Msm(d) => d.bounded(a, b, limit),
            ElasticMeasure::Twe(d) => d.bounded(a, b, limit),
            ElasticMeasure::Ddtw(d) => {
                let da = first_derivative(a);
                let db = first_derivative(b);
                d.bounded(da.view(), db.view(), limit)
            }
            ElasticMeasure::Wddtw(d) => {
                let da = first_derivative(a);
                let db = first_derivative(b);
                d.bounded(da.view(), db.view(), limit)
            }
        }
    }
}
