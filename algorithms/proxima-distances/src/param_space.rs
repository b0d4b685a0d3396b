//! Data-driven parameter spaces for the elastic measures.
//!
//! A [`ParamSpace`] is built from the training rows a node actually sees, so
//! the value-dependent ranges (the ERP gap penalty and the LCSS matching
//! threshold) follow the local spread of the data, and the window ranges
//! follow the series length. Sampling a space yields a fully configured
//! [`ElasticMeasure`].

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use std::fmt;

use ndarray::ArrayView2;
use rand::Rng;

use proxima::Float;

use crate::elastic::{Dtw, ElasticMeasure, Erp, Euclidean, Lcss, Msm, Twe, Wdtw};

/// The measure families a split candidate can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum MeasureFamily {
    Euclidean,
    Dtw,
    Ddtw,
    Wdtw,
    Wddtw,
    Erp,
    Lcss,
    Msm,
    Twe,
}

impl MeasureFamily {
    /// Every family, in a fixed order.
    pub fn all() -> Vec<MeasureFamily> {
        vec![
            MeasureFamily::Euclidean,
            MeasureFamily::Dtw,
            MeasureFamily::Ddtw,
            MeasureFamily::Wdtw,
            MeasureFamily::Wddtw,
            MeasureFamily::Erp,
            MeasureFamily::Lcss,
            MeasureFamily::Msm,
            MeasureFamily::Twe,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeasureFamily::Euclidean => "euclidean",
            MeasureFamily::Dtw => "dtw",
            MeasureFamily::Ddtw => "ddtw",
            MeasureFamily::Wdtw => "wdtw",
            MeasureFamily::Wddtw => "wddtw",
            MeasureFamily::Erp => "erp",
            MeasureFamily::Lcss => "lcss",
            MeasureFamily::Msm => "msm",
            MeasureFamily::Twe => "twe",
        }
    }
}

impl fmt::Display for MeasureFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The range of configurations for one measure family over one data slice.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSpace<F> {
    Euclidean,
    Dtw { max_window: usize },
    Ddtw { max_window: usize },
    Wdtw,
    Wddtw,
    Erp { max_window: usize, penalty: (F, F) },
    Lcss { max_window: usize, epsilon: (F, F) },
    Msm,
    Twe,
}

// fixed split/merge cost ladder, 25 values per decade-ish block
fn msm_costs() -> [f64; 100] {
    let mut c = [0.0; 100];
    for i in 0..25 {
        c[i] = 0.01 + 0.00375 * i as f64;
        c[25 + i] = 0.1 + 0.036 * (i + 1) as f64;
        c[50 + i] = 1.0 + 0.36 * (i + 1) as f64;
        c[75 + i] = 10.0 + 3.6 * (i + 1) as f64;
    }
    c
}

const TWE_NU: [f64; 10] = [
    0.00001, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

const TWE_LAMBDA: [f64; 10] = [
    0.0,
    0.011111111,
    0.022222222,
    0.033333333,
    0.044444444,
    0.055555556,
    0.066666667,
    0.077777778,
    0.088888889,
    0.1,
];

/// Population standard deviation over every value of the selected rows.
pub fn population_std<F: Float>(records: ArrayView2<F>, rows: &[usize]) -> F {
    let mut sum = F::zero();
    let mut sum_sq = F::zero();
    let mut count = F::zero();
    for &row in rows {
        for &v in records.row(row) {
            sum = sum + v;
            sum_sq = sum_sq + v * v;
            count = count + F::one();
        }
    }
    if count == F::zero() {
        return F::zero();
    }
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(F::zero()).sqrt()
}

impl<F: Float> ParamSpace<F> {
    /// Build the space for `family` over the given rows of `records`.
    ///
    /// Warping windows range over `[0, series_len / 4]`; the ERP penalty and
    /// the LCSS epsilon range over `[std / 5, std]` of the slice values.
    pub fn from_data(family: MeasureFamily, records: ArrayView2<F>, rows: &[usize]) -> Self {
        let max_window = records.ncols() / 4;
        match family {
            MeasureFamily::Euclidean => ParamSpace::Euclidean,
            MeasureFamily::Dtw => ParamSpace::Dtw { max_window },
            MeasureFamily::Ddtw => ParamSpace::Ddtw { max_window },
            MeasureFamily::Wdtw => ParamSpace::Wdtw,
            MeasureFamily::Wddtw => ParamSpace::Wddtw,
            MeasureFamily::Erp => {
                let std = population_std(records, rows);
                ParamSpace::Erp {
                    max_window,
                    penalty: (std / F::cast(5), std),
                }
            }
            MeasureFamily::Lcss => {
                let std = population_std(records, rows);
                ParamSpace::Lcss {
                    max_window,
                    epsilon: (std / F::cast(5), std),
                }
            }
            MeasureFamily::Msm => ParamSpace::Msm,
            MeasureFamily::Twe => ParamSpace::Twe,
        }
    }

    /// Draw one configured measure from the space.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ElasticMeasure<F> {
        match self {
            ParamSpace::Euclidean => ElasticMeasure::Euclidean(Euclidean),
            ParamSpace::Dtw { max_window } => {
                ElasticMeasure::Dtw(Dtw::new(rng.gen_range(0..=*max_window) as isize))
            }
            ParamSpace::Ddtw { max_window } => {
                ElasticMeasure::Ddtw(Dtw::new(rng.gen_range(0..=*max_window) as isize))
            }
            ParamSpace::Wdtw => ElasticMeasure::Wdtw(Wdtw::new(F::cast(rng.gen::<f64>()))),
            ParamSpace::Wddtw => ElasticMeasure::Wddtw(Wdtw::new(F::cast(rng.gen::<f64>()))),
            ParamSpace::Erp {
                max_window,
                penalty: (lo, hi),
            } => {
                let window = rng.gen_range(0..=*max_window) as isize;
                let penalty = *lo + F::cast(rng.gen::<f64>()) * (*hi - *lo);
                ElasticMeasure::Erp(Erp::new(penalty, window))
            }
            ParamSpace::Lcss {
                max_window,
                epsilon: (lo, hi),
            } => {
                let window = rng.gen_range(0..=*max_window) as isize;
                let epsilon = *lo + F::cast(rng.gen::<f64>()) * (*hi - *lo);
                ElasticMeasure::Lcss(Lcss::new(epsilon, window))
            }
            ParamSpace::Msm => {
                let costs = msm_costs();
                ElasticMeasure::Msm(Msm::new(F::cast(costs[rng.gen_range(0..costs.len())])))
            }
            ParamSpace::Twe => {
                let nu = F::cast(TWE_NU[rng.gen_range(0..TWE_NU.len())]);
                let lambda = F::cast(TWE_LAMBDA[rng.gen_range(0..TWE_LAMBDA.len())]);
                ElasticMeasure::Twe(Twe::new(nu, lambda))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn records() -> ndarray::Array2<f64> {
        array![
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
            [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        ]
    }

    #[test]
    fn msm_ladder_spans_four_blocks() {
        let costs = msm_costs();
        assert_abs_diff_eq!(costs[0], 0.01);
        assert_abs_diff_eq!(costs[1], 0.01375);
        assert_abs_diff_eq!(costs[24], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(costs[25], 0.136, epsilon = 1e-12);
        assert_abs_diff_eq!(costs[49], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(costs[74], 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(costs[99], 100.0, epsilon = 1e-12);
    }

    #[test]
    fn windows_stay_in_quarter_length_range() {
        let data = records();
        let rows = [0, 1, 2];
        let space = ParamSpace::<f64>::from_data(MeasureFamily::Dtw, data.view(), &rows);
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..50 {
            match space.sample(&mut rng) {
                ElasticMeasure::Dtw(dtw) => {
                    assert!(dtw.window() >= 0);
                    assert!(dtw.window() <= 2);
                }
                other => panic!("unexpected measure {}", other),
            }
        }
    }

    #[test]
    fn erp_penalty_follows_slice_spread() {
        let data = records();
        let rows = [0, 1, 2];
        let std = population_std(data.view(), &rows);
        assert!(std > 0.0);
        let space = ParamSpace::<f64>::from_data(MeasureFamily::Erp, data.view(), &rows);
        let mut rng = SmallRng::seed_from_u64(6);
        for _ in 0..50 {
            match space.sample(&mut rng) {
                ElasticMeasure::Erp(erp) => {
                    assert!(erp.penalty() >= std / 5.0);
                    assert!(erp.penalty() <= std);
                }
                other => panic!("unexpected measure {}", other),
            }
        }
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let data = records();
        let rows = [0, 1, 2];
        for family in MeasureFamily::all() {
            let space = ParamSpace::<f64>::from_data(family, data.view(), &rows);
            let a = space.sample(&mut SmallRng::seed_from_u64(99));
            let b = space.sample(&mut SmallRng::seed_from_u64(99));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn population_std_of_constant_rows_is_zero() {
        let data = array![[3.0, 3.0, 3.0], [3.0, 3.0, 3.0]];
        let std = population_std::<f64>(data.view(), &[0, 1]);
        assert_abs_diff_eq!(std, 0.0);
    }
}
