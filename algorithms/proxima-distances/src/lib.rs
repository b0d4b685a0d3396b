//! # Elastic distance measures
//!
//! `proxima-distances` provides the pairwise distance functions used by
//! distance-based time-series classifiers: squared Euclidean, DTW and its
//! derivative/weighted variants (DDTW, WDTW, WDDTW), ERP, LCSS, MSM and TWE.
//!
//! Every measure implements [`Distance`], whose [`bounded`](Distance::bounded)
//! method takes an early-abandon limit: as soon as the result is provably at
//! least the limit, the computation stops and returns infinity. This is what
//! makes nearest-exemplar searches over many candidates affordable.
//!
//! Measures are parameterized, and the useful parameter ranges depend on the
//! data scale. [`ParamSpace::from_data`] derives a sampling space from a
//! dataset slice, and [`ParamSpace::sample`] draws a concrete, ready-to-use
//! [`ElasticMeasure`] from it.

mod elastic;
mod param_space;

pub use elastic::*;
pub use param_space::*;
