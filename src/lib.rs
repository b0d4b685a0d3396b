//! `proxima` is a toolkit for time-series classification in Rust.
//!
//! The root crate provides the pieces shared by every algorithm crate in the
//! workspace: the [`Dataset`] container for labeled series collections, the
//! [`Float`] and [`Label`] traits bounding the element and class types, the
//! [`Fit`](traits::Fit) / [`Predict`](traits::Predict) traits that give all
//! classifiers a common surface, and the [`ParamGuard`](param_guard::ParamGuard)
//! pattern separating unchecked hyperparameter builders from validated ones.
//!
//! The algorithms themselves live in the `algorithms/` member crates:
//!
//! * `proxima-distances`: elastic distance measures (DTW family, ERP, LCSS,
//!   MSM, TWE) with early-abandon support, and their parameter space builders.
//! * `proxima-trees`: the Proximity Forest ensemble and its constituent
//!   Proximity Tree / Proximity Split machinery.

pub mod dataset;
pub mod error;
pub mod param_guard;
pub mod prelude;
pub mod traits;

pub use dataset::{Dataset, Float, Label};
pub use error::{Error, Result};
pub use param_guard::ParamGuard;
pub use traits::{Fit, Predict, PredictInplace};
