//! proxima prelude
//!
pub use crate::dataset::{Dataset, Float, Label};
pub use crate::error::{Error, Result};
pub use crate::param_guard::ParamGuard;
pub use crate::traits::{Fit, Predict, PredictInplace};
