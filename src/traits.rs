//! Provide traits for different classes of algorithms
//!

use crate::dataset::{Dataset, Float, Label};
use crate::param_guard::ParamGuard;

/// Fit a model from a labeled dataset
///
/// A fittable algorithm takes a dataset and returns a trained model or fails
/// with an algorithm-specific error type.
pub trait Fit<F: Float, L: Label, E: std::error::Error> {
    type Object;

    fn fit(&self, dataset: &Dataset<F, L>) -> Result<Self::Object, E>;
}

/// Fitting on unchecked hyperparameters checks them first, then fits on the
/// checked set.
impl<F: Float, L: Label, E, P> Fit<F, L, E> for P
where
    E: std::error::Error + From<<P as ParamGuard>::Error>,
    P: ParamGuard,
    P::Checked: Fit<F, L, E>,
{
    type Object = <P::Checked as Fit<F, L, E>>::Object;

    fn fit(&self, dataset: &Dataset<F, L>) -> Result<Self::Object, E> {
        let checked = self.check_ref().map_err(E::from)?;
        checked.fit(dataset)
    }
}

/// Predict into a pre-allocated target
pub trait PredictInplace<R, T> {
    /// Predict something in place
    fn predict_inplace(&self, x: &R, y: &mut T);

    /// Create targets that `predict_inplace` works with
    fn default_target(&self, x: &R) -> T;
}

/// Predict with the creation of the target handled internally
pub trait Predict<R, T> {
    fn predict(&self, x: R) -> T;
}

impl<'a, R, T, S: PredictInplace<R, T>> Predict<&'a R, T> for S {
    fn predict(&self, x: &'a R) -> T {
        let mut y = self.default_target(x);
        self.predict_inplace(x, &mut y);
        y
    }
}
