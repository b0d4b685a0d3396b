//! # Proximity trees and forests
//!
//! `proxima-trees` implements distance-based decision trees for time-series
//! classification. Each internal node holds an elastic measure and one
//! exemplar series per class; an instance follows the branch of its nearest
//! exemplar. A [`ProximityTree`] grows such nodes until purity, and a
//! [`ProximityForest`] ensembles many trees grown with independent seeds and
//! majority-votes their predictions.
//!
//! Training is deterministic for a given seed, can be bounded in time and
//! memory, and can periodically checkpoint its build state so an interrupted
//! run resumes where it stopped.
//!
//! ```no_run
//! use ndarray::{array, Array1};
//! use proxima::prelude::*;
//! use proxima_trees::ProximityForest;
//!
//! # fn main() -> std::result::Result<(), proxima_trees::Error> {
//! let records = array![[0.0, 0.1, 0.2], [1.0, 1.1, 1.2], [0.1, 0.2, 0.3]];
//! let targets = array![0usize, 1, 0];
//! let dataset = Dataset::new(records, targets)?;
//!
//! let forest = ProximityForest::params(42).trees(20).fit(&dataset)?;
//! let labels: Array1<usize> = forest.predict(dataset.records());
//! # Ok(())
//! # }
//! ```

mod error;
mod proximity;

pub use error::{Error, Result};
pub use proximity::{
    Exemplar, PartitionScorer, ProximityForest, ProximityForestParams, ProximityForestValidParams,
    ProximityTree, ProximityTreeParams, ProximityTreeValidParams, SplitModel,
};
