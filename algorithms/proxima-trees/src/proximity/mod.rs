//! Proximity tree and forest implementations.

mod checkpoint;
mod forest;
mod hyperparams;
mod scoring;
mod split;
mod tree;

pub use forest::ProximityForest;
pub use hyperparams::{
    ProximityForestParams, ProximityForestValidParams, ProximityTreeParams,
    ProximityTreeValidParams,
};
pub use scoring::PartitionScorer;
pub use split::{Exemplar, SplitModel};
pub use tree::ProximityTree;
