//! Hyperparameters of proximity trees and forests.
//!
//! Both algorithms follow the params/valid-params split: builders collect
//! settings without judging them, [`ParamGuard`] validates, and only the
//! checked set can fit. `ProximityTree::params(seed)` and
//! `ProximityForest::params(seed)` are the entry points.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use proxima::{Float, Label, ParamGuard};
use proxima_distances::MeasureFamily;

use super::forest::ProximityForest;
use super::scoring::PartitionScorer;
use super::tree::ProximityTree;
use crate::error::Error;

const DEFAULT_CANDIDATES: usize = 5;
const DEFAULT_TREES: usize = 100;
const DEFAULT_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(3600);

/// Checked hyperparameters of a single proximity tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityTreeValidParams<F, L> {
    seed: u64,
    candidates: usize,
    random_candidates: bool,
    scorer: PartitionScorer,
    families: Vec<MeasureFamily>,
    breadth_first: bool,
    max_height: Option<usize>,
    train_time_limit: Option<Duration>,
    test_time_limit: Option<Duration>,
    memory_limit: Option<usize>,
    early_abandon: bool,
    random_tie_break_distances: bool,
    random_tie_break_candidates: bool,
    checkpoint_path: Option<PathBuf>,
    checkpoint_interval: Duration,
    #[serde(skip)]
    marker: PhantomData<(F, L)>,
}

impl<F, L> ProximityTreeValidParams<F, L> {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn random_candidates(&self) -> bool {
        self.random_candidates
    }

    pub fn scorer(&self) -> PartitionScorer {
        self.scorer
    }

    pub fn families(&self) -> &[MeasureFamily] {
        &self.families
    }

    pub fn breadth_first(&self) -> bool {
        self.breadth_first
    }

    pub fn max_height(&self) -> Option<usize> {
        self.max_height
    }

    pub fn train_time_limit(&self) -> Option<Duration> {
        self.train_time_limit
    }

    pub fn test_time_limit(&self) -> Option<Duration> {
        self.test_time_limit
    }

    pub fn memory_limit(&self) -> Option<usize> {
        self.memory_limit
    }

    pub fn early_abandon(&self) -> bool {
        self.early_abandon
    }

    pub fn random_tie_break_distances(&self) -> bool {
        self.random_tie_break_distances
    }

    pub fn random_tie_break_candidates(&self) -> bool {
        self.random_tie_break_candidates
    }

    pub fn checkpoint_path(&self) -> Option<&Path> {
        self.checkpoint_path.as_deref()
    }

    pub fn checkpoint_interval(&self) -> Duration {
        self.checkpoint_interval
    }

    pub(crate) fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub(crate) fn without_checkpoint(mut self) -> Self {
        self.checkpoint_path = None;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.candidates == 0 {
            return Err(Error::Parameters(
                "at least one split candidate per node is required".to_string(),
            ));
        }
        if self.families.is_empty() {
            return Err(Error::Parameters(
                "at least one measure family is required".to_string(),
            ));
        }
        if self.max_height == Some(0) {
            return Err(Error::Parameters(
                "max_height must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unchecked hyperparameters of a single proximity tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityTreeParams<F, L>(ProximityTreeValidParams<F, L>);

impl<F, L> ProximityTreeParams<F, L> {
    pub fn new(seed: u64) -> Self {
        ProximityTreeParams(ProximityTreeValidParams {
            seed,
            candidates: DEFAULT_CANDIDATES,
            random_candidates: false,
            scorer: PartitionScorer::default(),
            families: MeasureFamily::all(),
            breadth_first: true,
            max_height: None,
            train_time_limit: None,
            test_time_limit: None,
            memory_limit: None,
            early_abandon: false,
            random_tie_break_distances: true,
            random_tie_break_candidates: false,
            checkpoint_path: None,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            marker: PhantomData,
        })
    }

    /// Number of split candidates evaluated per node.
    pub fn candidates(mut self, candidates: usize) -> Self {
        self.0.candidates = candidates;
        self
    }

    /// Draw the per-node candidate count uniformly from `1..=candidates`
    /// instead of using it as a constant.
    pub fn random_candidates(mut self, random: bool) -> Self {
        self.0.random_candidates = random;
        self
    }

    pub fn scorer(mut self, scorer: PartitionScorer) -> Self {
        self.0.scorer = scorer;
        self
    }

    /// Measure families a candidate can draw from.
    pub fn families(mut self, families: Vec<MeasureFamily>) -> Self {
        self.0.families = families;
        self
    }

    /// Grow nodes first-in-first-out (the default) or depth first.
    pub fn breadth_first(mut self, breadth_first: bool) -> Self {
        self.0.breadth_first = breadth_first;
        self
    }

    /// Stop splitting below this height; the root is at height 0.
    pub fn max_height(mut self, max_height: usize) -> Self {
        self.0.max_height = Some(max_height);
        self
    }

    /// Stop growing nodes once finishing the next node would exceed this
    /// wall-clock budget.
    pub fn train_time_limit(mut self, limit: Duration) -> Self {
        self.0.train_time_limit = Some(limit);
        self
    }

    /// Stop descending during prediction once this per-instance budget runs
    /// out; the answer then comes from the deepest node reached.
    pub fn test_time_limit(mut self, limit: Duration) -> Self {
        self.0.test_time_limit = Some(limit);
        self
    }

    /// Stop growing nodes once the estimated model size in bytes exceeds
    /// this bound.
    pub fn memory_limit(mut self, bytes: usize) -> Self {
        self.0.memory_limit = Some(bytes);
        self
    }

    /// Abandon exemplar distance computations at the best distance seen so
    /// far for the instance.
    pub fn early_abandon(mut self, early_abandon: bool) -> Self {
        self.0.early_abandon = early_abandon;
        self
    }

    /// Break exact distance ties between exemplars randomly instead of
    /// taking the first.
    pub fn random_tie_break_distances(mut self, random: bool) -> Self {
        self.0.random_tie_break_distances = random;
        self
    }

    /// Break score ties between split candidates randomly instead of keeping
    /// the earliest winner.
    pub fn random_tie_break_candidates(mut self, random: bool) -> Self {
        self.0.random_tie_break_candidates = random;
        self
    }

    /// Persist the build state (grown nodes, pending node queue, generator
    /// state, training time spent) to `path` at most every `interval`, and
    /// resume from that file when it exists at fit time.
    pub fn checkpoint<P: Into<PathBuf>>(mut self, path: P, interval: Duration) -> Self {
        self.0.checkpoint_path = Some(path.into());
        self.0.checkpoint_interval = interval;
        self
    }
}

impl<F, L> ParamGuard for ProximityTreeParams<F, L> {
    type Checked = ProximityTreeValidParams<F, L>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        self.0.validate()?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float, L: Label> ProximityTree<F, L> {
    /// Tree hyperparameters with their defaults: five candidates per node,
    /// Gini gain scoring, all measure families, breadth-first growth and no
    /// contracts.
    pub fn params(seed: u64) -> ProximityTreeParams<F, L> {
        ProximityTreeParams::new(seed)
    }
}

/// Checked hyperparameters of a proximity forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityForestValidParams<F, L> {
    seed: u64,
    trees: usize,
    tree: ProximityTreeValidParams<F, L>,
    use_distribution_in_voting: bool,
    train_time_limit: Option<Duration>,
    test_time_limit: Option<Duration>,
    memory_limit: Option<usize>,
    checkpoint_path: Option<PathBuf>,
    checkpoint_interval: Duration,
}

impl<F, L> ProximityForestValidParams<F, L> {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn trees(&self) -> usize {
        self.trees
    }

    pub fn tree(&self) -> &ProximityTreeValidParams<F, L> {
        &self.tree
    }

    pub fn use_distribution_in_voting(&self) -> bool {
        self.use_distribution_in_voting
    }

    pub fn train_time_limit(&self) -> Option<Duration> {
        self.train_time_limit
    }

    pub fn test_time_limit(&self) -> Option<Duration> {
        self.test_time_limit
    }

    pub fn memory_limit(&self) -> Option<usize> {
        self.memory_limit
    }

    pub fn checkpoint_path(&self) -> Option<&Path> {
        self.checkpoint_path.as_deref()
    }

    pub fn checkpoint_interval(&self) -> Duration {
        self.checkpoint_interval
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.trees == 0 {
            return Err(Error::Parameters(
                "at least one tree is required".to_string(),
            ));
        }
        self.tree.validate()
    }
}

/// Unchecked hyperparameters of a proximity forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityForestParams<F, L>(ProximityForestValidParams<F, L>);

impl<F, L> ProximityForestParams<F, L> {
    pub fn new(seed: u64) -> Self {
        ProximityForestParams(ProximityForestValidParams {
            seed,
            trees: DEFAULT_TREES,
            tree: ProximityTreeParams::new(0).0,
            use_distribution_in_voting: false,
            train_time_limit: None,
            test_time_limit: None,
            memory_limit: None,
            checkpoint_path: None,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        })
    }

    /// Number of trees in the ensemble.
    pub fn trees(mut self, trees: usize) -> Self {
        self.0.trees = trees;
        self
    }

    /// Configuration template for every tree. Its seed is ignored; each tree
    /// gets a fresh seed drawn from the forest generator. Its checkpoint
    /// settings are ignored too; the forest checkpoints as a whole.
    pub fn tree(mut self, tree: ProximityTreeParams<F, L>) -> Self {
        self.0.tree = tree.0;
        self
    }

    /// Split candidates per node, forwarded to every tree.
    pub fn candidates(mut self, candidates: usize) -> Self {
        self.0.tree.candidates = candidates;
        self
    }

    /// Sum the per-tree class distributions instead of one-hot majority
    /// votes.
    pub fn use_distribution_in_voting(mut self, use_distribution: bool) -> Self {
        self.0.use_distribution_in_voting = use_distribution;
        self
    }

    /// Stop adding trees once building the next one is estimated to exceed
    /// this wall-clock budget.
    pub fn train_time_limit(mut self, limit: Duration) -> Self {
        self.0.train_time_limit = Some(limit);
        self
    }

    /// Stop collecting tree votes once this per-instance budget runs out; at
    /// least one tree always votes.
    pub fn test_time_limit(mut self, limit: Duration) -> Self {
        self.0.test_time_limit = Some(limit);
        self
    }

    /// Stop adding trees once the estimated ensemble size in bytes exceeds
    /// this bound.
    pub fn memory_limit(mut self, bytes: usize) -> Self {
        self.0.memory_limit = Some(bytes);
        self
    }

    /// Persist finished trees to `path` at most every `interval`, and resume
    /// from that file when it exists at fit time.
    pub fn checkpoint<P: Into<PathBuf>>(mut self, path: P, interval: Duration) -> Self {
        self.0.checkpoint_path = Some(path.into());
        self.0.checkpoint_interval = interval;
        self
    }
}

impl<F, L> ParamGuard for ProximityForestParams<F, L> {
    type Checked = ProximityForestValidParams<F, L>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        self.0.validate()?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float, L: Label> ProximityForest<F, L> {
    /// Forest hyperparameters with their defaults: one hundred trees, five
    /// candidates per node, majority voting.
    pub fn params(seed: u64) -> ProximityForestParams<F, L> {
        ProximityForestParams::new(seed)
    }

    /// One split candidate per node.
    pub fn r1(seed: u64) -> ProximityForestParams<F, L> {
        ProximityForestParams::new(seed).candidates(1)
    }

    /// Five split candidates per node, the published default.
    pub fn r5(seed: u64) -> ProximityForestParams<F, L> {
        ProximityForestParams::new(seed).candidates(5)
    }

    /// Ten split candidates per node.
    pub fn r10(seed: u64) -> ProximityForestParams<F, L> {
        ProximityForestParams::new(seed).candidates(10)
    }
}
