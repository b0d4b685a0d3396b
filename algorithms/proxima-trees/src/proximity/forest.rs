//! Proximity forest ensemble.

use std::time::{Duration, Instant};

use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use proxima::{Dataset, Fit, Float, Label, PredictInplace};

use super::checkpoint;
use super::hyperparams::ProximityForestValidParams;
use super::tree::{argmax, ProximityTree};
use crate::error::Error;

/// An ensemble of proximity trees grown with independent seeds.
///
/// Each tree votes for the class its leaf answers; the forest normalizes the
/// votes into a distribution and predicts the heaviest class. Grown by
/// fitting [`ProximityForestParams`](super::ProximityForestParams).
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityForest<F, L> {
    trees: Vec<ProximityTree<F, L>>,
    classes: Vec<L>,
    params: ProximityForestValidParams<F, L>,
}

impl<F, L> Fit<F, L, Error> for ProximityForestValidParams<F, L>
where
    F: Float + Serialize + DeserializeOwned,
    L: Label + Serialize + DeserializeOwned,
{
    type Object = ProximityForest<F, L>;

    fn fit(&self, dataset: &Dataset<F, L>) -> Result<Self::Object, Error> {
        if dataset.nsamples() == 0 {
            return Err(proxima::Error::EmptyDataset.into());
        }
        let start = Instant::now();
        let classes = dataset.labels();

        // elapsed time of an interrupted run carries over into this run's
        // train contract
        let (mut trees, mut rng, carried) = match self.checkpoint_path() {
            Some(path) if path.exists() => {
                let restored = checkpoint::load::<Vec<ProximityTree<F, L>>>(path)?;
                restored.validate(dataset)?;
                info!(
                    path = %path.display(),
                    trees = restored.state.len(),
                    "resuming from checkpoint"
                );
                (restored.state, restored.rng, restored.elapsed)
            }
            _ => (
                Vec::new(),
                ChaCha8Rng::seed_from_u64(self.seed()),
                Duration::ZERO,
            ),
        };
        trees.truncate(self.trees());

        let mut longest_stage = Duration::ZERO;
        let mut last_saved = Instant::now();
        let mut model_size = std::mem::size_of::<ProximityForest<F, L>>()
            + trees.iter().map(|t| t.approx_size()).sum::<usize>();
        while trees.len() < self.trees() {
            if let Some(limit) = self.train_time_limit() {
                if carried + start.elapsed() + longest_stage >= limit {
                    break;
                }
            }
            if let Some(limit) = self.memory_limit() {
                if model_size >= limit {
                    break;
                }
            }

            // drawn before building, so the stream position depends only on
            // how many trees exist
            let seed = rng.gen::<u64>();
            let stage = Instant::now();
            let tree = self
                .tree()
                .clone()
                .with_seed(seed)
                .without_checkpoint()
                .fit(dataset)?;
            let took = stage.elapsed();
            longest_stage = longest_stage.max(took);
            debug!(
                tree = trees.len(),
                nodes = tree.n_nodes(),
                elapsed_ms = took.as_millis() as u64,
                "tree grown"
            );
            model_size += tree.approx_size();
            trees.push(tree);

            if let Some(path) = self.checkpoint_path() {
                let done = trees.len() == self.trees();
                if done || last_saved.elapsed() >= self.checkpoint_interval() {
                    checkpoint::save(path, dataset, carried + start.elapsed(), &rng, &trees)?;
                    last_saved = Instant::now();
                }
            }
        }

        info!(
            trees = trees.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "proximity forest ready"
        );
        Ok(ProximityForest {
            trees,
            classes,
            params: self.clone(),
        })
    }
}

impl<F: Float, L: Label> ProximityForest<F, L> {
    /// The class labels seen during training, sorted.
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    pub fn ntrees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[ProximityTree<F, L>] {
        &self.trees
    }

    /// Class probabilities for every row of `records`.
    pub fn predict_proba(&self, records: &Array2<F>) -> Array2<f64> {
        let mut out = Array2::zeros((records.nrows(), self.classes.len()));
        for (row, series) in records.rows().into_iter().enumerate() {
            let dist = self.distribution_for(series);
            for (slot, p) in out.row_mut(row).iter_mut().zip(dist) {
                *slot = p;
            }
        }
        out
    }

    /// Normalized vote distribution for one series.
    ///
    /// One-hot majority votes by default, summed tree distributions when
    /// configured. Vote ties break deterministically toward the
    /// lowest-indexed class, keeping prediction free of generator state. The
    /// first tree always votes; once the per-instance test contract leaves no
    /// room for another vote, collection stops. A forest whose train contract
    /// expired before the first tree answers uniformly.
    fn distribution_for(&self, series: ArrayView1<F>) -> Vec<f64> {
        let n_classes = self.classes.len();
        if self.trees.is_empty() {
            return vec![1.0 / n_classes as f64; n_classes];
        }

        let start = Instant::now();
        let mut longest_vote = Duration::ZERO;
        let mut votes = vec![0.0; n_classes];
        for (i, tree) in self.trees.iter().enumerate() {
            if i > 0 {
                if let Some(limit) = self.params.test_time_limit() {
                    if start.elapsed() + longest_vote >= limit {
                        break;
                    }
                }
            }
            let vote_start = Instant::now();
            let dist = tree.distribution_for(series);
            longest_vote = longest_vote.max(vote_start.elapsed());
            if self.params.use_distribution_in_voting() {
                for (vote, p) in votes.iter_mut().zip(dist) {
                    *vote += p;
                }
            } else {
                votes[argmax(&dist)] += 1.0;
            }
        }

        let total: f64 = votes.iter().sum();
        if total > 0.0 {
            for vote in votes.iter_mut() {
                *vote /= total;
            }
        }
        votes
    }
}

impl<F: Float, L: Label> PredictInplace<Array2<F>, Array1<L>> for ProximityForest<F, L> {
    fn predict_inplace(&self, records: &Array2<F>, targets: &mut Array1<L>) {
        assert_eq!(
            records.nrows(),
            targets.len(),
            "number of records and targets must match"
        );
        for (series, target) in records.rows().into_iter().zip(targets.iter_mut()) {
            let dist = self.distribution_for(series);
            *target = self.classes[argmax(&dist)].clone();
        }
    }

    fn default_target(&self, records: &Array2<F>) -> Array1<L> {
        Array1::from_elem(records.nrows(), self.classes[0].clone())
    }
}
