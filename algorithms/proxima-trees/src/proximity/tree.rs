//! Single proximity tree.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use proxima::{Dataset, Fit, Float, Label, PredictInplace};

use super::checkpoint;
use super::hyperparams::ProximityTreeValidParams;
use super::split::{count_classes, grow_split, SplitModel};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TreeNode<F> {
    split: Option<SplitModel<F>>,
    children: Vec<usize>,
    parent: Option<usize>,
    branch: usize,
    depth: usize,
    class_counts: Vec<usize>,
    // only nonempty while the node waits in the build queue
    rows: Vec<usize>,
}

#[derive(Serialize)]
struct TreeBuildRef<'a, F> {
    nodes: &'a [TreeNode<F>],
    queue: &'a VecDeque<usize>,
}

#[derive(Deserialize)]
struct TreeBuildState<F> {
    nodes: Vec<TreeNode<F>>,
    queue: VecDeque<usize>,
}

/// A single proximity tree classifier.
///
/// Grown by fitting [`ProximityTreeParams`](super::ProximityTreeParams).
/// Nodes live in an arena indexed by position, with the root at index zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityTree<F, L> {
    nodes: Vec<TreeNode<F>>,
    classes: Vec<L>,
    prior: Vec<f64>,
    params: ProximityTreeValidParams<F, L>,
}

pub(crate) fn is_pure(counts: &[usize]) -> bool {
    counts.iter().filter(|&&c| c > 0).count() <= 1
}

/// First index holding the maximum; ties go to the lowest-indexed class.
pub(crate) fn argmax(dist: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in dist.iter().enumerate() {
        if v > dist[best] {
            best = i;
        }
    }
    best
}

impl<F, L> Fit<F, L, Error> for ProximityTreeValidParams<F, L>
where
    F: Float + Serialize + DeserializeOwned,
    L: Label,
{
    type Object = ProximityTree<F, L>;

    fn fit(&self, dataset: &Dataset<F, L>) -> Result<Self::Object, Error> {
        if dataset.nsamples() == 0 {
            return Err(proxima::Error::EmptyDataset.into());
        }
        let start = Instant::now();
        let classes = dataset.labels();

        let all_rows: Vec<usize> = (0..dataset.nsamples()).collect();
        let root_counts = count_classes(dataset, &all_rows, &classes);
        let prior: Vec<f64> = root_counts
            .iter()
            .map(|&c| c as f64 / all_rows.len() as f64)
            .collect();

        // elapsed time of an interrupted build carries over into this run's
        // train contract
        let (mut nodes, mut queue, mut rng, carried) = match self.checkpoint_path() {
            Some(path) if path.exists() => {
                let restored = checkpoint::load::<TreeBuildState<F>>(path)?;
                restored.validate(dataset)?;
                debug!(
                    path = %path.display(),
                    nodes = restored.state.nodes.len(),
                    pending = restored.state.queue.len(),
                    "resuming tree from checkpoint"
                );
                (
                    restored.state.nodes,
                    restored.state.queue,
                    restored.rng,
                    restored.elapsed,
                )
            }
            _ => {
                let nodes = vec![TreeNode {
                    split: None,
                    children: Vec::new(),
                    parent: None,
                    branch: 0,
                    depth: 0,
                    class_counts: root_counts,
                    rows: all_rows,
                }];
                let mut queue = VecDeque::new();
                if !is_pure(&nodes[0].class_counts) {
                    queue.push_back(0);
                }
                (
                    nodes,
                    queue,
                    ChaCha8Rng::seed_from_u64(self.seed()),
                    Duration::ZERO,
                )
            }
        };

        // worst observed per-instance node build time, for estimating
        // whether the next node still fits the train contract
        let mut per_instance_secs = 0f64;
        let mut model_size = std::mem::size_of::<ProximityTree<F, L>>();
        let mut last_saved = Instant::now();

        loop {
            let node = if self.breadth_first() {
                queue.pop_front()
            } else {
                queue.pop_back()
            };
            let node = match node {
                Some(node) => node,
                None => break,
            };

            let out_of_budget = self.train_time_limit().map_or(false, |limit| {
                let estimate =
                    Duration::from_secs_f64(per_instance_secs * nodes[node].rows.len() as f64);
                carried + start.elapsed() + estimate >= limit
            }) || self.memory_limit().map_or(false, |limit| model_size >= limit);
            if out_of_budget {
                // goes back so a resumed build picks it up first
                if self.breadth_first() {
                    queue.push_front(node);
                } else {
                    queue.push_back(node);
                }
                break;
            }

            let node_start = Instant::now();
            let rows = std::mem::take(&mut nodes[node].rows);
            let (split, partition) = grow_split(dataset, &rows, &classes, self, &mut rng);

            let parent_depth = nodes[node].depth;
            let mut children = Vec::with_capacity(partition.len());
            for (branch, child_rows) in partition.into_iter().enumerate() {
                let child_counts = count_classes(dataset, &child_rows, &classes);
                let depth = parent_depth + 1;
                let splittable = !child_rows.is_empty()
                    && !is_pure(&child_counts)
                    // a split that moved nothing cannot make progress
                    && child_rows.len() < rows.len()
                    && self.max_height().map_or(true, |h| depth < h);
                let child = nodes.len();
                model_size += std::mem::size_of::<TreeNode<F>>()
                    + child_counts.len() * std::mem::size_of::<usize>();
                nodes.push(TreeNode {
                    split: None,
                    children: Vec::new(),
                    parent: Some(node),
                    branch,
                    depth,
                    class_counts: child_counts,
                    rows: if splittable { child_rows } else { Vec::new() },
                });
                if splittable {
                    queue.push_back(child);
                }
                children.push(child);
            }
            model_size += split.approx_size();
            nodes[node].children = children;
            nodes[node].split = Some(split);

            per_instance_secs =
                per_instance_secs.max(node_start.elapsed().as_secs_f64() / rows.len() as f64);

            if let Some(path) = self.checkpoint_path() {
                if last_saved.elapsed() >= self.checkpoint_interval() {
                    let state = TreeBuildRef {
                        nodes: &nodes,
                        queue: &queue,
                    };
                    checkpoint::save(path, dataset, carried + start.elapsed(), &rng, &state)?;
                    last_saved = Instant::now();
                }
            }
        }

        // saved before the pending rows are dropped; a build the contract cut
        // off resumes from here with a larger budget
        if let Some(path) = self.checkpoint_path() {
            let state = TreeBuildRef {
                nodes: &nodes,
                queue: &queue,
            };
            checkpoint::save(path, dataset, carried + start.elapsed(), &rng, &state)?;
        }

        // rows of nodes the contract cut off are no longer needed
        for node in nodes.iter_mut() {
            node.rows = Vec::new();
        }

        debug!(
            nodes = nodes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "proximity tree grown"
        );

        Ok(ProximityTree {
            nodes,
            classes,
            prior,
            params: self.clone(),
        })
    }
}

impl<F: Float, L: Label> ProximityTree<F, L> {
    /// The class labels seen during training, sorted.
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node level; a root-only tree has height zero.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Rough in-memory size, for the advisory memory contract.
    pub fn approx_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .nodes
                .iter()
                .map(|n| {
                    std::mem::size_of::<TreeNode<F>>()
                        + n.class_counts.len() * std::mem::size_of::<usize>()
                        + n.split.as_ref().map_or(0, |s| s.approx_size())
                })
                .sum::<usize>()
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

    /// Class distribution for one series.
    ///
    /// Descends to a leaf and answers with the distribution of the last
    /// split taken: all mass on the class of the exemplar whose branch the
    /// series followed. A tree whose root was never split answers the
    /// training prior. When the test time contract runs out mid-descent the
    /// answer comes from the deepest split reached.
    pub(crate) fn distribution_for(&self, series: ArrayView1<F>) -> Vec<f64> {
        let deadline = self
            .params
            .test_time_limit()
            .map(|limit| Instant::now() + limit);

        let mut node = 0;
        loop {
            let current = &self.nodes[node];
            if current.children.is_empty() {
                break;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }
            let split = match &current.split {
                Some(split) => split,
                None => break,
            };
            let branch = split.branch_for(series, self.params.early_abandon());
            node = current.children[branch];
        }

        let reached = &self.nodes[node];
        match reached.parent {
            Some(parent) => match &self.nodes[parent].split {
                Some(split) => split.branch_distribution(reached.branch, self.classes.len()),
                None => self.prior.clone(),
            },
            None => self.prior.clone(),
        }
    }
}

impl<F: Float, L: Label> PredictInplace<Array2<F>, Array1<L>> for ProximityTree<F, L> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use proxima::Predict;
    use proxima_distances::MeasureFamily;

    fn separable_dataset() -> Dataset<f64, usize> {
        let records = array![
            [0.0, 0.1, 0.0, 0.1],
            [0.1, 0.0, 0.1, 0.0],
            [0.2, 0.1, 0.2, 0.1],
            [0.0, 0.2, 0.0, 0.2],
            [5.0, 5.1, 5.0, 5.1],
            [5.1, 5.0, 5.1, 5.0],
            [5.2, 5.1, 5.2, 5.1],
            [5.0, 5.2, 5.0, 5.2],
        ];
        let targets = array![0usize, 0, 0, 0, 1, 1, 1, 1];
        Dataset::new(records, targets).unwrap()
    }

    #[test]
    fn stump_separates_two_classes() {
        let dataset = separable_dataset();
        let tree = ProximityTree::params(42)
            .candidates(1)
            .families(vec![MeasureFamily::Euclidean])
            .max_height(1)
            .fit(&dataset)
            .unwrap();

        assert_eq!(tree.height(), 1);
        assert_eq!(tree.n_nodes(), 3);
        let predicted: Array1<usize> = tree.predict(dataset.records());
        assert_eq!(&predicted, dataset.targets());
    }

    #[test]
    fn grows_until_pure_and_classifies_training_data() {
        let dataset = separable_dataset();
        let tree = ProximityTree::params(7).fit(&dataset).unwrap();
        let predicted: Array1<usize> = tree.predict(dataset.records());
        assert_eq!(&predicted, dataset.targets());
    }

    #[test]
    fn single_class_dataset_yields_root_leaf() {
        let records = array![[1.0, 2.0], [1.1, 2.1], [0.9, 1.9]];
        let targets = array![3usize, 3, 3];
        let dataset = Dataset::new(records, targets).unwrap();
        let tree = ProximityTree::params(1).fit(&dataset).unwrap();

        assert_eq!(tree.n_nodes(), 1);
        let proba = tree.predict_proba(dataset.records());
        for row in proba.rows() {
            assert_abs_diff_eq!(row[0], 1.0);
        }
        let predicted: Array1<usize> = tree.predict(dataset.records());
        assert!(predicted.iter().all(|&l| l == 3));
    }

    #[test]
    fn argmax_ties_go_to_the_first_class() {
        assert_eq!(argmax(&[0.25, 0.25, 0.5]), 2);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
    }

    #[test]
    fn distributions_are_normalized() {
        let dataset = separable_dataset();
        let tree = ProximityTree::params(13).fit(&dataset).unwrap();
        let proba = tree.predict_proba(dataset.records());
        for row in proba.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn same_seed_grows_identical_trees() {
        let dataset = separable_dataset();
        let a = ProximityTree::<f64, usize>::params(99).fit(&dataset).unwrap();
        let b = ProximityTree::<f64, usize>::params(99).fit(&dataset).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_train_budget_leaves_the_root_unsplit() {
        let dataset = separable_dataset();
        let tree = ProximityTree::params(5)
            .train_time_limit(Duration::from_secs(0))
            .fit(&dataset)
            .unwrap();

        assert_eq!(tree.n_nodes(), 1);
        let proba = tree.predict_proba(dataset.records());
        for row in proba.rows() {
            assert_abs_diff_eq!(row[0], 0.5);
            assert_abs_diff_eq!(row[1], 0.5);
        }
    }

    #[test]
    fn tiny_memory_budget_stops_growth() {
        let dataset = separable_dataset();
        let bounded = ProximityTree::<f64, usize>::params(5)
            .memory_limit(1)
            .fit(&dataset)
            .unwrap();
        let free = ProximityTree::<f64, usize>::params(5).fit(&dataset).unwrap();
        assert!(bounded.n_nodes() <= free.n_nodes());
        assert_eq!(bounded.n_nodes(), 1);
    }

    #[test]
    fn interrupted_build_resumes_to_the_same_tree() {
        let dataset = separable_dataset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.checkpoint");

        let uninterrupted = ProximityTree::<f64, usize>::params(77).fit(&dataset).unwrap();

        let stump = ProximityTree::<f64, usize>::params(77)
            .train_time_limit(Duration::from_secs(0))
            .checkpoint(&path, Duration::from_secs(0))
            .fit(&dataset)
            .unwrap();
        assert_eq!(stump.n_nodes(), 1);

        let resumed = ProximityTree::<f64, usize>::params(77)
            .checkpoint(&path, Duration::from_secs(0))
            .fit(&dataset)
            .unwrap();
        assert_eq!(resumed.nodes, uninterrupted.nodes);

        // a completed checkpoint resumes to itself
        let again = ProximityTree::<f64, usize>::params(77)
            .checkpoint(&path, Duration::from_secs(0))
            .fit(&dataset)
            .unwrap();
        assert_eq!(again.nodes, resumed.nodes);

        let a: Array1<usize> = uninterrupted.predict(dataset.records());
        let b: Array1<usize> = resumed.predict(dataset.records());
        assert_eq!(a, b);
    }

    #[test]
    fn depth_first_growth_matches_training_labels() {
        let dataset = separable_dataset();
        let tree = ProximityTree::params(17)
            .breadth_first(false)
            .fit(&dataset)
            .unwrap();
        let predicted: Array1<usize> = tree.predict(dataset.records());
        assert_eq!(&predicted, dataset.targets());
    }
}
