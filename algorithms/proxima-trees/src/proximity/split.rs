//! Split candidates: a sampled measure plus one exemplar per class.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

use proxima::{Dataset, Float, Label};
use proxima_distances::{Distance, ElasticMeasure, ParamSpace};

use super::hyperparams::ProximityTreeValidParams;

/// One reference series of a split, standing for its class.
///
/// The series is stored by value so a fitted model answers queries without
/// the training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exemplar<F> {
    pub(crate) row: usize,
    pub(crate) class_index: usize,
    pub(crate) series: Array1<F>,
}

impl<F> Exemplar<F> {
    /// Index of the exemplar's class in the sorted class list.
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn series(&self) -> &Array1<F> {
        &self.series
    }
}

/// A fitted split: instances follow the branch of their nearest exemplar
/// under the sampled measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitModel<F> {
    pub(crate) measure: ElasticMeasure<F>,
    pub(crate) exemplars: Vec<Exemplar<F>>,
    pub(crate) score: f64,
}

impl<F: Float> SplitModel<F> {
    pub fn measure(&self) -> &ElasticMeasure<F> {
        &self.measure
    }

    pub fn exemplars(&self) -> &[Exemplar<F>] {
        &self.exemplars
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn n_branches(&self) -> usize {
        self.exemplars.len()
    }

    /// Branch of the nearest exemplar, first one winning ties. Used at
    /// prediction time, where tie-breaking must not mutate any state.
    pub(crate) fn branch_for(&self, series: ArrayView1<F>, early_abandon: bool) -> usize {
        let mut best = 0;
        let mut best_d = F::infinity();
        for (branch, exemplar) in self.exemplars.iter().enumerate() {
            let limit = if early_abandon { best_d } else { F::infinity() };
            let d = self.measure.bounded(series, exemplar.series.view(), limit);
            if d < best_d {
                best_d = d;
                best = branch;
            }
        }
        best
    }

    /// Class distribution answered for instances that end up in `branch`:
    /// all mass on the branch exemplar's class.
    pub(crate) fn branch_distribution(&self, branch: usize, n_classes: usize) -> Vec<f64> {
        let mut dist = vec![0.0; n_classes];
        dist[self.exemplars[branch].class_index] = 1.0;
        dist
    }

    /// Rough in-memory size, for the advisory memory contract.
    pub(crate) fn approx_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .exemplars
                .iter()
                .map(|e| {
                    std::mem::size_of::<Exemplar<F>>()
                        + e.series.len() * std::mem::size_of::<F>()
                })
                .sum::<usize>()
    }
}

/// Per-class counts of `rows`, indexed like `classes`.
pub(crate) fn count_classes<F: Float, L: Label>(
    dataset: &Dataset<F, L>,
    rows: &[usize],
    classes: &[L],
) -> Vec<usize> {
    let mut counts = vec![0; classes.len()];
    for &row in rows {
        if let Ok(class) = classes.binary_search(&dataset.targets()[row]) {
            counts[class] += 1;
        }
    }
    counts
}

/// Evaluate the configured number of candidates over `rows` and return the
/// best split together with its partition, one row group per branch.
pub(crate) fn grow_split<F: Float, L: Label, R: Rng>(
    dataset: &Dataset<F, L>,
    rows: &[usize],
    classes: &[L],
    params: &ProximityTreeValidParams<F, L>,
    rng: &mut R,
) -> (SplitModel<F>, Vec<Vec<usize>>) {
    let n_candidates = if params.random_candidates() {
        rng.gen_range(1..=params.candidates())
    } else {
        params.candidates()
    };

    let parent_counts = count_classes(dataset, rows, classes);
    let mut best: Vec<(SplitModel<F>, Vec<Vec<usize>>)> = Vec::new();
    let mut best_score = f64::NEG_INFINITY;

    for _ in 0..n_candidates {
        let family = params.families()[rng.gen_range(0..params.families().len())];
        let space = ParamSpace::from_data(family, dataset.records().view(), rows);
        let measure = space.sample(rng);

        // one exemplar per class present at the node, in label order
        let mut groups: BTreeMap<&L, Vec<usize>> = BTreeMap::new();
        for &row in rows {
            groups.entry(&dataset.targets()[row]).or_default().push(row);
        }
        let exemplars: Vec<Exemplar<F>> = groups
            .iter()
            .map(|(label, members)| {
                let row = members[rng.gen_range(0..members.len())];
                let class_index = classes
                    .binary_search(label)
                    .expect("node labels come from the training data");
                Exemplar {
                    row,
                    class_index,
                    series: dataset.record(row).to_owned(),
                }
            })
            .collect();

        let partition = partition_rows(dataset, rows, &measure, &exemplars, params, rng);

        let child_counts: Vec<Vec<usize>> = partition
            .iter()
            .map(|child| count_classes(dataset, child, classes))
            .collect();
        let score = params.scorer().score(&parent_counts, &child_counts);

        if score > best_score {
            best_score = score;
            best.clear();
            best.push((
                SplitModel {
                    measure,
                    exemplars,
                    score,
                },
                partition,
            ));
        } else if score == best_score && params.random_tie_break_candidates() {
            best.push((
                SplitModel {
                    measure,
                    exemplars,
                    score,
                },
                partition,
            ));
        }
    }

    // the draw happens even for a single survivor, keeping the generator
    // stream independent of the tie-break outcome
    let pick = rng.gen_range(0..best.len());
    best.swap_remove(pick)
}

fn partition_rows<F: Float, L: Label, R: Rng>(
    dataset: &Dataset<F, L>,
    rows: &[usize],
    measure: &ElasticMeasure<F>,
    exemplars: &[Exemplar<F>],
    params: &ProximityTreeValidParams<F, L>,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let mut partition: Vec<Vec<usize>> = vec![Vec::new(); exemplars.len()];
    for &row in rows {
        // an exemplar claims its own row without a distance call
        if let Some(own) = exemplars.iter().position(|e| e.row == row) {
            partition[own].push(row);
            continue;
        }

        let series = dataset.record(row);
        let mut nearest: Vec<usize> = Vec::new();
        let mut best_d = F::infinity();
        for (branch, exemplar) in exemplars.iter().enumerate() {
            let limit = if params.early_abandon() {
                best_d
            } else {
                F::infinity()
            };
            let d = measure.bounded(series, exemplar.series.view(), limit);
            if d < best_d {
                best_d = d;
                nearest.clear();
                nearest.push(branch);
            } else if d == best_d && d < F::infinity() {
                nearest.push(branch);
            }
        }
        let branch = if params.random_tie_break_distances() {
            nearest[rng.gen_range(0..nearest.len())]
        } else {
            nearest[0]
        };
        partition[branch].push(row);
    }
    partition
}
