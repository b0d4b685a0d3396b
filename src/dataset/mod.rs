//! Datasets
//!
//! This module implements the in-memory representation a classifier consumes:
//! a collection of equal-length real-valued series, each paired with a nominal
//! class label. Loading from any on-disk format is the caller's concern.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::iter::Sum;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::{Array1, Array2, ArrayView1, NdFloat};
use num_traits::{FromPrimitive, NumCast};

use crate::error::{Error, Result};

/// Floating point numbers
///
/// This trait bounds the element type of a series. It is implemented by `f32`
/// and `f64`.
pub trait Float:
    NdFloat + FromPrimitive + NumCast + Default + Sum<Self> + for<'a> Sum<&'a Self>
{
    /// Convert a numeric value into `Self`, panicking when the cast is not
    /// representable. Reserved for constants known to fit (parameter ladders,
    /// small integer counts).
    fn cast<V: NumCast>(v: V) -> Self {
        NumCast::from(v).unwrap()
    }
}

impl Float for f32 {}
impl Float for f64 {}

/// Class labels
///
/// Labels are nominal with a finite set of values known once the training
/// data is seen. `Ord` keeps class enumeration order deterministic, which
/// matters for reproducible random sampling.
pub trait Label: PartialEq + Eq + Hash + Ord + Clone + Debug + Send + Sync {}

impl<T: PartialEq + Eq + Hash + Ord + Clone + Debug + Send + Sync> Label for T {}

/// A collection of labeled, equal-length time series.
///
/// Records are stored row-major: one row per series, one column per time
/// point. Targets hold the class label of each row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Dataset<F, L> {
    records: Array2<F>,
    targets: Array1<L>,
}

impl<F: Float, L: Label> Dataset<F, L> {
    /// Pair records with their targets, checking that the counts line up.
    pub fn new(records: Array2<F>, targets: Array1<L>) -> Result<Self> {
        if records.nrows() != targets.len() {
            return Err(Error::SampleCountMismatch(records.nrows(), targets.len()));
        }
        Ok(Dataset { records, targets })
    }

    pub fn records(&self) -> &Array2<F> {
        &self.records
    }

    pub fn targets(&self) -> &Array1<L> {
        &self.targets
    }

    /// Number of series in the collection
    pub fn nsamples(&self) -> usize {
        self.records.nrows()
    }

    /// Number of time points per series
    pub fn series_len(&self) -> usize {
        self.records.ncols()
    }

    /// View of a single series
    pub fn record(&self, idx: usize) -> ArrayView1<'_, F> {
        self.records.row(idx)
    }

    /// The distinct class labels, in sorted order
    pub fn labels(&self) -> Vec<L> {
        let mut labels: Vec<L> = self.targets.iter().cloned().collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// How often each class label occurs, keyed in sorted label order
    pub fn label_frequencies(&self) -> BTreeMap<L, usize> {
        let mut freqs = BTreeMap::new();
        for label in self.targets.iter() {
            *freqs.entry(label.clone()).or_insert(0) += 1;
        }
        freqs
    }

    /// Row indices grouped by class label, keyed in sorted label order
    pub fn rows_by_label(&self) -> BTreeMap<L, Vec<usize>> {
        let mut groups: BTreeMap<L, Vec<usize>> = BTreeMap::new();
        for (row, label) in self.targets.iter().enumerate() {
            groups.entry(label.clone()).or_default().push(row);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn mismatched_targets_are_rejected() {
        let records = array![[1.0, 2.0], [3.0, 4.0]];
        let targets = array![0usize];
        assert!(matches!(
            Dataset::new(records, targets),
            Err(Error::SampleCountMismatch(2, 1))
        ));
    }

    #[test]
    fn labels_are_sorted_and_unique() {
        let records = array![[1.0], [2.0], [3.0], [4.0]];
        let targets = array![2usize, 0, 2, 1];
        let dataset = Dataset::new(records, targets).unwrap();
        assert_eq!(dataset.labels(), vec![0, 1, 2]);
    }

    #[test]
    fn rows_grouped_by_label() {
        let records = array![[1.0], [2.0], [3.0], [4.0]];
        let targets = array![1usize, 0, 1, 0];
        let dataset = Dataset::new(records, targets).unwrap();
        let groups = dataset.rows_by_label();
        assert_eq!(groups[&0], vec![1, 3]);
        assert_eq!(groups[&1], vec![0, 2]);
        assert_eq!(dataset.label_frequencies()[&1], 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn dataset_round_trips_through_json() {
        let records = array![[1.0, 2.0], [3.0, 4.0]];
        let targets = array![0usize, 1];
        let dataset = Dataset::new(records, targets).unwrap();
        let json = serde_json::to_string(&dataset).unwrap();
        let restored: Dataset<f64, usize> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, dataset);
    }
}
