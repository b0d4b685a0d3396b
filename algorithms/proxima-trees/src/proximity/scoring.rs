//! Partition quality scores.
//!
//! A split candidate partitions the instances at a node into one group per
//! exemplar. The scorer turns the class counts of the parent and of the
//! groups into a single number; candidates with higher scores win.

use serde::{Deserialize, Serialize};

/// How a candidate partition is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionScorer {
    /// Drop in Gini impurity, weighted by group size.
    GiniGain,
    /// Drop in entropy, weighted by group size.
    InfoGain,
    /// Chi-squared statistic of the observed group class counts against the
    /// counts expected under the parent class distribution.
    ChiSquared,
    /// Negated weighted entropy of the groups. Orders candidates like
    /// [`InfoGain`](PartitionScorer::InfoGain) but skips the constant parent
    /// term.
    Entropy,
}

impl Default for PartitionScorer {
    fn default() -> Self {
        PartitionScorer::GiniGain
    }
}

impl PartitionScorer {
    /// Score a partition given per-class counts of the parent node and of
    /// each child group.
    pub fn score(&self, parent: &[usize], children: &[Vec<usize>]) -> f64 {
        let parent_total: usize = parent.iter().sum();
        if parent_total == 0 {
            return 0.0;
        }
        match self {
            PartitionScorer::GiniGain => gain(parent, parent_total, children, gini),
            PartitionScorer::InfoGain => gain(parent, parent_total, children, entropy),
            PartitionScorer::Entropy => -weighted(parent_total, children, entropy),
            PartitionScorer::ChiSquared => chi_squared(parent, parent_total, children),
        }
    }
}

fn gain(
    parent: &[usize],
    parent_total: usize,
    children: &[Vec<usize>],
    impurity: fn(&[usize]) -> f64,
) -> f64 {
    impurity(parent) - weighted(parent_total, children, impurity)
}

fn weighted(parent_total: usize, children: &[Vec<usize>], impurity: fn(&[usize]) -> f64) -> f64 {
    children
        .iter()
        .map(|child| {
            let total: usize = child.iter().sum();
            total as f64 / parent_total as f64 * impurity(child)
        })
        .sum()
}

fn gini(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

fn entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p.log2()
        })
        .sum::<f64>()
}

fn chi_squared(parent: &[usize], parent_total: usize, children: &[Vec<usize>]) -> f64 {
    let mut stat = 0.0;
    for child in children {
        let child_total: usize = child.iter().sum();
        for (&observed, &in_parent) in child.iter().zip(parent.iter()) {
            let expected = in_parent as f64 / parent_total as f64 * child_total as f64;
            if expected > 0.0 {
                let diff = observed as f64 - expected;
                stat += diff * diff / expected;
            }
        }
    }
    stat
}
