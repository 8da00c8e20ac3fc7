//! Binary classification tree with gini splits

use crate::error::{FailcastError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Tree node: either a leaf carrying the majority class, or a split.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        class: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A single gini-impurity decision tree over binary labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiniTree {
    root: Option<Node>,
    /// Maximum depth; unlimited when `None`
    pub max_depth: Option<usize>,
    /// Minimum samples required to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples allowed in a leaf
    pub min_samples_leaf: usize,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for GiniTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GiniTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Fit the tree to binary-labeled training data.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(FailcastError::ShapeError {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(FailcastError::DataError(
                "cannot fit tree on empty data".to_string(),
            ));
        }

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_node(x, y, &indices, 0, &mut importances));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
    ) -> Node {
        let n_samples = indices.len();
        let positives = count_positives(y, indices);

        let pure = positives == 0 || positives == n_samples;
        let should_stop = pure
            || n_samples < self.min_samples_split
            || self.max_depth.map_or(false, |d| depth >= d);

        if should_stop {
            return self.leaf(positives, n_samples);
        }

        let Some(best) = self.find_best_split(x, y, indices) else {
            return self.leaf(positives, n_samples);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

        if left_indices.len() < self.min_samples_leaf
            || right_indices.len() < self.min_samples_leaf
        {
            return self.leaf(positives, n_samples);
        }

        importances[best.feature_idx] += n_samples as f64 * best.gain;

        let left = Box::new(self.build_node(x, y, &left_indices, depth + 1, importances));
        let right = Box::new(self.build_node(x, y, &right_indices, depth + 1, importances));

        Node::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
        }
    }

    fn leaf(&self, positives: usize, n_samples: usize) -> Node {
        Node::Leaf {
            class: if positives * 2 > n_samples { 1.0 } else { 0.0 },
            n_samples,
        }
    }

    /// Scan every feature for the midpoint threshold with the largest gini
    /// gain. Left/right class counts are accumulated per candidate without
    /// materializing the partitions.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<SplitCandidate> {
        let n = indices.len() as f64;
        let total_pos = count_positives(y, indices);
        let parent_gini = binary_gini(total_pos, indices.len());

        let mut best: Option<SplitCandidate> = None;

        for feature_idx in 0..x.ncols() {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let mut left_count = 0usize;
                let mut left_pos = 0usize;
                for &idx in indices {
                    if x[[idx, feature_idx]] <= threshold {
                        left_count += 1;
                        if y[idx] > 0.5 {
                            left_pos += 1;
                        }
                    }
                }
                let right_count = indices.len() - left_count;
                let right_pos = total_pos - left_pos;

                if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left_count as f64 * binary_gini(left_pos, left_count)
                    + right_count as f64 * binary_gini(right_pos, right_count))
                    / n;
                let gain = parent_gini - weighted;

                if gain > 0.0 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Predict a binary label per row.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(FailcastError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| predict_row(root, &x.row(i).to_vec()))
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Normalized impurity-decrease importances, available after fitting.
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Depth of the fitted tree (0 when unfitted).
    pub fn depth(&self) -> usize {
        fn node_depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

fn count_positives(y: &Array1<f64>, indices: &[usize]) -> usize {
    indices.iter().filter(|&&i| y[i] > 0.5).count()
}

/// Gini impurity of a binary class distribution.
fn binary_gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

fn predict_row(node: &Node, row: &[f64]) -> f64 {
    match node {
        Node::Leaf { class, .. } => *class,
        Node::Split {
            feature_idx,
            threshold,
            left,
            right,
        } => {
            if row[*feature_idx] <= *threshold {
                predict_row(left, row)
            } else {
                predict_row(right, row)
            }
        }
    }
}
