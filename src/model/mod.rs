//! Classifier adapter and the supervised-learning seam
//!
//! The pipeline talks to the learning component through the narrow
//! [`Classifier`] trait so tests can substitute a deterministic stub and
//! verify the feature/label plumbing independent of any algorithm. The
//! default implementation is a seeded bagged forest of gini trees.

mod adapter;
mod forest;
mod metrics;
mod scaler;
mod split;
mod tree;

pub use adapter::{ClassifierAdapter, Evaluation};
pub use forest::ForestClassifier;
pub use metrics::ClassificationReport;
pub use scaler::StandardScaler;
pub use split::stratified_split;
pub use tree::GiniTree;

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Narrow interface to a binary classifier.
///
/// Labels and predictions are 0.0 / 1.0.
pub trait Classifier: Send {
    /// Fit the classifier to training data.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict a binary label per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}
