//! Classification report: per-class precision, recall and F1

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for one label class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Precision/recall/F1 report keyed by the two label classes, plus overall
/// accuracy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Metrics for the negative ("safe") class.
    pub safe: ClassMetrics,
    /// Metrics for the positive ("fails soon") class.
    pub fails_soon: ClassMetrics,
    pub accuracy: f64,
    pub n_samples: usize,
}

impl ClassificationReport {
    /// Compute the report from true and predicted binary labels.
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut tn = 0usize;
        let mut fn_ = 0usize;

        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        let n_samples = y_true.len();
        let accuracy = if n_samples > 0 {
            (tp + tn) as f64 / n_samples as f64
        } else {
            0.0
        };

        // Positive class: predicted-positive precision, actual-positive recall.
        let fails_soon = Self::class_metrics(tp, fp, fn_, tp + fn_);
        // Negative class: the same counts with roles swapped.
        let safe = Self::class_metrics(tn, fn_, fp, tn + fp);

        Self {
            safe,
            fails_soon,
            accuracy,
            n_samples,
        }
    }

    fn class_metrics(tp: usize, fp: usize, fn_: usize, support: usize) -> ClassMetrics {
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ClassMetrics {
            precision,
            recall,
            f1_score,
            support,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (name, m) in [("safe (0)", &self.safe), ("fails soon (1)", &self.fails_soon)] {
            writeln!(
                f,
                "{:<20} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                name, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "{:<20} {:>43.4} {:>10}",
            "accuracy", self.accuracy, self.n_samples
        )
    }
}
