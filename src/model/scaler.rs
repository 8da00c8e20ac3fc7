//! Standard feature scaling
//!
//! Z-score scaling fit on the training partition only, then applied to both
//! partitions. Scaling parameters must never be derived from held-out data.

use crate::error::{FailcastError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column (x - mean) / std scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create an unfitted scaler.
    pub fn new() -> Self {
        Self {
            means: Vec::new(),
            stds: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit per-column mean and sample standard deviation.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n_rows = x.nrows();
        if n_rows == 0 {
            return Err(FailcastError::DataError(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        self.means.clear();
        self.stds.clear();

        for col in x.axis_iter(Axis(1)) {
            let mean = col.sum() / n_rows as f64;
            let std = if n_rows > 1 {
                let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / (n_rows - 1) as f64;
                var.sqrt()
            } else {
                0.0
            };
            self.means.push(mean);
            // Constant columns scale by 1 so they map to all zeros.
            self.stds.push(if std == 0.0 { 1.0 } else { std });
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale a matrix with the fitted parameters.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(FailcastError::ModelNotFitted);
        }
        if x.ncols() != self.means.len() {
            return Err(FailcastError::ShapeError {
                expected: format!("{} columns", self.means.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        Ok(Array2::from_shape_fn(x.dim(), |(r, c)| {
            (x[[r, c]] - self.means[c]) / self.stds[c]
        }))
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}
