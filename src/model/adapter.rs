//! Classifier adapter: split, scale, fit, predict
//!
//! The adapter owns the boundary between the assembled feature/label table
//! and the learning component: it extracts the feature matrix, performs a
//! seeded stratified split, fits the scaler on the training partition only,
//! and hands scaled matrices to whatever [`Classifier`] it is given.

use super::metrics::ClassificationReport;
use super::scaler::StandardScaler;
use super::split::stratified_split;
use super::Classifier;
use crate::config::{PipelineConfig, LABEL_COLUMN};
use crate::error::{FailcastError, Result};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use tracing::info;

/// Held-out evaluation produced by [`ClassifierAdapter::evaluate`].
///
/// `test_indices[i]` is the assembled-table row that `predictions[i]`
/// belongs to, so predictions can be joined back to source units/cycles.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub test_indices: Vec<usize>,
    pub predictions: Array1<f64>,
    pub report: ClassificationReport,
}

/// Adapter wiring the assembled table to a [`Classifier`].
#[derive(Debug, Clone)]
pub struct ClassifierAdapter {
    feature_columns: Vec<String>,
    test_fraction: f64,
    random_seed: u64,
}

impl ClassifierAdapter {
    /// Build the adapter from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            feature_columns: config.feature_columns(),
            test_fraction: config.test_fraction,
            random_seed: config.random_seed,
        }
    }

    /// Columns the classifier consumes, in training order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Split, scale, fit and evaluate on the held-out partition.
    ///
    /// Scaling parameters are derived from the training partition alone and
    /// applied to both partitions.
    pub fn evaluate(
        &self,
        frame: &DataFrame,
        classifier: &mut dyn Classifier,
    ) -> Result<Evaluation> {
        let x = columns_to_array2(frame, &self.feature_columns)?;
        let y = label_vector(frame)?;

        let (train_indices, test_indices) =
            stratified_split(&y, self.test_fraction, self.random_seed)?;

        let x_train = x.select(Axis(0), &train_indices);
        let x_test = x.select(Axis(0), &test_indices);
        let y_train: Array1<f64> =
            Array1::from_vec(train_indices.iter().map(|&i| y[i]).collect());
        let y_test: Array1<f64> =
            Array1::from_vec(test_indices.iter().map(|&i| y[i]).collect());

        let mut scaler = StandardScaler::new();
        let x_train_scaled = scaler.fit_transform(&x_train)?;
        let x_test_scaled = scaler.transform(&x_test)?;

        info!(
            train_rows = train_indices.len(),
            test_rows = test_indices.len(),
            features = self.feature_columns.len(),
            "fitting classifier"
        );

        classifier.fit(&x_train_scaled, &y_train)?;
        let predictions = classifier.predict(&x_test_scaled)?;

        if predictions.len() != test_indices.len() {
            return Err(FailcastError::ShapeError {
                expected: format!("{} predictions", test_indices.len()),
                actual: format!("{} predictions", predictions.len()),
            });
        }

        let report = ClassificationReport::from_predictions(&y_test, &predictions);

        Ok(Evaluation {
            test_indices,
            predictions,
            report,
        })
    }
}

/// Extract named columns into a row-major matrix.
pub(crate) fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| FailcastError::DataError(format!("column not found: {col_name}")))?
                .cast(&DataType::Float64)
                .map_err(|e| FailcastError::DataError(format!("{col_name}: {e}")))?;
            series
                .as_materialized_series()
                .f64()
                .map_err(|e| FailcastError::DataError(format!("{col_name}: {e}")))?
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| {
                        FailcastError::DataError(format!("{col_name}: null value"))
                    })
                })
                .collect()
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

fn label_vector(df: &DataFrame) -> Result<Array1<f64>> {
    let values = columns_to_array2(df, &[LABEL_COLUMN.to_string()])?;
    Ok(values.column(0).to_owned())
}
