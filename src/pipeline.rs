//! End-to-end prediction pipeline
//!
//! Wires the stages strictly one way: store → labeler → rolling features →
//! assembler → classifier adapter → writer. Single-threaded, synchronous,
//! run-once: each stage consumes an immutable input and produces a new
//! table; any failure surfaces immediately with its stage context.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::{assemble_dataset, build_rolling_features, label_readings};
use crate::model::{Classifier, ClassifierAdapter, ClassificationReport};
use crate::store::SensorStore;
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::info;

/// Summary of one pipeline run.
///
/// Holds the classification report and the full output table in memory, so
/// computed predictions survive even when the final write fails and the
/// caller wants to retry or inspect them.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub input_rows: usize,
    pub assembled_rows: usize,
    pub dropped_rows: usize,
    pub held_out_rows: usize,
    pub report: ClassificationReport,
    pub predictions: DataFrame,
}

/// The batch prediction pipeline.
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    config: PipelineConfig,
}

impl PredictionPipeline {
    /// Create a pipeline with a validated configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline and write held-out predictions to
    /// `output_path`.
    pub fn run(
        &self,
        store: &SensorStore,
        classifier: &mut dyn Classifier,
        output_path: &Path,
    ) -> Result<PipelineReport> {
        let report = self.evaluate(store, classifier)?;

        // The prediction frame is already in output order; write it as-is.
        let mut predictions = report.predictions.clone();
        crate::output::write_frame(&mut predictions, output_path)?;

        Ok(report)
    }

    /// Run every stage up to and including evaluation, keeping results in
    /// memory.
    pub fn evaluate(
        &self,
        store: &SensorStore,
        classifier: &mut dyn Classifier,
    ) -> Result<PipelineReport> {
        info!(stage = "load", store = %store.path().display(), "loading readings");
        let readings = store.load()?;
        let input_rows = readings.height();
        info!(stage = "load", rows = input_rows, "loaded readings");

        info!(stage = "label", threshold = self.config.failure_threshold, "labeling");
        let labeled = label_readings(&readings, &self.config)?;

        info!(
            stage = "rolling",
            window = self.config.rolling_window,
            sensors = self.config.key_sensors.len(),
            "building rolling features"
        );
        let rolled = build_rolling_features(&labeled, &self.config)?;

        info!(stage = "assemble", "assembling dataset");
        let assembled = assemble_dataset(&rolled, &self.config)?;

        let adapter = ClassifierAdapter::from_config(&self.config);
        let evaluation = adapter.evaluate(&assembled.frame, classifier)?;

        let predictions = crate::output::prediction_frame(
            &assembled.frame,
            adapter.feature_columns(),
            &evaluation,
        )?;

        Ok(PipelineReport {
            input_rows,
            assembled_rows: assembled.frame.height(),
            dropped_rows: assembled.dropped_rows,
            held_out_rows: evaluation.test_indices.len(),
            report: evaluation.report,
            predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailcastError;

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = PipelineConfig {
            rolling_window: 0,
            ..Default::default()
        };
        assert!(matches!(
            PredictionPipeline::new(config),
            Err(FailcastError::InvalidParameter { .. })
        ));
    }
}
