//! Failcast - predictive maintenance from per-cycle sensor telemetry
//!
//! Converts raw per-unit, per-cycle sensor readings into a model-ready
//! table with a remaining-useful-life column, a binary imminent-failure
//! label and per-unit rolling statistics, then trains a classifier that
//! predicts whether a unit fails within a fixed horizon.
//!
//! # Modules
//!
//! - [`store`] - sensor store: flat-file ingestion and the readings table
//! - [`features`] - RUL labeling, rolling features, dataset assembly
//! - [`model`] - classifier seam: split, scaling, forest, metrics
//! - [`output`] - prediction writer
//! - [`pipeline`] - end-to-end orchestration
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod store;

pub use error::{FailcastError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{FailcastError, Result};
    pub use crate::features::{
        assemble_dataset, build_rolling_features, label_readings, AssembledDataset,
    };
    pub use crate::model::{
        Classifier, ClassifierAdapter, ClassificationReport, Evaluation, ForestClassifier,
        StandardScaler,
    };
    pub use crate::pipeline::{PipelineReport, PredictionPipeline};
    pub use crate::store::SensorStore;
}
