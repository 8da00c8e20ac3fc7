//! Command-line interface for the failcast pipeline

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::{FailcastError, Result};
use crate::model::ForestClassifier;
use crate::pipeline::PredictionPipeline;
use crate::store::SensorStore;

fn step_ok(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

fn fail(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

#[derive(Parser)]
#[command(name = "failcast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predictive maintenance: imminent-failure classification from sensor telemetry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a raw space-delimited readings file into the sensor store
    Ingest {
        /// Raw readings file (e.g. train_FD001.txt)
        #[arg(short, long)]
        data: PathBuf,

        /// Sensor store table to create
        #[arg(short, long, default_value = "engine_data.parquet")]
        store: PathBuf,
    },

    /// Run the prediction pipeline against an ingested store
    Predict {
        /// Sensor store table
        #[arg(short, long, default_value = "engine_data.parquet")]
        store: PathBuf,

        /// Output CSV for held-out predictions
        #[arg(short, long, default_value = "maintenance_predictions.csv")]
        output: PathBuf,

        /// RUL cutoff for the positive label
        #[arg(long, default_value = "30")]
        failure_threshold: i64,

        /// Trailing window length for rolling features
        #[arg(long, default_value = "5")]
        rolling_window: usize,

        /// Comma-separated sensors to build rolling features for
        #[arg(long, value_delimiter = ',')]
        key_sensors: Option<Vec<String>>,

        /// Number of trees in the forest
        #[arg(long, default_value = "100")]
        n_estimators: usize,
    },

    /// Show row and unit counts for an ingested store
    Info {
        /// Sensor store table
        #[arg(short, long, default_value = "engine_data.parquet")]
        store: PathBuf,
    },
}

/// Ingest a raw readings file.
pub fn cmd_ingest(data: &PathBuf, store_path: &PathBuf) -> Result<()> {
    let store = SensorStore::new(store_path);
    let rows = store.ingest_raw(data)?;
    step_ok(&format!(
        "ingested {rows} readings into {}",
        store_path.display()
    ));
    Ok(())
}

/// Run the full pipeline and print the report.
pub fn cmd_predict(
    store_path: &PathBuf,
    output: &PathBuf,
    config: PipelineConfig,
    n_estimators: usize,
) -> Result<()> {
    let store = SensorStore::new(store_path);
    let pipeline = PredictionPipeline::new(config)?;

    let mut forest = ForestClassifier::new(n_estimators)
        .with_random_state(pipeline.config().random_seed);

    let report = pipeline.run(&store, &mut forest, output)?;

    step_ok(&format!("loaded {} readings", report.input_rows));
    step_ok(&format!(
        "assembled {} rows ({} dropped by the rolling window)",
        report.assembled_rows, report.dropped_rows
    ));
    step_ok(&format!(
        "evaluated {} held-out rows",
        report.held_out_rows
    ));

    println!();
    println!("{}", "Model performance".bold());
    println!("{}", report.report);
    println!();

    if let Some(importances) = forest.feature_importances() {
        let adapter_cols = pipeline.config().feature_columns();
        let mut ranked: Vec<(&String, f64)> =
            adapter_cols.iter().zip(importances.iter().copied()).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        println!("{}", "Top features".bold());
        for (name, importance) in ranked.iter().take(5) {
            println!("  {name:<24} {importance:.4}");
        }
        println!();
    }

    step_ok(&format!("results saved to {}", output.display()));
    Ok(())
}

/// Print store summary.
pub fn cmd_info(store_path: &PathBuf) -> Result<()> {
    let store = SensorStore::new(store_path);
    let df = store.load()?;

    let units = df
        .column("unit_number")?
        .as_materialized_series()
        .n_unique()
        .map_err(|e| FailcastError::DataError(e.to_string()))?;

    println!("  store:    {}", store_path.display());
    println!("  readings: {}", df.height());
    println!("  units:    {units}");
    Ok(())
}

/// Map an error to a distinct, human-readable termination message.
pub fn report_failure(err: &FailcastError) {
    match err {
        FailcastError::InputUnavailable(detail) => {
            fail(&format!("could not read the input table: {detail}"));
        }
        FailcastError::EmptyDataset { stage, detail } => {
            fail(&format!("nothing left to train on after {stage}: {detail}"));
        }
        FailcastError::WriteFailure(detail) => {
            fail(&format!(
                "could not write results (predictions were computed): {detail}"
            ));
        }
        other => fail(&other.to_string()),
    }
}
