//! Prediction writer
//!
//! Serializes one CSV row per held-out example, preserving original row
//! identity so predictions join back to source units and cycles. Column
//! order is fixed: `unit_number, time_in_cycles, rul, will_fail_soon,
//! prediction`, then every feature column in training order. Feature values
//! are the original unscaled ones.

use crate::config::{LABEL_COLUMN, PREDICTION_COLUMN, RUL_COLUMN};
use crate::error::{FailcastError, Result};
use crate::model::Evaluation;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Write the held-out rows with their predictions to `path`.
pub fn write_predictions(
    assembled: &DataFrame,
    feature_columns: &[String],
    evaluation: &Evaluation,
    path: &Path,
) -> Result<()> {
    let mut out = prediction_frame(assembled, feature_columns, evaluation)?;
    write_frame(&mut out, path)
}

/// Serialize a prepared table as CSV.
pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| FailcastError::WriteFailure(format!("{}: {e}", path.display())))?;
    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(|e| FailcastError::WriteFailure(format!("{}: {e}", path.display())))?;

    info!(rows = df.height(), path = %path.display(), "wrote predictions");
    Ok(())
}

/// Build the output table without writing it, in the documented column
/// order. Kept separate so a caller can retain results in memory even when
/// the write itself fails.
pub fn prediction_frame(
    assembled: &DataFrame,
    feature_columns: &[String],
    evaluation: &Evaluation,
) -> Result<DataFrame> {
    let idx: IdxCa = IdxCa::from_vec(
        "idx".into(),
        evaluation.test_indices.iter().map(|&i| i as IdxSize).collect(),
    );
    let held_out = assembled.take(&idx)?;

    let mut out = held_out.select([
        "unit_number",
        "time_in_cycles",
        RUL_COLUMN,
        LABEL_COLUMN,
    ])?;

    let predicted: Vec<i64> = evaluation
        .predictions
        .iter()
        .map(|&p| if p > 0.5 { 1 } else { 0 })
        .collect();
    out.with_column(Column::new(PREDICTION_COLUMN.into(), predicted))?;

    for col in feature_columns {
        out.with_column(held_out.column(col)?.clone())?;
    }

    Ok(out)
}
