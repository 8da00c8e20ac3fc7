//! Dataset assembly
//!
//! Merges labeled readings and rolling features into the single
//! feature/label table handed to the classifier. A row survives only when
//! EVERY rolling feature across EVERY configured sensor is defined, i.e.
//! the row is at least `rolling_window` cycles into its unit's trajectory.
//!
//! Column order is deterministic and documented: identifying columns
//! (`unit_number`, `time_in_cycles`), settings, raw sensors in source
//! order, `rul`, `will_fail_soon`, then rolling features grouped by sensor
//! in configured order with mean before std.

use crate::config::{PipelineConfig, LABEL_COLUMN, RUL_COLUMN, SENSOR_COLUMNS, SETTING_COLUMNS};
use crate::error::{FailcastError, Result};
use polars::prelude::*;
use tracing::info;

/// The model-ready feature/label table.
///
/// Produced solely by [`assemble_dataset`]; treated as immutable downstream
/// and handed to the classifier adapter by value.
#[derive(Debug, Clone)]
pub struct AssembledDataset {
    /// The assembled table, in the documented column order.
    pub frame: DataFrame,
    /// Rows removed because at least one rolling feature was undefined.
    pub dropped_rows: usize,
}

/// Full column order of the assembled table for a configuration.
pub fn assembled_columns(config: &PipelineConfig) -> Vec<String> {
    let mut cols: Vec<String> = vec!["unit_number".to_string(), "time_in_cycles".to_string()];
    cols.extend(SETTING_COLUMNS.iter().map(|s| s.to_string()));
    cols.extend(SENSOR_COLUMNS.iter().map(|s| s.to_string()));
    cols.push(RUL_COLUMN.to_string());
    cols.push(LABEL_COLUMN.to_string());
    cols.extend(config.rolling_columns());
    cols
}

/// Build the feature/label table from a frame carrying labels and rolling
/// features. Reports the dropped-row count instead of silently filtering.
pub fn assemble_dataset(df: &DataFrame, config: &PipelineConfig) -> Result<AssembledDataset> {
    let ordered = df.select(assembled_columns(config)).map_err(|e| {
        FailcastError::DataError(format!("dataset assembly: missing column ({e})"))
    })?;

    let input_rows = ordered.height();

    // Strict AND across all rolling features: one undefined value drops the
    // whole row.
    let mut keep = BooleanChunked::full("keep".into(), true, input_rows);
    for col in config.rolling_columns() {
        let not_null = ordered.column(&col)?.as_materialized_series().is_not_null();
        keep = &keep & &not_null;
    }

    let frame = ordered.filter(&keep)?;
    let dropped_rows = input_rows - frame.height();

    info!(
        input_rows,
        kept_rows = frame.height(),
        dropped_rows,
        "assembled feature/label table"
    );

    if frame.height() == 0 {
        return Err(FailcastError::EmptyDataset {
            stage: "dataset assembly".to_string(),
            detail: format!(
                "all {input_rows} rows dropped; every unit trajectory is shorter than \
                 the rolling window ({})",
                config.rolling_window
            ),
        });
    }

    Ok(AssembledDataset { frame, dropped_rows })
}
