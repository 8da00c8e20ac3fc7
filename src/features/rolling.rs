//! Per-unit rolling statistics
//!
//! For each configured sensor, every reading gets the mean and sample
//! standard deviation of the sensor's trailing `rolling_window` values
//! within the reading's own unit trajectory (current row included). The
//! first `window - 1` rows of each unit carry nulls: a value is only
//! produced once the window is full.
//!
//! The computation slides the window with a running sum and sum-of-squares
//! in a single pass per unit, instead of re-aggregating the whole window at
//! every row. A unit's features depend only on that unit's rows in their
//! given order, never on other units.

use crate::config::PipelineConfig;
use crate::error::{FailcastError, Result};
use crate::features::labeling::unit_column;
use polars::prelude::*;
use std::collections::HashMap;

/// Add `{sensor}_roll_mean` and `{sensor}_roll_std` columns for every
/// configured sensor. Pure: returns a new frame.
pub fn build_rolling_features(df: &DataFrame, config: &PipelineConfig) -> Result<DataFrame> {
    config.validate()?;

    let units = unit_column(df)?;

    // Row indices grouped per unit, preserving row order inside each unit.
    // Rows within a unit are ordered by cycle; whole units may appear in
    // any order without affecting results.
    let mut unit_rows: HashMap<i64, Vec<usize>> = HashMap::new();
    for (row, &unit) in units.iter().enumerate() {
        unit_rows.entry(unit).or_default().push(row);
    }

    let mut result = df.clone();

    for sensor in &config.key_sensors {
        let values = sensor_values(df, sensor)?;
        let (means, stds) = windowed_stats(&values, &unit_rows, config.rolling_window);

        let mean_ca: Float64Chunked = means.into_iter().collect();
        let std_ca: Float64Chunked = stds.into_iter().collect();

        result
            .with_column(
                mean_ca
                    .with_name(PipelineConfig::roll_mean_column(sensor).into())
                    .into_series(),
            )?
            .with_column(
                std_ca
                    .with_name(PipelineConfig::roll_std_column(sensor).into())
                    .into_series(),
            )?;
    }

    Ok(result)
}

/// Slide a fixed window over each unit's rows, maintaining running sum and
/// sum-of-squares. Results are written back to the original row positions.
fn windowed_stats(
    values: &[f64],
    unit_rows: &HashMap<i64, Vec<usize>>,
    window: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = values.len();
    let mut means: Vec<Option<f64>> = vec![None; n];
    let mut stds: Vec<Option<f64>> = vec![None; n];
    let w = window as f64;

    for rows in unit_rows.values() {
        let mut sum = 0.0f64;
        let mut sq_sum = 0.0f64;

        for (pos, &row) in rows.iter().enumerate() {
            let v = values[row];
            sum += v;
            sq_sum += v * v;

            if pos >= window {
                let out = values[rows[pos - window]];
                sum -= out;
                sq_sum -= out * out;
            }

            if pos + 1 >= window {
                let mean = sum / w;
                // Sample variance, N-1 denominator. Guard against tiny
                // negative values from floating-point cancellation.
                let var = ((sq_sum - sum * sum / w) / (w - 1.0)).max(0.0);
                means[row] = Some(mean);
                stds[row] = Some(var.sqrt());
            }
        }
    }

    (means, stds)
}

fn sensor_values(df: &DataFrame, sensor: &str) -> Result<Vec<f64>> {
    let ca = df
        .column(sensor)
        .map_err(|_| FailcastError::DataError(format!("sensor column not found: {sensor}")))?
        .as_materialized_series()
        .f64()
        .map_err(|e| FailcastError::DataError(format!("{sensor}: {e}")))?;

    ca.into_iter()
        .map(|v| v.ok_or_else(|| FailcastError::DataError(format!("{sensor}: null value"))))
        .collect()
}
