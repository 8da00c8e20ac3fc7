//! Remaining-useful-life labeling
//!
//! RUL for a reading is the distance (in cycles) to the last observed cycle
//! of its unit: zero exactly at the final cycle, strictly decreasing within
//! a unit. The binary label marks readings at or below the failure
//! threshold.

use crate::config::{PipelineConfig, LABEL_COLUMN, RUL_COLUMN};
use crate::error::{FailcastError, Result};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

/// Compute `rul` and `will_fail_soon` columns for every reading.
///
/// The per-unit max cycle is computed in one explicit pass and looked up
/// per row, rather than joined back onto the table. Pure: the input frame
/// is not modified.
pub fn label_readings(df: &DataFrame, config: &PipelineConfig) -> Result<DataFrame> {
    let units = unit_column(df)?;
    let cycles = cycle_column(df)?;

    // Duplicate (unit, cycle) pairs would make RUL ill-defined; the source
    // data is assumed free of them, so fail loudly if the assumption breaks.
    let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(units.len());
    for (&unit, &cycle) in units.iter().zip(cycles.iter()) {
        if !seen.insert((unit, cycle)) {
            return Err(FailcastError::DataError(format!(
                "duplicate reading for unit {unit} at cycle {cycle}"
            )));
        }
    }

    let mut max_cycles: HashMap<i64, i64> = HashMap::new();
    for (&unit, &cycle) in units.iter().zip(cycles.iter()) {
        let entry = max_cycles.entry(unit).or_insert(cycle);
        if cycle > *entry {
            *entry = cycle;
        }
    }

    let mut rul: Vec<i64> = Vec::with_capacity(units.len());
    let mut label: Vec<i64> = Vec::with_capacity(units.len());
    for (&unit, &cycle) in units.iter().zip(cycles.iter()) {
        let max = max_cycles
            .get(&unit)
            .copied()
            .ok_or(FailcastError::MissingUnit(unit))?;
        let remaining = max - cycle;
        rul.push(remaining);
        label.push(if remaining <= config.failure_threshold { 1 } else { 0 });
    }

    let mut result = df.clone();
    result
        .with_column(Column::new(RUL_COLUMN.into(), rul))?
        .with_column(Column::new(LABEL_COLUMN.into(), label))?;

    Ok(result)
}

/// Extract `unit_number` as a dense i64 vector.
pub(crate) fn unit_column(df: &DataFrame) -> Result<Vec<i64>> {
    dense_i64(df, "unit_number")
}

/// Extract `time_in_cycles` as a dense i64 vector.
pub(crate) fn cycle_column(df: &DataFrame) -> Result<Vec<i64>> {
    dense_i64(df, "time_in_cycles")
}

fn dense_i64(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let ca = df
        .column(name)?
        .as_materialized_series()
        .i64()
        .map_err(|e| FailcastError::DataError(format!("{name}: {e}")))?;

    ca.into_iter()
        .map(|v| v.ok_or_else(|| FailcastError::DataError(format!("{name}: null value"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_unit_frame() -> DataFrame {
        df!(
            "unit_number" => &[1i64, 1, 1, 1, 5, 5],
            "time_in_cycles" => &[1i64, 2, 3, 4, 1, 2],
            "sensor_2" => &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        )
        .unwrap()
    }

    #[test]
    fn test_rul_zero_at_last_cycle() {
        let config = PipelineConfig::default();
        let labeled = label_readings(&two_unit_frame(), &config).unwrap();

        let rul: Vec<i64> = labeled
            .column(RUL_COLUMN)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();

        assert_eq!(rul, vec![3, 2, 1, 0, 1, 0]);
    }

    #[test]
    fn test_rul_strictly_decreasing_per_unit() {
        let config = PipelineConfig::default();
        let labeled = label_readings(&two_unit_frame(), &config).unwrap();
        let rul: Vec<i64> = labeled
            .column(RUL_COLUMN)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();

        // Unit 1 occupies rows 0..4, unit 5 rows 4..6.
        assert!(rul[0..4].windows(2).all(|w| w[0] > w[1]));
        assert!(rul[4..6].windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_label_boundary_at_threshold() {
        let config = PipelineConfig {
            failure_threshold: 2,
            ..Default::default()
        };
        let labeled = label_readings(&two_unit_frame(), &config).unwrap();
        let label: Vec<i64> = labeled
            .column(LABEL_COLUMN)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();

        // Unit 1 rul = [3, 2, 1, 0]: rul == threshold is positive,
        // rul == threshold + 1 is negative.
        assert_eq!(label, vec![0, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_duplicate_reading_rejected() {
        let df = df!(
            "unit_number" => &[1i64, 1],
            "time_in_cycles" => &[3i64, 3],
        )
        .unwrap();

        let err = label_readings(&df, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, FailcastError::DataError(_)));
        assert!(err.to_string().contains("unit 1"));
    }

    #[test]
    fn test_input_untouched() {
        let df = two_unit_frame();
        let config = PipelineConfig::default();
        let labeled = label_readings(&df, &config).unwrap();

        assert_eq!(df.width(), 3);
        assert_eq!(labeled.width(), 5);
    }

    #[test]
    fn test_noncontiguous_unit_ids() {
        let df = df!(
            "unit_number" => &[17i64, 17, 903, 903, 903],
            "time_in_cycles" => &[1i64, 2, 1, 2, 3],
        )
        .unwrap();

        let labeled = label_readings(&df, &PipelineConfig::default()).unwrap();
        let rul: Vec<i64> = labeled
            .column(RUL_COLUMN)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();

        assert_eq!(rul, vec![1, 0, 2, 1, 0]);
    }
}
