//! Integration test: feature/label plumbing (label → roll → assemble)
//! verified through the classifier seam with a deterministic stub.

use failcast::config::{LABEL_COLUMN, RUL_COLUMN, SENSOR_COLUMNS, SETTING_COLUMNS};
use failcast::model::{Classifier, ClassifierAdapter};
use failcast::prelude::*;
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Stub that memorizes the labels it was fit on and predicts all-positive.
struct RecordingStub {
    seen_train_labels: Vec<f64>,
}

impl Classifier for RecordingStub {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.seen_train_labels = y.to_vec();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Array1::ones(x.nrows()))
    }
}

/// Build a full-schema frame of synthetic trajectories.
fn readings(units: &[(i64, i64)]) -> DataFrame {
    let mut unit_col: Vec<i64> = Vec::new();
    let mut cycle_col: Vec<i64> = Vec::new();
    for &(unit, len) in units {
        for cycle in 1..=len {
            unit_col.push(unit);
            cycle_col.push(cycle);
        }
    }
    let n = unit_col.len();

    let mut columns: Vec<Column> = vec![
        Column::new("unit_number".into(), unit_col),
        Column::new("time_in_cycles".into(), cycle_col.clone()),
    ];
    for name in SETTING_COLUMNS {
        columns.push(Column::new(name.into(), vec![0.0f64; n]));
    }
    for (j, name) in SENSOR_COLUMNS.iter().enumerate() {
        let values: Vec<f64> = cycle_col
            .iter()
            .map(|&c| j as f64 + c as f64 * 0.1 * (1.0 + (j % 3) as f64))
            .collect();
        columns.push(Column::new((*name).into(), values));
    }
    DataFrame::new(columns).unwrap()
}

fn run_stages(units: &[(i64, i64)], config: &PipelineConfig) -> Result<AssembledDataset> {
    let df = readings(units);
    let labeled = label_readings(&df, config)?;
    let rolled = build_rolling_features(&labeled, config)?;
    assemble_dataset(&rolled, config)
}

#[test]
fn test_seven_cycle_unit_boundary_scenario() {
    let config = PipelineConfig {
        rolling_window: 5,
        failure_threshold: 2,
        ..Default::default()
    };

    let assembled = run_stages(&[(1, 7)], &config).unwrap();
    assert_eq!(assembled.frame.height(), 3);
    assert_eq!(assembled.dropped_rows, 4);

    let rul: Vec<i64> = assembled
        .frame
        .column(RUL_COLUMN)
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    let labels: Vec<i64> = assembled
        .frame
        .column(LABEL_COLUMN)
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();

    assert_eq!(rul, vec![2, 1, 0]);
    assert_eq!(labels, vec![1, 1, 1]);
}

#[test]
fn test_short_unit_is_skipped_not_fatal() {
    let config = PipelineConfig {
        rolling_window: 5,
        ..Default::default()
    };

    let assembled = run_stages(&[(1, 20), (2, 3)], &config).unwrap();
    // Unit 2 contributes zero rows; unit 1 contributes 20 - 5 + 1.
    assert_eq!(assembled.frame.height(), 16);
}

#[test]
fn test_row_count_identity_across_units() {
    let config = PipelineConfig {
        rolling_window: 4,
        ..Default::default()
    };

    let lengths = [(1i64, 10i64), (2, 4), (3, 3), (4, 25)];
    let assembled = run_stages(&lengths, &config).unwrap();

    let expected: i64 = lengths
        .iter()
        .map(|&(_, len)| (len - config.rolling_window as i64 + 1).max(0))
        .sum();
    assert_eq!(assembled.frame.height() as i64, expected);
    assert_eq!(
        assembled.dropped_rows as i64,
        lengths.iter().map(|&(_, len)| len).sum::<i64>() - expected
    );
}

#[test]
fn test_adapter_plumbs_labels_through() {
    let config = PipelineConfig {
        rolling_window: 3,
        failure_threshold: 5,
        ..Default::default()
    };

    let assembled = run_stages(&[(1, 30), (2, 30)], &config).unwrap();
    let adapter = ClassifierAdapter::from_config(&config);
    let mut stub = RecordingStub {
        seen_train_labels: Vec::new(),
    };

    let eval = adapter.evaluate(&assembled.frame, &mut stub).unwrap();

    // The stub saw only 0/1 labels, and together with the held-out labels
    // they account for every assembled row.
    assert!(stub
        .seen_train_labels
        .iter()
        .all(|&l| l == 0.0 || l == 1.0));
    assert_eq!(
        stub.seen_train_labels.len() + eval.test_indices.len(),
        assembled.frame.height()
    );

    // All-positive stub: recall for the positive class is 1.
    assert!((eval.report.fails_soon.recall - 1.0).abs() < 1e-12);
}

#[test]
fn test_unit_order_does_not_change_features() {
    let config = PipelineConfig {
        rolling_window: 3,
        key_sensors: vec!["sensor_2".to_string()],
        ..Default::default()
    };

    let forward = run_stages(&[(1, 10), (2, 8)], &config).unwrap();
    let backward = run_stages(&[(2, 8), (1, 10)], &config).unwrap();

    // Compare unit 1's rolling means after sorting both tables the same way.
    let sort = |df: &DataFrame| -> Vec<f64> {
        df.sort(["unit_number", "time_in_cycles"], Default::default())
            .unwrap()
            .column("sensor_2_roll_mean")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    };

    assert_eq!(sort(&forward.frame), sort(&backward.frame));
}
