//! Pipeline configuration and the fixed input schema

use crate::error::{FailcastError, Result};
use serde::{Deserialize, Serialize};

/// Identifying columns of every reading.
pub const ID_COLUMNS: [&str; 2] = ["unit_number", "time_in_cycles"];

/// Operational-setting columns of every reading.
pub const SETTING_COLUMNS: [&str; 3] = ["setting_1", "setting_2", "setting_3"];

/// All 21 raw sensor columns, in source order.
pub const SENSOR_COLUMNS: [&str; 21] = [
    "sensor_1", "sensor_2", "sensor_3", "sensor_4", "sensor_5", "sensor_6",
    "sensor_7", "sensor_8", "sensor_9", "sensor_10", "sensor_11", "sensor_12",
    "sensor_13", "sensor_14", "sensor_15", "sensor_16", "sensor_17",
    "sensor_18", "sensor_19", "sensor_20", "sensor_21",
];

/// Full input schema, positional: identifiers, settings, then sensors.
pub fn input_columns() -> Vec<&'static str> {
    ID_COLUMNS
        .iter()
        .chain(SETTING_COLUMNS.iter())
        .chain(SENSOR_COLUMNS.iter())
        .copied()
        .collect()
}

/// Column name for the remaining-useful-life signal.
pub const RUL_COLUMN: &str = "rul";

/// Column name for the binary imminent-failure label.
pub const LABEL_COLUMN: &str = "will_fail_soon";

/// Column name for model predictions in the output table.
pub const PREDICTION_COLUMN: &str = "prediction";

/// Configuration for the prediction pipeline.
///
/// Passed explicitly into each stage; no stage reads global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// RUL cutoff (in cycles) below or at which a reading is labeled as
    /// imminent failure
    pub failure_threshold: i64,

    /// Sensors that get rolling features, in feature order
    pub key_sensors: Vec<String>,

    /// Trailing window length for rolling mean/std
    pub rolling_window: usize,

    /// Fraction of assembled rows held out for evaluation
    pub test_fraction: f64,

    /// Seed for the split and the classifier
    pub random_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 30,
            key_sensors: vec![
                "sensor_2".to_string(),
                "sensor_3".to_string(),
                "sensor_4".to_string(),
                "sensor_7".to_string(),
                "sensor_11".to_string(),
                "sensor_12".to_string(),
                "sensor_15".to_string(),
            ],
            rolling_window: 5,
            test_fraction: 0.2,
            random_seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration before any stage runs.
    pub fn validate(&self) -> Result<()> {
        if self.failure_threshold < 0 {
            return Err(FailcastError::InvalidParameter {
                name: "failure_threshold".to_string(),
                value: self.failure_threshold.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }
        if self.rolling_window < 2 {
            return Err(FailcastError::InvalidParameter {
                name: "rolling_window".to_string(),
                value: self.rolling_window.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if self.key_sensors.is_empty() {
            return Err(FailcastError::InvalidParameter {
                name: "key_sensors".to_string(),
                value: "[]".to_string(),
                reason: "at least one sensor is required".to_string(),
            });
        }
        for sensor in &self.key_sensors {
            if !SENSOR_COLUMNS.contains(&sensor.as_str()) {
                return Err(FailcastError::InvalidParameter {
                    name: "key_sensors".to_string(),
                    value: sensor.clone(),
                    reason: "not a known sensor column".to_string(),
                });
            }
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(FailcastError::InvalidParameter {
                name: "test_fraction".to_string(),
                value: self.test_fraction.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }
        Ok(())
    }

    /// Name of the rolling-mean column for a sensor.
    pub fn roll_mean_column(sensor: &str) -> String {
        format!("{sensor}_roll_mean")
    }

    /// Name of the rolling-std column for a sensor.
    pub fn roll_std_column(sensor: &str) -> String {
        format!("{sensor}_roll_std")
    }

    /// Rolling feature columns for the configured sensors: grouped by
    /// sensor in configured order, mean before std.
    pub fn rolling_columns(&self) -> Vec<String> {
        self.key_sensors
            .iter()
            .flat_map(|s| [Self::roll_mean_column(s), Self::roll_std_column(s)])
            .collect()
    }

    /// Columns the classifier trains on: cycle index, raw key sensors, then
    /// all rolling features. Identifying columns, RUL and the label are
    /// excluded.
    pub fn feature_columns(&self) -> Vec<String> {
        let mut cols = vec!["time_in_cycles".to_string()];
        cols.extend(self.key_sensors.iter().cloned());
        cols.extend(self.rolling_columns());
        cols
    }
}
