//! Sensor store: flat-file ingestion and the persistent readings table
//!
//! The raw NASA turbofan files are space-delimited with no header and a
//! fixed positional schema. Ingestion applies that schema and persists the
//! table as parquet; the pipeline only ever reads the persisted table.

use crate::config::{input_columns, ID_COLUMNS};
use crate::error::{FailcastError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle to the persistent sensor-readings table.
#[derive(Debug, Clone)]
pub struct SensorStore {
    path: PathBuf,
}

impl SensorStore {
    /// Create a store handle for the given table path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing table.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ingest a raw flat file into the store.
    ///
    /// The source is space-delimited with no header; trailing separators in
    /// the NASA files produce ghost columns past the 26 real ones, which are
    /// dropped. Returns the number of rows ingested.
    pub fn ingest_raw(&self, raw_path: &Path) -> Result<usize> {
        let mut df = read_raw_readings(raw_path)?;

        let file = File::create(&self.path)
            .map_err(|e| FailcastError::WriteFailure(format!("{}: {e}", self.path.display())))?;
        ParquetWriter::new(file)
            .finish(&mut df)
            .map_err(|e| FailcastError::WriteFailure(format!("{}: {e}", self.path.display())))?;

        info!(rows = df.height(), store = %self.path.display(), "ingested raw readings");
        Ok(df.height())
    }

    /// Load the full readings table.
    ///
    /// The file handle is scoped to this call and released as soon as the
    /// read completes, before any downstream stage runs.
    pub fn load(&self) -> Result<DataFrame> {
        let df = {
            let file = File::open(&self.path).map_err(|e| {
                FailcastError::InputUnavailable(format!(
                    "{}: {e} (run `failcast ingest` first?)",
                    self.path.display()
                ))
            })?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| FailcastError::InputUnavailable(format!("{}: {e}", self.path.display())))?
        };

        validate_schema(&df)?;
        Ok(df)
    }
}

/// Read a raw space-delimited readings file and apply the fixed schema.
fn read_raw_readings(raw_path: &Path) -> Result<DataFrame> {
    let expected = input_columns();

    let raw = {
        let file = File::open(raw_path).map_err(|e| {
            FailcastError::InputUnavailable(format!("{}: {e}", raw_path.display()))
        })?;

        let parse_opts = CsvParseOptions::default().with_separator(b' ');
        CsvReadOptions::default()
            .with_has_header(false)
            .with_infer_schema_length(Some(100))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| FailcastError::InputUnavailable(format!("{}: {e}", raw_path.display())))?
    };

    if raw.width() < expected.len() {
        return Err(FailcastError::SchemaMismatch {
            expected: format!("{} columns", expected.len()),
            actual: format!("{} columns", raw.width()),
        });
    }

    // Keep the 26 real columns, drop trailing ghost columns.
    let keep: Vec<String> = raw
        .get_column_names()
        .into_iter()
        .take(expected.len())
        .map(|s| s.to_string())
        .collect();
    let mut df = raw.select(keep)?;
    df.set_column_names(expected.iter().copied())?;

    // Identifiers are integer, everything else floating point.
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    for name in input_columns() {
        let target = if ID_COLUMNS.contains(&name) {
            DataType::Int64
        } else {
            DataType::Float64
        };
        let cast = df.column(name)?.cast(&target).map_err(|_| {
            FailcastError::SchemaMismatch {
                expected: format!("{name}: {target}"),
                actual: df
                    .column(name)
                    .map(|c| c.dtype().to_string())
                    .unwrap_or_else(|_| "missing".to_string()),
            }
        })?;
        columns.push(cast);
    }

    Ok(DataFrame::new(columns)?)
}

/// Check that a loaded table carries the fixed input schema: exact column
/// names in order, Int64 identifiers, Float64 readings.
fn validate_schema(df: &DataFrame) -> Result<()> {
    let expected = input_columns();
    let actual: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    if actual.len() != expected.len()
        || !expected.iter().zip(actual.iter()).all(|(e, a)| e == a)
    {
        return Err(FailcastError::SchemaMismatch {
            expected: expected.join(","),
            actual: actual.join(","),
        });
    }

    for name in expected {
        let target = if ID_COLUMNS.contains(&name) {
            DataType::Int64
        } else {
            DataType::Float64
        };
        let dtype = df.column(name)?.dtype();
        if dtype != &target {
            return Err(FailcastError::SchemaMismatch {
                expected: format!("{name}: {target}"),
                actual: format!("{name}: {dtype}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_raw_file(dir: &TempDir, lines: &[&str]) -> PathBuf {
        let path = dir.path().join("raw.txt");
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    fn raw_line(unit: i64, cycle: i64) -> String {
        let mut fields = vec![unit.to_string(), cycle.to_string()];
        for i in 0..24 {
            fields.push(format!("{}.0", i + 1));
        }
        fields.join(" ")
    }

    #[test]
    fn test_ingest_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let lines: Vec<String> = (1..=3).map(|c| raw_line(1, c)).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let raw = write_raw_file(&dir, &refs);

        let store = SensorStore::new(dir.path().join("readings.parquet"));
        let n = store.ingest_raw(&raw).unwrap();
        assert_eq!(n, 3);

        let df = store.load().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 26);
        assert_eq!(df.column("unit_number").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("sensor_21").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_trailing_ghost_columns_dropped() {
        // NASA files end each line with a trailing space, yielding ghost columns.
        let dir = TempDir::new().unwrap();
        let lines: Vec<String> = (1..=2).map(|c| format!("{} ", raw_line(2, c))).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let raw = write_raw_file(&dir, &refs);

        let store = SensorStore::new(dir.path().join("readings.parquet"));
        store.ingest_raw(&raw).unwrap();

        let df = store.load().unwrap();
        assert_eq!(df.width(), 26);
    }

    #[test]
    fn test_missing_raw_file() {
        let dir = TempDir::new().unwrap();
        let store = SensorStore::new(dir.path().join("readings.parquet"));
        let err = store.ingest_raw(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, FailcastError::InputUnavailable(_)));
    }

    #[test]
    fn test_missing_store() {
        let dir = TempDir::new().unwrap();
        let store = SensorStore::new(dir.path().join("nope.parquet"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, FailcastError::InputUnavailable(_)));
    }

    fn write_parquet(path: &Path, df: &mut DataFrame) {
        let file = File::create(path).unwrap();
        ParquetWriter::new(file).finish(df).unwrap();
    }

    #[test]
    fn test_load_rejects_wrong_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readings.parquet");
        let mut df = df!(
            "unit_number" => &[1i64, 1],
            "time_in_cycles" => &[1i64, 2],
            "sensor_2" => &[0.1, 0.2],
        )
        .unwrap();
        write_parquet(&path, &mut df);

        let err = SensorStore::new(&path).load().unwrap_err();
        assert!(matches!(err, FailcastError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_load_rejects_wrong_identifier_dtype() {
        let dir = TempDir::new().unwrap();
        let raw_dir = TempDir::new().unwrap();

        // Start from a valid table, then rewrite it with a float unit id.
        let lines: Vec<String> = (1..=2).map(|c| raw_line(1, c)).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let raw = write_raw_file(&raw_dir, &refs);

        let path = dir.path().join("readings.parquet");
        let store = SensorStore::new(&path);
        store.ingest_raw(&raw).unwrap();

        let mut df = store.load().unwrap();
        let unit_as_f64 = df
            .column("unit_number")
            .unwrap()
            .cast(&DataType::Float64)
            .unwrap();
        df.with_column(unit_as_f64).unwrap();
        write_parquet(&path, &mut df);

        let err = store.load().unwrap_err();
        assert!(matches!(err, FailcastError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("unit_number"));
    }

    #[test]
    fn test_too_few_columns_rejected() {
        let dir = TempDir::new().unwrap();
        let raw = write_raw_file(&dir, &["1 1 0.5", "1 2 0.6"]);
        let store = SensorStore::new(dir.path().join("readings.parquet"));
        let err = store.ingest_raw(&raw).unwrap_err();
        assert!(matches!(err, FailcastError::SchemaMismatch { .. }));
    }
}
