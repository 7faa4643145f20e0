//! # plugwatch-adapter-storage-csv
//!
//! Implements the [`SeriesStore`] port as one append-only CSV file per
//! device. The file is meant to be greppable and importable, so it keeps
//! the fixed header of [`CSV_HEADER`]. Files written by earlier tooling
//! (naive timestamps, reordered columns) are still readable.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};

use plugwatch_app::ports::SeriesStore;
use plugwatch_domain::error::PlugwatchError;
use plugwatch_domain::sample::Sample;
use plugwatch_domain::telemetry::{CSV_HEADER, TelemetryReading};
use plugwatch_domain::time::Timestamp;

pub mod error;

use error::CsvStoreError;

/// Append-only CSV series for one device.
pub struct CsvSeriesStore {
    path: PathBuf,
}

impl CsvSeriesStore {
    /// Open (or create) the series file at `path`, validating its header.
    ///
    /// If the file exists but its first row contains any field outside the
    /// expected set, it is treated as headerless and a fresh header row is
    /// appended, matching how earlier tooling migrated its logs.
    ///
    /// # Errors
    ///
    /// Returns [`CsvStoreError`] on IO failure.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CsvStoreError> {
        let store = Self { path: path.into() };
        if store.needs_header()? {
            store.append_header()?;
        }
        Ok(store)
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_header(&self) -> Result<bool, CsvStoreError> {
        if !self.path.exists() {
            return Ok(true);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        let mut first = csv::StringRecord::new();
        if !reader.read_record(&mut first)? {
            // Empty file.
            return Ok(true);
        }
        let valid = !first.is_empty() && first.iter().all(|field| CSV_HEADER.contains(&field));
        if !valid {
            tracing::warn!(path = %self.path.display(), "series file has no valid header, writing one");
        }
        Ok(!valid)
    }

    fn append_header(&self) -> Result<(), CsvStoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(())
    }

    fn append_row(&self, reading: &TelemetryReading) -> Result<(), CsvStoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(reading)?;
        writer.flush()?;
        Ok(())
    }

    fn read_samples(&self) -> Result<Vec<Sample>, CsvStoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        // Column positions come from the file's own header row so that
        // files with reordered columns stay readable.
        let mut columns: Option<(usize, usize, usize)> = None;
        let mut samples = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if let Some(found) = header_columns(&record) {
                // A (possibly repeated, after migration) header row.
                columns = Some(found);
                continue;
            }
            let Some((time_col, power_col, total_col)) = columns else {
                tracing::warn!(row = index, "data row before any header, skipping");
                continue;
            };
            match parse_row(&record, time_col, power_col, total_col) {
                Some(sample) => samples.push(sample),
                None => {
                    tracing::warn!(row = index, "unparsable series row, skipping");
                }
            }
        }

        Ok(samples)
    }
}

/// If `record` is a header row, return the (Time, Power, Total) columns.
fn header_columns(record: &csv::StringRecord) -> Option<(usize, usize, usize)> {
    let position = |name: &str| record.iter().position(|field| field == name);
    match (position("Time"), position("Power"), position("Total")) {
        (Some(time), Some(power), Some(total)) => Some((time, power, total)),
        _ => None,
    }
}

fn parse_row(
    record: &csv::StringRecord,
    time_col: usize,
    power_col: usize,
    total_col: usize,
) -> Option<Sample> {
    let time = parse_time(record.get(time_col)?)?;
    let power: f64 = record.get(power_col)?.parse().ok()?;
    let total: f64 = record.get(total_col)?.parse().ok()?;
    Some(Sample::new(time, power, total))
}

/// Accept both RFC 3339 and the naive ISO timestamps older files contain.
fn parse_time(text: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.to_utc());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

impl SeriesStore for CsvSeriesStore {
    async fn append(&self, reading: &TelemetryReading) -> Result<(), PlugwatchError> {
        Ok(self.append_row(reading)?)
    }

    async fn read_all(&self) -> Result<Vec<Sample>, PlugwatchError> {
        Ok(self.read_samples()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(minute: u32, power: f64, total: f64) -> TelemetryReading {
        TelemetryReading {
            time: Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap(),
            voltage: 230.0,
            current: 1.0,
            power,
            apparent_power: power,
            reactive_power: 0.0,
            factor: 1.0,
            today: 0.1,
            yesterday: 0.2,
            total,
            temperature1: 30.0,
            total_start_time: "2023-01-01T00:00:00".to_string(),
            power1: "ON".to_string(),
        }
    }

    #[tokio::test]
    async fn should_round_trip_appended_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvSeriesStore::open(dir.path().join("washer.csv")).unwrap();

        store.append(&reading(0, 10.0, 1.0)).await.unwrap();
        store.append(&reading(1, 20.0, 1.1)).await.unwrap();

        let samples = store.read_all().await.unwrap();
        assert_eq!(samples.len(), 2);
        assert!((samples[0].power - 10.0).abs() < f64::EPSILON);
        assert!((samples[1].energy_total - 1.1).abs() < f64::EPSILON);
        assert!(samples[0].time < samples[1].time);
    }

    #[tokio::test]
    async fn should_write_header_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("washer.csv");

        let store = CsvSeriesStore::open(&path).unwrap();
        store.append(&reading(0, 10.0, 1.0)).await.unwrap();
        drop(store);

        // Re-opening a valid file must not write another header.
        let store = CsvSeriesStore::open(&path).unwrap();
        store.append(&reading(1, 20.0, 1.1)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("Time,Voltage").count(), 1);
        assert_eq!(store.read_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_migrate_file_with_unknown_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("washer.csv");
        std::fs::write(&path, "foo,bar,baz\n1,2,3\n").unwrap();

        let store = CsvSeriesStore::open(&path).unwrap();
        store.append(&reading(0, 10.0, 1.0)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("foo,bar,baz\n"));
        assert!(content.contains("Time,Voltage"));

        // Rows before the migrated header are unreadable and skipped.
        let samples = store.read_all().await.unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[tokio::test]
    async fn should_skip_unparsable_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("washer.csv");
        let store = CsvSeriesStore::open(&path).unwrap();
        store.append(&reading(0, 10.0, 1.0)).await.unwrap();

        // A torn row, e.g. from a crash mid-append.
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("2024-03-01T12:05:00+00:00,oops\n");
        std::fs::write(&path, content).unwrap();

        let samples = store.read_all().await.unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[tokio::test]
    async fn should_read_legacy_naive_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("washer.csv");
        let header = CSV_HEADER.join(",");
        std::fs::write(
            &path,
            format!("{header}\n2024-03-01T08:00:00,230,1,42,42,0,1,0.1,0.2,1.5,30,start,ON\n"),
        )
        .unwrap();

        let store = CsvSeriesStore::open(&path).unwrap();
        let samples = store.read_all().await.unwrap();
        assert_eq!(samples.len(), 1);
        assert!((samples[0].power - 42.0).abs() < f64::EPSILON);
        assert_eq!(
            samples[0].time,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
        );
    }
}
