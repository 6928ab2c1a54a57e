//! Tabular time series input backed by a polars `DataFrame`

use crate::error::{PrepError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Time series table: named numeric columns plus an optional datetime column
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    /// Data frame containing the raw measurements
    df: DataFrame,
    /// Name of the designated datetime column, if any
    datetime_column: Option<String>,
}

/// Data loader for time series tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a time series table from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<TimeSeriesTable> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(Some(100))
            .has_header(true)
            .finish()?;

        tracing::debug!(rows = df.height(), columns = df.width(), "loaded csv table");
        Ok(TimeSeriesTable::new(df))
    }

    /// Create a time series table from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> TimeSeriesTable {
        TimeSeriesTable::new(df)
    }
}

impl TimeSeriesTable {
    /// Wrap a DataFrame without a designated datetime column
    pub fn new(df: DataFrame) -> Self {
        Self {
            df,
            datetime_column: None,
        }
    }

    /// Build a table from named numeric columns (mostly useful in tests)
    pub fn from_columns(columns: &[(&str, Vec<f64>)]) -> Result<Self> {
        let series = columns
            .iter()
            .map(|(name, values)| Series::new(name, values.as_slice()))
            .collect::<Vec<_>>();
        Ok(Self::new(DataFrame::new(series)?))
    }

    /// Add a timestamp column stored as epoch milliseconds and designate it
    /// as the datetime column
    pub fn with_timestamps(mut self, name: &str, timestamps: &[DateTime<Utc>]) -> Result<Self> {
        if timestamps.len() != self.df.height() {
            return Err(PrepError::DataError(format!(
                "Timestamp count ({}) doesn't match row count ({})",
                timestamps.len(),
                self.df.height()
            )));
        }
        let millis = timestamps
            .iter()
            .map(|ts| ts.timestamp_millis())
            .collect::<Vec<i64>>();
        self.df.with_column(Series::new(name, millis))?;
        self.datetime_column = Some(name.to_string());
        Ok(self)
    }

    /// Designate an existing column as the datetime column
    pub fn with_datetime_column(mut self, name: &str) -> Result<Self> {
        if !self.has_column(name) {
            return Err(PrepError::ConfigurationError(format!(
                "datetime_col: column '{}' not found",
                name
            )));
        }
        self.datetime_column = Some(name.to_string());
        Ok(self)
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the datetime column name
    pub fn datetime_column(&self) -> Option<&str> {
        self.datetime_column.as_deref()
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_names().iter().any(|c| *c == name)
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Get a numeric column as f64 values. Nulls, NaN, infinities and
    /// non-numeric columns are rejected.
    pub fn column_values(&self, name: &str) -> Result<Vec<f64>> {
        let col = self
            .df
            .column(name)
            .map_err(|_| PrepError::ConfigurationError(format!("column '{}' not found", name)))?;

        if !col.dtype().is_numeric() {
            return Err(PrepError::DataError(format!(
                "Column '{}' has non-numeric type {}",
                name,
                col.dtype()
            )));
        }

        let casted = col.cast(&DataType::Float64)?;
        let values = casted
            .f64()?
            .into_iter()
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| PrepError::DataError(format!("Column '{}' contains null values", name)))?;

        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(PrepError::DataError(format!(
                "Column '{}' has non-finite value {} at row {}",
                name, values[row], row
            )));
        }

        Ok(values)
    }

    /// Get the designated datetime column as UTC timestamps.
    ///
    /// Polars temporal types, integer epoch milliseconds and common textual
    /// formats are accepted.
    pub fn timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        let name = self.datetime_column.as_deref().ok_or_else(|| {
            PrepError::ConfigurationError("datetime_col: no datetime column designated".to_string())
        })?;
        let col = self.df.column(name)?;

        let parsed: Vec<Option<DateTime<Utc>>> = match col.dtype() {
            DataType::Datetime(unit, _) => {
                let raw = col.cast(&DataType::Int64)?;
                let unit = *unit;
                raw.i64()?
                    .into_iter()
                    .map(|v| v.and_then(|ts| from_epoch(ts, unit)))
                    .collect()
            }
            DataType::Date => {
                let days = col.cast(&DataType::Int32)?;
                days.i32()?
                    .into_iter()
                    .map(|v| {
                        v.and_then(|d| {
                            NaiveDate::from_ymd_opt(1970, 1, 1)?
                                .checked_add_signed(chrono::Duration::days(d as i64))
                        })
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                        .map(|naive| Utc.from_utc_datetime(&naive))
                    })
                    .collect()
            }
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .map(|v| v.and_then(parse_timestamp))
                .collect(),
            DataType::Int32 | DataType::Int64 | DataType::UInt32 | DataType::UInt64 => {
                let raw = col.cast(&DataType::Int64)?;
                raw.i64()?
                    .into_iter()
                    .map(|v| v.and_then(|ts| from_epoch(ts, TimeUnit::Milliseconds)))
                    .collect()
            }
            other => {
                return Err(PrepError::DataError(format!(
                    "Column '{}' of type {} cannot be read as timestamps",
                    name, other
                )))
            }
        };

        parsed
            .into_iter()
            .enumerate()
            .map(|(row, ts)| {
                ts.ok_or_else(|| {
                    PrepError::DataError(format!(
                        "Unparsable timestamp in column '{}' at row {}",
                        name, row
                    ))
                })
            })
            .collect()
    }

    /// Row indices in chronological order.
    ///
    /// With a datetime column the rows are stably sorted ascending, so
    /// duplicate timestamps keep their input order. Without one the input
    /// order is returned unchanged.
    pub fn chronological_order(&self) -> Result<Vec<usize>> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        if self.datetime_column.is_some() {
            let timestamps = self.timestamps()?;
            order.sort_by_key(|&i| timestamps[i]);
        }
        Ok(order)
    }

    /// Most recent timestamp, when a datetime column is designated
    pub fn last_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        if self.datetime_column.is_none() {
            return Ok(None);
        }
        Ok(self.timestamps()?.into_iter().max())
    }

    /// Gather the given columns into a `(rows, columns)` matrix with rows
    /// taken in `order`
    pub fn feature_matrix(&self, columns: &[String], order: &[usize]) -> Result<Array2<f64>> {
        let mut matrix = Array2::<f64>::zeros((order.len(), columns.len()));
        for (j, name) in columns.iter().enumerate() {
            let values = self.column_values(name)?;
            for (row, &src) in order.iter().enumerate() {
                matrix[[row, j]] = values[src];
            }
        }
        Ok(matrix)
    }

    /// Gather one column into a vector with rows taken in `order`
    pub fn column_array(&self, name: &str, order: &[usize]) -> Result<Array1<f64>> {
        let values = self.column_values(name)?;
        Ok(order.iter().map(|&src| values[src]).collect())
    }
}

fn from_epoch(value: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Nanoseconds => Some(Utc.timestamp_nanos(value)),
        TimeUnit::Microseconds => Utc
            .timestamp_opt(
                value.div_euclid(1_000_000),
                (value.rem_euclid(1_000_000) * 1_000) as u32,
            )
            .single(),
        TimeUnit::Milliseconds => Utc.timestamp_millis_opt(value).single(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 2, 3, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2023-01-02 03:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-02T03:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-02T03:00:00Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-01-02"),
            Some(Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_chronological_order_is_stable() {
        let ts = |h| Utc.with_ymd_and_hms(2023, 1, 1, h, 0, 0).unwrap();
        let table = TimeSeriesTable::from_columns(&[("temp", vec![1.0, 2.0, 3.0, 4.0])])
            .unwrap()
            .with_timestamps("timestamp", &[ts(3), ts(1), ts(3), ts(0)])
            .unwrap();

        assert_eq!(table.chronological_order().unwrap(), vec![3, 1, 0, 2]);
        assert_eq!(table.last_timestamp().unwrap(), Some(ts(3)));
    }

    #[test]
    fn test_order_preserved_without_datetime_column() {
        let table = TimeSeriesTable::from_columns(&[("temp", vec![3.0, 1.0, 2.0])]).unwrap();
        assert_eq!(table.chronological_order().unwrap(), vec![0, 1, 2]);
        assert_eq!(table.last_timestamp().unwrap(), None);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let table = TimeSeriesTable::from_columns(&[
            ("temp", vec![1.0, 2.0, f64::NAN]),
            ("rh", vec![1.0, f64::INFINITY, 3.0]),
        ])
        .unwrap();
        assert!(matches!(
            table.column_values("temp"),
            Err(PrepError::DataError(msg)) if msg.contains("temp") && msg.contains("row 2")
        ));
        assert!(matches!(
            table.column_values("rh"),
            Err(PrepError::DataError(msg)) if msg.contains("row 1")
        ));
    }

    #[test]
    fn test_missing_column_is_configuration_error() {
        let table = TimeSeriesTable::from_columns(&[("temp", vec![1.0])]).unwrap();
        assert!(matches!(
            table.column_values("rh"),
            Err(PrepError::ConfigurationError(_))
        ));
        assert!(matches!(
            table.clone().with_datetime_column("timestamp"),
            Err(PrepError::ConfigurationError(_))
        ));
    }
}
