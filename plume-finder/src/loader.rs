use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use plume_detection::{Real, TimeSeries, Timestamp};
use std::{io::Read, path::Path};
use tracing::{debug, info};

/// Cell contents treated as a missing concentration.
const MISSING: [&str; 4] = ["", "NA", "N/A", "null"];

/// Identifies a column by header name or, failing that, by zero-based position.
#[derive(Debug, Clone)]
pub(crate) struct ColumnSelector(pub(crate) String);

impl ColumnSelector {
    fn position(&self, headers: &csv::StringRecord) -> Result<usize> {
        if let Some(index) = headers.iter().position(|h| h.trim() == self.0) {
            return Ok(index);
        }
        match self.0.parse::<usize>() {
            Ok(index) if index < headers.len() => Ok(index),
            _ => bail!(
                "Column '{0}' not found, available columns are {1:?}",
                self.0,
                headers.iter().collect::<Vec<_>>()
            ),
        }
    }
}

pub(crate) fn parse_timestamp(text: &str, format: &str) -> Result<Timestamp> {
    let time = NaiveDateTime::parse_from_str(text.trim(), format)
        .with_context(|| format!("Timestamp '{text}' does not match format '{format}'"))?;
    Ok(time.and_utc())
}

fn parse_value(text: &str) -> Result<Real> {
    let text = text.trim();
    if MISSING.contains(&text) {
        return Ok(Real::NAN);
    }
    text.parse::<Real>()
        .with_context(|| format!("Concentration '{text}' is not a number"))
}

/// Loads a concentration series from a delimited file with a header row.
pub(crate) fn load_series(
    path: &Path,
    time_column: &ColumnSelector,
    value_column: &ColumnSelector,
    time_format: &str,
) -> Result<TimeSeries> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let series = read_series(reader, time_column, value_column, time_format)
        .with_context(|| format!("reading {}", path.display()))?;
    info!(
        "Loaded {0} samples, {1} defined, from {2}",
        series.len(),
        series.count_defined(),
        path.display()
    );
    Ok(series)
}

pub(crate) fn read_series<R: Read>(
    mut reader: csv::Reader<R>,
    time_column: &ColumnSelector,
    value_column: &ColumnSelector,
    time_format: &str,
) -> Result<TimeSeries> {
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let time_index = time_column.position(&headers)?;
    let value_index = value_column.position(&headers)?;
    debug!("Time column {time_index}, value column {value_index}");

    let mut times = Vec::new();
    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        // Rows are numbered from the first data row, as a spreadsheet would show them
        let line = row + 2;
        let record = record.with_context(|| format!("reading row {line}"))?;
        let time = record
            .get(time_index)
            .with_context(|| format!("row {line} has no time column"))?;
        let value = record.get(value_index).unwrap_or_default();
        times.push(parse_timestamp(time, time_format).with_context(|| format!("row {line}"))?);
        values.push(parse_value(value).with_context(|| format!("row {line}"))?);
    }
    Ok(TimeSeries::new(times, values)?)
}
