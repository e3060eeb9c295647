use anyhow::{Context, Result};
use plume_detection::{Real, TimeSeries, Timestamp};
use serde::Serialize;
use std::{io::Write, path::Path};
use tracing::info;

#[derive(Serialize)]
struct BackgroundRow {
    time: Timestamp,
    background: Real,
}

/// Writes `rows` as CSV with a header row, to `path` or to stdout if none is given.
pub(crate) fn write_rows<T, I>(path: Option<&Path>, rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    match path {
        Some(path) => {
            let writer = csv::Writer::from_path(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let count = serialize_all(writer, rows)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote {count} rows to {}", path.display());
        }
        None => {
            serialize_all(csv::Writer::from_writer(std::io::stdout().lock()), rows)
                .context("writing to stdout")?;
        }
    }
    Ok(())
}

fn serialize_all<W: Write, T: Serialize>(
    mut writer: csv::Writer<W>,
    rows: impl IntoIterator<Item = T>,
) -> Result<usize> {
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

pub(crate) fn write_background(path: &Path, background: &TimeSeries) -> Result<()> {
    write_rows(
        Some(path),
        background.iter().map(|sample| BackgroundRow {
            time: sample.time,
            background: sample.value,
        }),
    )
}
