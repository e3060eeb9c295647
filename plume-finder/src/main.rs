mod config;
mod loader;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::ParameterFile;
use loader::{ColumnSelector, load_series, parse_timestamp};
use plume_detection::{
    PlumeDetector, ThresholdPlumeDetector, TimeSeries, WaveletPlumeDetector,
    parameters::{
        BackgroundParameters, IntegrationParameters, MergeParameters, ThresholdParameters,
        WaveletParameters,
    },
    run_pipeline,
};
use plumeid_common::{TracerEngine, TracerOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// cargo run --bin plume-finder -- --input C258_FGGA_FAAM.csv --value-column co2 --start "04/10/2021 09:40:00" --end "04/10/2021 13:30:00" --areas-output areas.csv threshold
// cargo run --bin plume-finder -- --input C258_FGGA_FAAM.csv --value-column co2 --plumes-output plumes.csv wavelet --levels 5,6,7,8

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Delimited text file with a header row
    #[clap(long)]
    input: PathBuf,

    /// Name, or zero-based position, of the timestamp column
    #[clap(long, default_value = "0")]
    time_column: String,

    /// Name, or zero-based position, of the concentration column
    #[clap(long, default_value = "1")]
    value_column: String,

    /// chrono format of the timestamps, also used for `--start` and `--end`
    #[clap(long, default_value = "%d/%m/%Y %H:%M:%S%.f")]
    time_format: String,

    /// Ignore samples before this time
    #[clap(long)]
    start: Option<String>,

    /// Ignore samples after this time
    #[clap(long)]
    end: Option<String>,

    /// JSON object of parameters, which take precedence over command line values
    #[clap(long)]
    config: Option<PathBuf>,

    /// Write the estimated background here, if the detector derives one
    #[clap(long)]
    background_output: Option<PathBuf>,

    /// Write the concentration samples of every plume here
    #[clap(long)]
    plumes_output: Option<PathBuf>,

    /// Write plume areas here, instead of stdout
    #[clap(long)]
    areas_output: Option<PathBuf>,

    #[clap(flatten)]
    merge: MergeParameters,

    #[clap(flatten)]
    integration: IntegrationParameters,

    #[clap(flatten)]
    tracer: TracerOptions,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Args)]
struct ThresholdArgs {
    #[clap(flatten)]
    background: BackgroundParameters,

    #[clap(flatten)]
    threshold: ThresholdParameters,
}

#[derive(Debug, Subcommand)]
enum Mode {
    #[clap(
        about = "Detects plumes as excursions above a background estimated from the series itself."
    )]
    Threshold(ThresholdArgs),
    #[clap(
        about = "Detects plumes from their magnitude in a band of Haar wavelet detail levels. No background is derived."
    )]
    Wavelet(WaveletParameters),
}

fn restrict(series: TimeSeries, args: &Cli) -> Result<TimeSeries> {
    if args.start.is_none() && args.end.is_none() {
        return Ok(series);
    }
    let parse = |text: &Option<String>| {
        text.as_deref()
            .map(|text| parse_timestamp(text, &args.time_format))
            .transpose()
    };
    let (Some(first), Some(last)) = (series.first_time(), series.last_time()) else {
        return Ok(series);
    };
    let start = parse(&args.start).context("parsing --start")?.unwrap_or(first);
    let end = parse(&args.end).context("parsing --end")?.unwrap_or(last);
    let restricted = series.between(start, end);
    info!(
        "Restricted to {0} of {1} samples between {start} and {end}",
        restricted.len(),
        series.len()
    );
    Ok(restricted)
}

fn build_detector(
    mode: &Mode,
    merge: MergeParameters,
    file: &ParameterFile,
) -> Result<Box<dyn PlumeDetector>> {
    let merge = file.apply(merge)?;
    Ok(match mode {
        Mode::Threshold(args) => {
            let detector = ThresholdPlumeDetector {
                background: file.apply(args.background.clone())?,
                threshold: file.apply(args.threshold.clone())?,
                merge,
            };
            debug!("{detector:?}");
            Box::new(detector)
        }
        Mode::Wavelet(wavelet) => {
            let detector = WaveletPlumeDetector::new(file.apply(wavelet.clone())?, merge);
            debug!("{detector:?}");
            Box::new(detector)
        }
    })
}

fn warn_unused_keys(file: &ParameterFile, path: &Path) -> Result<()> {
    let used = [
        serde_json::to_value(BackgroundParameters::default())?,
        serde_json::to_value(ThresholdParameters::default())?,
        serde_json::to_value(MergeParameters::default())?,
        serde_json::to_value(IntegrationParameters::default())?,
        serde_json::to_value(WaveletParameters::default())?,
    ];
    for key in file.unused_keys(&used) {
        warn!("Parameter '{key}' in {} is not recognised", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let tracer = TracerEngine::new(&args.tracer, env!("CARGO_BIN_NAME"))?;
    debug!("{0} args: {args:?}", tracer.service_name());

    let file = match &args.config {
        Some(path) => {
            let file = ParameterFile::load(path)?;
            warn_unused_keys(&file, path)?;
            file
        }
        None => ParameterFile::default(),
    };

    let detector = build_detector(&args.mode, args.merge.clone(), &file)?;
    let integration = file.apply(args.integration.clone())?;

    let concentration = load_series(
        &args.input,
        &ColumnSelector(args.time_column.clone()),
        &ColumnSelector(args.value_column.clone()),
        &args.time_format,
    )?;
    let concentration = restrict(concentration, &args)?;

    let result = run_pipeline(detector.as_ref(), &concentration, &integration)
        .context("detecting plumes")?;
    for (plume, area) in result.detection.plumes.iter().zip(&result.areas) {
        info!("{plume} area {0}", area.area);
    }

    if let Some(path) = &args.background_output {
        match &result.detection.background {
            Some(background) => output::write_background(path, background)?,
            None => warn!("Detector derives no background, not writing {}", path.display()),
        }
    }
    if let Some(path) = &args.plumes_output {
        output::write_rows(Some(path.as_path()), &result.detection.membership)?;
    }
    output::write_rows(args.areas_output.as_deref(), &result.areas)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn threshold_subcommand() {
        let cli = Cli::try_parse_from([
            "plume-finder",
            "--input",
            "flight.csv",
            "--plume-buffer",
            "5",
            "threshold",
            "--bg-sd-window",
            "60",
            "--plume-sd-starting",
            "1.5",
        ])
        .unwrap();
        assert_eq!(cli.merge.buffer_seconds, 5.);
        let Mode::Threshold(args) = cli.mode else {
            unreachable!("parsed as threshold mode");
        };
        assert_eq!(args.background.sd_window, 60);
        assert_eq!(args.background.mean_window, 660);
        assert_eq!(args.threshold.sd_starting, 1.5);
        assert_eq!(args.threshold.sd_threshold, 3.);
    }

    #[test]
    fn wavelet_subcommand() {
        let cli = Cli::try_parse_from([
            "plume-finder",
            "--input",
            "flight.csv",
            "wavelet",
            "--levels",
            "5,6,7",
            "--interpolate",
        ])
        .unwrap();
        let Mode::Wavelet(wavelet) = cli.mode else {
            unreachable!("parsed as wavelet mode");
        };
        assert_eq!(wavelet.levels, vec![5, 6, 7]);
        assert!(wavelet.interpolate);
        assert_eq!(wavelet.plume_threshold, 1.);
    }

    #[test]
    fn builds_either_detector() {
        let file = ParameterFile::default();
        let detector = build_detector(
            &Mode::Wavelet(WaveletParameters {
                levels: vec![2],
                ..Default::default()
            }),
            MergeParameters::default(),
            &file,
        );
        assert!(detector.is_ok());

        let detector = build_detector(
            &Mode::Threshold(ThresholdArgs {
                background: BackgroundParameters::default(),
                threshold: ThresholdParameters::default(),
            }),
            MergeParameters::default(),
            &file,
        );
        assert!(detector.is_ok());
    }
}
