//! Detection and quantification of plumes in aircraft trace gas time series.
//!
//! A plume is a short lived excursion of a concentration above its slowly
//! varying background. Two interchangeable detectors are provided:
//! - [ThresholdPlumeDetector] estimates the background from the series itself
//!   and flags excursions above a multiple of its spread.
//! - [WaveletPlumeDetector] reconstructs the series from a band of wavelet
//!   detail levels and flags samples of large reconstructed magnitude.
//!
//! Either detector's plumes can be integrated with [integrate()], or the whole
//! chain run with [run_pipeline].
pub mod background;
pub mod datatype;
pub mod detectors;
pub mod error;
pub mod integrate;
pub mod merge;
pub mod parameters;
pub mod transform;
pub(crate) mod window;

pub use background::estimate_background;
pub use datatype::{AreaResult, Interval, Plume, PlumeCandidate, PlumeSample, Sample, TimeSeries};
pub use detectors::{
    Detection, PlumeDetector, ThresholdPlumeDetector, WaveletPlumeDetector, detect,
    detect_wavelet, membership, plumes_from_samples,
};
pub use error::{PlumeDetectionError, PlumeDetectionResult};
pub use integrate::integrate;
pub use merge::merge;
pub use plumeid_common::{PlumeId, Real, Timestamp};

use parameters::IntegrationParameters;

/// The detection, and the area of every detected plume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub detection: Detection,
    pub areas: Vec<AreaResult>,
}

/// Detects plumes in `concentration` and integrates each of them.
///
/// The background a detector derives is the one subtracted before integration.
/// If the detector derives none, one is interpolated beneath the plumes.
#[tracing::instrument(skip_all, fields(len = concentration.len()))]
pub fn run_pipeline<D: PlumeDetector + ?Sized>(
    detector: &D,
    concentration: &TimeSeries,
    integration: &IntegrationParameters,
) -> PlumeDetectionResult<PipelineOutput> {
    let detection = detector.find_plumes(concentration)?;
    let areas = integrate(
        concentration,
        &detection.plumes,
        detection.background.as_ref(),
        integration.dx,
    )?;
    Ok(PipelineOutput { detection, areas })
}
