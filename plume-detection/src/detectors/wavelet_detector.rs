use super::{Detection, PlumeDetector, find_candidates, membership};
use crate::{
    Plume, PlumeSample, Real, TimeSeries,
    datatype::timeseries::{forward_fill, interpolate_inside},
    error::PlumeDetectionResult,
    merge::merge,
    parameters::{MergeParameters, WaveletParameters},
    transform::{Haar, MultiResolution},
};
use std::cmp::Ordering;
use tracing::{debug, info};

/// The magnitude of a band-limited reconstruction, paired with the part of the
/// concentration series it is aligned to.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub concentration: TimeSeries,
    pub magnitude: TimeSeries,
}

/// Reconstructs `concentration` from the requested detail levels only, and
/// takes the absolute value.
///
/// The series is decomposed to the deepest level the transform allows. The
/// approximation and every detail level not requested are zeroed before
/// reconstruction. If the reconstruction is shorter than the input, the input
/// is trimmed from the front; if longer, the reconstruction is truncated.
#[tracing::instrument(skip_all, fields(len = concentration.len(), max_level))]
pub fn reconstruct_magnitude<T: MultiResolution>(
    transform: &T,
    concentration: &TimeSeries,
    parameters: &WaveletParameters,
) -> PlumeDetectionResult<Reconstruction> {
    let max_level = transform.max_level(concentration.len());
    tracing::Span::current().record("max_level", max_level);
    parameters.validate_levels(max_level)?;

    let signal = if parameters.interpolate {
        forward_fill(&interpolate_inside(concentration.values()))
    } else {
        concentration.values().to_vec()
    };

    let levels = parameters.level_set();
    let mut components = transform.decompose(&signal, max_level);
    for (level, component) in components.iter_mut().enumerate() {
        if !levels.contains(&level) {
            component.fill(0.);
        }
    }
    let mut magnitude: Vec<Real> = transform
        .reconstruct(&components)
        .into_iter()
        .map(Real::abs)
        .collect();

    let concentration = match magnitude.len().cmp(&concentration.len()) {
        Ordering::Less => {
            debug!(
                "Reconstruction has {0} samples, keeping the last {0} of {1}",
                magnitude.len(),
                concentration.len()
            );
            concentration.tail(magnitude.len())
        }
        Ordering::Greater => {
            debug!(
                "Reconstruction has {0} samples, truncating to {1}",
                magnitude.len(),
                concentration.len()
            );
            magnitude.truncate(concentration.len());
            concentration.clone()
        }
        Ordering::Equal => concentration.clone(),
    };
    let magnitude = concentration.with_values(magnitude);
    Ok(Reconstruction {
        concentration,
        magnitude,
    })
}

fn find_wavelet_plumes<T: MultiResolution>(
    transform: &T,
    concentration: &TimeSeries,
    wavelet: &WaveletParameters,
    merge_parameters: &MergeParameters,
) -> PlumeDetectionResult<(Reconstruction, Vec<Plume>)> {
    let reconstruction = reconstruct_magnitude(transform, concentration, wavelet)?;
    let len = reconstruction.magnitude.len();
    let candidates = find_candidates(
        reconstruction.magnitude.times(),
        reconstruction.magnitude.values(),
        &vec![wavelet.plume_threshold; len],
        &vec![wavelet.plume_starting; len],
    );
    let plumes = merge(&candidates, merge_parameters.buffer());
    info!("Wavelet detection found {0} plumes", plumes.len());
    Ok((reconstruction, plumes))
}

/// Finds plumes in the band-limited reconstruction of `concentration` under the
/// Haar basis, and returns the raw concentration samples belonging to each.
pub fn detect_wavelet(
    concentration: &TimeSeries,
    wavelet: &WaveletParameters,
    merge_parameters: &MergeParameters,
) -> PlumeDetectionResult<Vec<PlumeSample>> {
    let (reconstruction, plumes) =
        find_wavelet_plumes(&Haar, concentration, wavelet, merge_parameters)?;
    Ok(membership(&reconstruction.concentration, &plumes))
}

/// Finds plumes from their signature across a band of wavelet detail levels.
/// No background is derived.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct WaveletPlumeDetector<T = Haar> {
    pub transform: T,
    pub wavelet: WaveletParameters,
    pub merge: MergeParameters,
}

impl WaveletPlumeDetector {
    pub fn new(wavelet: WaveletParameters, merge: MergeParameters) -> Self {
        Self {
            transform: Haar,
            wavelet,
            merge,
        }
    }
}

impl<T: MultiResolution> PlumeDetector for WaveletPlumeDetector<T> {
    fn find_plumes(&self, concentration: &TimeSeries) -> PlumeDetectionResult<Detection> {
        let (reconstruction, plumes) =
            find_wavelet_plumes(&self.transform, concentration, &self.wavelet, &self.merge)?;
        let membership = membership(&reconstruction.concentration, &plumes);
        Ok(Detection {
            plumes,
            background: None,
            membership,
        })
    }
}
