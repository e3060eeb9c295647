use super::{Detection, PlumeDetector, find_candidates, membership};
use crate::{
    PlumeCandidate, Real, TimeSeries,
    background::estimate_background,
    error::PlumeDetectionResult,
    merge::merge,
    parameters::{BackgroundParameters, MergeParameters, ThresholdParameters},
};
use tracing::{debug, info, warn};

/// Identifies plume candidates as excursions above the background.
///
/// The scale of an excursion is the standard deviation of the whole background
/// series. A sample is a plume sample when it exceeds the background by more than
/// `sd_threshold` scales, and a plume-starting sample when it exceeds it by more
/// than `sd_starting` scales. Runs of plume-starting samples containing at least
/// one plume sample are candidates.
///
/// Where the background is missing no sample qualifies, and if the background has
/// fewer than two defined values there is no scale and so no candidates at all.
#[tracing::instrument(skip_all, fields(len = concentration.len(), num_candidates))]
pub fn detect(
    concentration: &TimeSeries,
    background: &TimeSeries,
    parameters: &ThresholdParameters,
) -> PlumeDetectionResult<Vec<PlumeCandidate>> {
    concentration.ensure_aligned(background)?;

    if parameters.sd_starting >= parameters.sd_threshold {
        warn!(
            "Starting threshold {0} is not below plume threshold {1}, plumes cannot extend beyond their peaks",
            parameters.sd_starting, parameters.sd_threshold
        );
    }

    let scale = background.std_dev();
    if scale.is_nan() {
        debug!("Background has no standard deviation, no plumes can be detected");
    }
    let levels = |multiple: Real| -> Vec<Real> {
        background
            .values()
            .iter()
            .map(|bg| bg + multiple * scale)
            .collect()
    };

    let candidates = find_candidates(
        concentration.times(),
        concentration.values(),
        &levels(parameters.sd_threshold),
        &levels(parameters.sd_starting),
    );
    tracing::Span::current().record("num_candidates", candidates.len());
    Ok(candidates)
}

/// Finds plumes against a background estimated from the concentration itself.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ThresholdPlumeDetector {
    pub background: BackgroundParameters,
    pub threshold: ThresholdParameters,
    pub merge: MergeParameters,
}

impl PlumeDetector for ThresholdPlumeDetector {
    fn find_plumes(&self, concentration: &TimeSeries) -> PlumeDetectionResult<Detection> {
        let background = estimate_background(concentration, &self.background)?;
        let candidates = detect(concentration, &background, &self.threshold)?;
        let plumes = merge(&candidates, self.merge.buffer());
        info!("Threshold detection found {0} plumes", plumes.len());

        let membership = membership(concentration, &plumes);
        Ok(Detection {
            plumes,
            background: Some(background),
            membership,
        })
    }
}
