pub mod threshold_detector;
pub mod wavelet_detector;

pub use threshold_detector::{ThresholdPlumeDetector, detect};
pub use wavelet_detector::{WaveletPlumeDetector, detect_wavelet};

use crate::{
    Interval, Plume, PlumeCandidate, PlumeSample, Real, TimeSeries,
    error::PlumeDetectionResult,
};
use itertools::Itertools;
use plumeid_common::Timestamp;

/// Everything a detector produces for one concentration series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// Ordered, non-overlapping plumes with identifiers `1..=N`.
    pub plumes: Vec<Plume>,
    /// The background the detector derived, if it derives one.
    pub background: Option<TimeSeries>,
    /// Raw concentration samples belonging to each plume.
    pub membership: Vec<PlumeSample>,
}

/// Produces ordered, non-overlapping, uniquely identified plume intervals.
/// Integration depends only on this capability, not on the detector behind it.
pub trait PlumeDetector {
    fn find_plumes(&self, concentration: &TimeSeries) -> PlumeDetectionResult<Detection>;
}

#[derive(Debug, Clone, Copy)]
struct Classified {
    index: usize,
    is_plume: bool,
    is_plume_starting: bool,
}

/// Dual threshold classification and grouping.
///
/// Samples are split into maximal runs of constant `signal > start_level`.
/// A run exceeding the start level becomes a candidate if at least one of its
/// samples also satisfies `signal > peak_level`. Missing values exceed nothing.
pub(crate) fn find_candidates(
    times: &[Timestamp],
    signal: &[Real],
    peak_levels: &[Real],
    start_levels: &[Real],
) -> Vec<PlumeCandidate> {
    let classified = signal
        .iter()
        .zip(peak_levels.iter().zip(start_levels))
        .enumerate()
        .map(|(index, (value, (peak, start)))| Classified {
            index,
            is_plume: value > peak,
            is_plume_starting: value > start,
        });

    let mut candidates = Vec::new();
    for (is_plume_starting, mut run) in &classified.chunk_by(|c| c.is_plume_starting) {
        if !is_plume_starting {
            continue;
        }
        let Some(first) = run.next() else {
            continue;
        };
        let (last, has_plume) = run.fold((first.index, first.is_plume), |(_, has_plume), c| {
            (c.index, has_plume || c.is_plume)
        });
        if let (true, Some(&start), Some(&end)) = (has_plume, times.get(first.index), times.get(last))
        {
            candidates.push(Interval::new(start, end));
        }
    }
    candidates.sort();
    candidates
}

/// Expands plumes into rows of the raw concentration samples inside each plume.
pub fn membership(concentration: &TimeSeries, plumes: &[Plume]) -> Vec<PlumeSample> {
    plumes
        .iter()
        .flat_map(|plume| {
            concentration
                .between(plume.start(), plume.end())
                .iter()
                .map(|sample| PlumeSample {
                    plume_id: plume.id,
                    time: sample.time,
                    concentration: sample.value,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Regroups membership rows into plume intervals, one per consecutive run of
/// rows sharing a plume identifier.
pub fn plumes_from_samples(samples: &[PlumeSample]) -> Vec<Plume> {
    samples
        .iter()
        .chunk_by(|sample| sample.plume_id)
        .into_iter()
        .filter_map(|(id, mut rows)| {
            let first = rows.next()?;
            let (start, end) = rows.fold((first.time, first.time), |(start, end), row| {
                (start.min(row.time), end.max(row.time))
            });
            Some(Plume {
                id,
                interval: Interval::new(start, end),
            })
        })
        .collect()
}
