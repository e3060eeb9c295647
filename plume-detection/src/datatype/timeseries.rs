use crate::{
    Real,
    error::{Misalignment, PlumeDetectionError, PlumeDetectionResult},
};
use plumeid_common::Timestamp;

/// A single (timestamp, value) pair. A missing value is `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: Timestamp,
    pub value: Real,
}

impl Sample {
    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

/// An ordered, strictly increasing sequence of samples.
/// Gaps are represented as `NaN` values at their expected timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    times: Vec<Timestamp>,
    values: Vec<Real>,
}

impl TimeSeries {
    pub fn new(times: Vec<Timestamp>, values: Vec<Real>) -> PlumeDetectionResult<Self> {
        if times.len() != values.len() {
            return Err(PlumeDetectionError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if let Some(index) = times
            .windows(2)
            .position(|pair| matches!(pair, [prev, next] if next <= prev))
        {
            return Err(PlumeDetectionError::NonIncreasingTimestamps { index: index + 1 });
        }
        Ok(Self { times, values })
    }

    pub fn from_samples<I: IntoIterator<Item = Sample>>(samples: I) -> PlumeDetectionResult<Self> {
        let (times, values) = samples.into_iter().map(|s| (s.time, s.value)).unzip();
        Self::new(times, values)
    }

    /// Creates a series sharing this series' index. `values` must be of the same length.
    pub(crate) fn with_values(&self, values: Vec<Real>) -> Self {
        debug_assert_eq!(self.times.len(), values.len());
        Self {
            times: self.times.clone(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.times
            .iter()
            .zip(&self.values)
            .map(|(&time, &value)| Sample { time, value })
    }

    pub fn first_time(&self) -> Option<Timestamp> {
        self.times.first().copied()
    }

    pub fn last_time(&self) -> Option<Timestamp> {
        self.times.last().copied()
    }

    pub fn count_defined(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Returns an error unless both series share exactly the same ordered timestamps.
    pub fn ensure_aligned(&self, other: &TimeSeries) -> PlumeDetectionResult<()> {
        if self.len() != other.len() {
            return Err(PlumeDetectionError::Misaligned(Misalignment::Length {
                left: self.len(),
                right: other.len(),
            }));
        }
        match self
            .times
            .iter()
            .zip(&other.times)
            .enumerate()
            .find(|(_, (left, right))| left != right)
        {
            Some((index, (&left, &right))) => Err(PlumeDetectionError::Misaligned(
                Misalignment::Timestamp { index, left, right },
            )),
            None => Ok(()),
        }
    }

    /// Element-wise `self - other`, after checking alignment.
    pub fn subtract(&self, other: &TimeSeries) -> PlumeDetectionResult<TimeSeries> {
        self.ensure_aligned(other)?;
        Ok(self.with_values(
            self.values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| a - b)
                .collect(),
        ))
    }

    /// The samples whose timestamps lie in `[start, end]`.
    pub fn between(&self, start: Timestamp, end: Timestamp) -> TimeSeries {
        let from = self.times.partition_point(|t| *t < start);
        let to = self.times.partition_point(|t| *t <= end).max(from);
        Self {
            times: self.times[from..to].to_vec(),
            values: self.values[from..to].to_vec(),
        }
    }

    /// The last `n` samples, or the whole series if it is shorter.
    pub fn tail(&self, n: usize) -> TimeSeries {
        let from = self.len().saturating_sub(n);
        Self {
            times: self.times[from..].to_vec(),
            values: self.values[from..].to_vec(),
        }
    }

    /// Sample standard deviation (ddof = 1) over the defined values.
    /// `NaN` if fewer than two values are defined.
    pub fn std_dev(&self) -> Real {
        std_dev(&self.values)
    }
}

pub(crate) fn std_dev(values: &[Real]) -> Real {
    let defined = values.iter().copied().filter(|v| !v.is_nan());
    let (count, sum) = defined.clone().fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count < 2 {
        return Real::NAN;
    }
    let mean = sum / count as Real;
    let sum_of_squares: Real = defined.map(|v| (v - mean).powi(2)).sum();
    (sum_of_squares / (count - 1) as Real).sqrt()
}

/// Replaces each missing value with the last defined value before it.
/// Leading missing values are left as they are.
pub(crate) fn forward_fill(values: &[Real]) -> Vec<Real> {
    let mut last = Real::NAN;
    values
        .iter()
        .map(|&v| {
            if !v.is_nan() {
                last = v;
            }
            last
        })
        .collect()
}

/// Linearly interpolates missing values by position, only between the first
/// and last defined values. Missing values outside that span are kept.
pub(crate) fn interpolate_inside(values: &[Real]) -> Vec<Real> {
    let mut result = values.to_vec();
    let mut previous: Option<usize> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        if let Some(prev) = previous {
            let gap = index - prev;
            if gap > 1 {
                let from = values[prev];
                let step = (value - from) / gap as Real;
                for (offset, slot) in result[prev + 1..index].iter_mut().enumerate() {
                    *slot = from + step * (offset + 1) as Real;
                }
            }
        }
        previous = Some(index);
    }
    result
}


#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const NAN: Real = Real::NAN;

    #[test]
    fn length_mismatch() {
        let result = TimeSeries::new(vec![time_at(0), time_at(1)], vec![1.0]);
        assert_eq!(
            result,
            Err(PlumeDetectionError::LengthMismatch {
                times: 2,
                values: 1
            })
        );
    }

    #[test]
    fn repeated_timestamp() {
        let result = TimeSeries::new(vec![time_at(0), time_at(1), time_at(1)], vec![1.0; 3]);
        assert_eq!(
            result,
            Err(PlumeDetectionError::NonIncreasingTimestamps { index: 2 })
        );
    }

    #[test]
    fn aligned() {
        let a = series(&[1.0, 2.0, 3.0]);
        let b = series(&[0.0, 0.0, NAN]);
        assert!(a.ensure_aligned(&b).is_ok());
    }

    #[test]
    fn misaligned_length() {
        let a = series(&[1.0, 2.0, 3.0]);
        let b = series(&[1.0, 2.0]);
        assert_eq!(
            a.ensure_aligned(&b),
            Err(PlumeDetectionError::Misaligned(Misalignment::Length {
                left: 3,
                right: 2
            }))
        );
    }

    #[test]
    fn misaligned_timestamp() {
        let a = series(&[1.0, 2.0, 3.0]);
        let b = TimeSeries::new(vec![time_at(0), time_at(2), time_at(3)], vec![0.0; 3]).unwrap();
        assert!(matches!(
            a.ensure_aligned(&b),
            Err(PlumeDetectionError::Misaligned(Misalignment::Timestamp {
                index: 1,
                ..
            }))
        ));
        assert!(a.subtract(&b).is_err());
    }

    #[test]
    fn forward_fill_keeps_leading_missing() {
        let filled = forward_fill(&[NAN, 1.0, NAN, NAN, 3.0, NAN]);
        assert!(filled[0].is_nan());
        assert_eq!(&filled[1..], &[1.0, 1.0, 1.0, 3.0, 3.0]);
    }

    #[test]
    fn interpolate_only_inside() {
        let interpolated = interpolate_inside(&[NAN, 1.0, NAN, NAN, 4.0, NAN]);
        assert!(interpolated[0].is_nan());
        assert_approx_eq!(interpolated[1], 1.0);
        assert_approx_eq!(interpolated[2], 2.0);
        assert_approx_eq!(interpolated[3], 3.0);
        assert_approx_eq!(interpolated[4], 4.0);
        assert!(interpolated[5].is_nan());
    }

    #[test]
    fn interpolate_all_missing() {
        let interpolated = interpolate_inside(&[NAN, NAN]);
        assert!(interpolated.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn std_dev_skips_missing() {
        let s = series(&[2.0, NAN, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // Sample standard deviation of 2,4,4,4,5,5,7,9
        assert_approx_eq!(s.std_dev(), (32.0 as Real / 7.0).sqrt());
    }

    #[test]
    fn std_dev_undefined() {
        assert!(series(&[]).std_dev().is_nan());
        assert!(series(&[1.0, NAN]).std_dev().is_nan());
    }

    #[test]
    fn between_is_inclusive() {
        let s = series(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let sliced = s.between(time_at(1), time_at(3));
        assert_eq!(sliced.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(sliced.first_time(), Some(time_at(1)));
        assert!(s.between(time_at(3), time_at(1)).is_empty());
    }

    #[test]
    fn tail_selection() {
        let s = series(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(s.tail(2).values(), &[2.0, 3.0]);
        assert_eq!(s.tail(10).len(), 4);
        assert_eq!(s.tail(2).first_time(), Some(time_at(2)));
    }
}
