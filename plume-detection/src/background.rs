use crate::{
    Real, TimeSeries,
    datatype::timeseries::{forward_fill, interpolate_inside, std_dev},
    error::PlumeDetectionResult,
    parameters::BackgroundParameters,
    window::{Alignment, RollingWindow, Statistic, rolling},
};
use tracing::{debug, info};

/// Derives the slowly varying background of a concentration series.
///
/// A sample is background when it is defined and the centred rolling standard
/// deviation of the (forward filled) series, itself smoothed by a centred rolling
/// mean of the same size, is at most `sd_threshold`. Background samples are then
/// linearly interpolated between the first and last of them, and smoothed by a
/// trailing rolling mean of `mean_window` samples.
///
/// The result is aligned to `concentration`. It is missing outside the span of
/// background samples, and for the first `mean_window - 1` samples of that span,
/// where the trailing mean has no full window.
#[tracing::instrument(skip_all, fields(len = concentration.len(), num_background))]
pub fn estimate_background(
    concentration: &TimeSeries,
    parameters: &BackgroundParameters,
) -> PlumeDetectionResult<TimeSeries> {
    parameters.validate()?;

    let values = concentration.values();
    let rolling_sd = rolling(
        &forward_fill(values),
        RollingWindow::new(parameters.sd_window, Alignment::Centre),
        Statistic::StdDev,
    );
    let smoothed_sd = rolling(
        &rolling_sd,
        RollingWindow::new(parameters.sd_window, Alignment::Centre),
        Statistic::Mean,
    );

    let background_only: Vec<Real> = values
        .iter()
        .zip(&smoothed_sd)
        .map(|(&value, &sd)| {
            if !value.is_nan() && sd <= parameters.sd_threshold {
                value
            } else {
                Real::NAN
            }
        })
        .collect();

    let num_background = background_only.iter().filter(|v| !v.is_nan()).count();
    tracing::Span::current().record("num_background", num_background);
    if num_background == 0 {
        debug!("No background samples identified");
    } else {
        let mean = background_only.iter().filter(|v| !v.is_nan()).sum::<Real>()
            / num_background as Real;
        info!(
            "Background: {num_background} samples, mean {mean}, standard deviation {}",
            std_dev(&background_only)
        );
    }

    let background = rolling(
        &interpolate_inside(&background_only),
        RollingWindow::new(parameters.mean_window, Alignment::Trailing),
        Statistic::Mean,
    );
    Ok(concentration.with_values(background))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{datatype::timeseries::test_utils::series, error::PlumeDetectionError};
    use assert_approx_eq::assert_approx_eq;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    fn parameters(sd_window: usize, sd_threshold: Real, mean_window: usize) -> BackgroundParameters {
        BackgroundParameters {
            sd_window,
            sd_threshold,
            mean_window,
        }
    }

    #[test]
    fn aligned_to_input() {
        let concentration = series(&[1.0, 2.0, Real::NAN, 4.0, 5.0, 6.0, 7.0]);
        let background = estimate_background(&concentration, &parameters(3, 0.5, 2)).unwrap();
        assert_eq!(background.len(), concentration.len());
        assert!(background.ensure_aligned(&concentration).is_ok());
    }

    #[test]
    fn constant_series_is_its_own_background() {
        let concentration = series(&[2.5; 20]);
        let background = estimate_background(&concentration, &parameters(3, 0.5, 4)).unwrap();
        // Background samples span [2, 17]: one sample lost to each centred window
        // at either end. The trailing mean then needs 4 samples.
        for (index, value) in background.values().iter().enumerate() {
            if (5..=17).contains(&index) {
                assert_eq!(*value, 2.5);
            } else {
                assert!(value.is_nan(), "index {index} should be missing");
            }
        }
    }

    #[test]
    fn defined_inside_background_span() {
        let mut rng = StdRng::seed_from_u64(3);
        let noise = Normal::new(0.0, 0.05).unwrap();
        let mut values: Vec<Real> = (0..200).map(|_| 400.0 + noise.sample(&mut rng)).collect();
        // A plume in the middle, and some missing data inside it
        for (offset, value) in values[90..110].iter_mut().enumerate() {
            *value += 20.0 * (1.0 - (offset as Real - 10.0).abs() / 10.0);
        }
        values[100] = Real::NAN;
        let concentration = series(&values);

        let background = estimate_background(&concentration, &parameters(5, 0.5, 7)).unwrap();
        let defined: Vec<usize> = background
            .values()
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(i, _)| i)
            .collect();
        let first = *defined.first().unwrap();
        let last = *defined.last().unwrap();
        // No internal gaps once the trailing mean has a full window
        assert_eq!(defined.len(), last - first + 1);
        assert!(first < 90);
        assert!(last > 110);
        for &index in &defined {
            assert_approx_eq!(background.values()[index], 400.0, 1.0);
        }
    }

    #[test]
    fn all_missing() {
        let concentration = series(&[Real::NAN; 30]);
        let background = estimate_background(&concentration, &parameters(3, 0.5, 2)).unwrap();
        assert_eq!(background.len(), 30);
        assert!(background.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn all_noisy() {
        let values: Vec<Real> = (0..50).map(|i| if i % 2 == 0 { 0.0 } else { 10.0 }).collect();
        let background = estimate_background(&series(&values), &parameters(3, 0.5, 2)).unwrap();
        assert!(background.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn empty_series() {
        let background = estimate_background(&series(&[]), &BackgroundParameters::default()).unwrap();
        assert!(background.is_empty());
    }

    #[test]
    fn zero_window() {
        let result = estimate_background(&series(&[1.0; 5]), &parameters(0, 0.5, 2));
        assert_eq!(result, Err(PlumeDetectionError::ZeroWindow("bg_sd_window")));
    }
}
