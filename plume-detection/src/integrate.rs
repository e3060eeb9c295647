use crate::{
    AreaResult, Plume, Real, TimeSeries, datatype::timeseries::interpolate_inside,
    error::PlumeDetectionResult,
};
use rayon::prelude::*;
use std::borrow::Cow;
use tracing::debug;

/// Integrates the background-subtracted concentration over each plume.
///
/// If `background` is not given, one is built from the concentration with the
/// interior of every plume masked out and linearly interpolated across, so each
/// plume sits on the straight line between its endpoint concentrations.
///
/// Areas are computed with the trapezoidal rule over the residual samples lying
/// inside each plume, inclusive of both ends, with a fixed step of `dx`. A missing
/// residual inside a plume makes its area missing. Results are in plume order.
#[tracing::instrument(skip_all, fields(num_plumes = plumes.len(), dx = dx))]
pub fn integrate(
    concentration: &TimeSeries,
    plumes: &[Plume],
    background: Option<&TimeSeries>,
    dx: Real,
) -> PlumeDetectionResult<Vec<AreaResult>> {
    let background = match background {
        Some(background) => Cow::Borrowed(background),
        None => {
            debug!("No background supplied, interpolating beneath plumes");
            Cow::Owned(plume_excluded_background(concentration, plumes))
        }
    };
    let residual = concentration.subtract(&background)?;

    Ok(plumes
        .par_iter()
        .map(|plume| AreaResult {
            plume_id: plume.id,
            start: plume.start(),
            end: plume.end(),
            area: trapezoid(residual.between(plume.start(), plume.end()).values(), dx),
        })
        .collect())
}

/// The concentration with samples strictly inside any plume replaced by
/// interpolation between the surrounding samples.
pub fn plume_excluded_background(concentration: &TimeSeries, plumes: &[Plume]) -> TimeSeries {
    let masked: Vec<Real> = concentration
        .iter()
        .map(|sample| {
            let inside = plumes
                .iter()
                .any(|plume| plume.start() < sample.time && sample.time < plume.end());
            if inside { Real::NAN } else { sample.value }
        })
        .collect();
    concentration.with_values(interpolate_inside(&masked))
}

/// Trapezoidal rule with constant spacing. Fewer than two samples have no area.
fn trapezoid(values: &[Real], dx: Real) -> Real {
    values
        .windows(2)
        .map(|pair| match pair {
            [left, right] => (left + right) / 2.,
            _ => 0.,
        })
        .sum::<Real>()
        * dx
}
