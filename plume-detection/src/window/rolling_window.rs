use super::{Stats, Window};
use crate::Real;
use std::collections::VecDeque;

/// Where a window's output is reported relative to the samples it covers.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) enum Alignment {
    /// The output belongs to the newest sample in the window.
    #[default]
    Trailing,
    /// The output belongs to the middle sample. Windows of even size lean
    /// left, so a window of 4 at index i covers [i - 2, i + 1].
    Centre,
}

/// Fixed-size rolling window over a series which may contain missing (`NaN`) values.
/// Output is only available when the window is full and holds no missing values.
///
/// Mean and variance are updated online (Welford) as values enter and leave,
/// and recomputed from the window contents once every `size` pushes so that
/// rounding error cannot accumulate over long series.
#[derive(Default, Clone)]
pub(crate) struct RollingWindow {
    value: Real,
    // Over the values present, i.e. not missing
    count: usize,
    mean: Real,
    sum_of_squared_deviations: Real,
    pushes_since_resync: usize,
    size: usize,
    alignment: Alignment,
    missing: usize,
    // Length of the run of identical values ending at the newest value
    repeats: usize,
    window: VecDeque<Real>,
}

impl RollingWindow {
    /// `size` must be positive; parameter validation happens before windows are built.
    pub(crate) fn new(size: usize, alignment: Alignment) -> Self {
        debug_assert!(size > 0);
        RollingWindow {
            window: VecDeque::<Real>::with_capacity(size),
            size,
            alignment,
            ..Default::default()
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.window.len() == self.size
    }

    fn add(&mut self, value: Real) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as Real;
        self.sum_of_squared_deviations += delta * (value - self.mean);
    }

    fn remove(&mut self, value: Real) {
        self.count -= 1;
        if self.count == 0 {
            self.mean = 0.;
            self.sum_of_squared_deviations = 0.;
            return;
        }
        let delta = value - self.mean;
        self.mean -= delta / self.count as Real;
        self.sum_of_squared_deviations -= delta * (value - self.mean);
    }

    fn resync(&mut self) {
        let present = || self.window.iter().filter(|value| !value.is_nan());
        let count = present().count();
        let mean = if count == 0 {
            0.
        } else {
            present().sum::<Real>() / count as Real
        };
        self.sum_of_squared_deviations = present().map(|value| (value - mean).powi(2)).sum();
        self.mean = mean;
        self.count = count;
        self.pushes_since_resync = 0;
    }

    #[cfg(test)]
    pub(crate) fn test_mean(&self) -> Real {
        self.window.iter().sum::<Real>() / self.size as Real
    }

    #[cfg(test)]
    pub(crate) fn test_variance(&self) -> Real {
        let mean = self.test_mean();
        self.window.iter().map(|x| (x - mean).powi(2)).sum::<Real>() / (self.size as Real - 1.)
    }
}

impl Window for RollingWindow {
    type InputType = Real;
    type OutputType = Stats;

    fn push(&mut self, value: Real) -> bool {
        if self.is_full() {
            if let Some(old) = self.window.pop_front() {
                if old.is_nan() {
                    self.missing -= 1;
                } else {
                    self.remove(old);
                }
            }
        }
        self.repeats = if self.value == value { self.repeats + 1 } else { 1 };
        self.value = value;
        if value.is_nan() {
            self.missing += 1;
        } else {
            self.add(value);
        }
        self.window.push_back(value);
        self.pushes_since_resync += 1;
        if self.pushes_since_resync >= self.size {
            self.resync();
        }
        self.is_full()
    }

    fn output(&self) -> Option<Stats> {
        if !self.is_full() || self.missing > 0 {
            return None;
        }
        let size = self.size as Real;
        // Variance is undefined for a single sample
        let undefined_or = |variance: Real| if self.size < 2 { Real::NAN } else { variance };
        if self.repeats >= self.size {
            // Identical values: report them exactly rather than via the online updates
            return Some(Stats {
                value: self.value,
                mean: self.value,
                variance: undefined_or(0.),
            });
        }
        let variance = self.sum_of_squared_deviations / (size - 1.);
        Some(Stats {
            value: self.value,
            mean: self.mean,
            variance: undefined_or(variance.max(0.)),
        })
    }

    fn apply_time_shift(&self, index: usize) -> usize {
        match self.alignment {
            Alignment::Trailing => index,
            Alignment::Centre => index.saturating_sub((self.size - 1) / 2),
        }
    }
}
