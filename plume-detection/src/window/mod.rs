pub(crate) mod rolling_window;

pub(crate) use rolling_window::{Alignment, RollingWindow};

use crate::Real;
use std::fmt::{Display, Formatter};

/// Descriptive statistics of a full window.
#[derive(Default, Clone, Debug, PartialEq)]
pub(crate) struct Stats {
    pub(crate) value: Real,
    pub(crate) mean: Real,
    pub(crate) variance: Real,
}

impl Stats {
    pub(crate) fn std_dev(&self) -> Real {
        self.variance.sqrt()
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({0}, {1}, {2})", self.value, self.mean, self.variance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Statistic {
    Mean,
    StdDev,
}

impl Statistic {
    fn of(&self, stats: &Stats) -> Real {
        match self {
            Statistic::Mean => stats.mean,
            Statistic::StdDev => stats.std_dev(),
        }
    }
}

pub(crate) trait Window: Clone {
    type InputType: Copy;
    type OutputType;

    /// Adds a value, returns true if the window is full.
    fn push(&mut self, value: Self::InputType) -> bool;
    fn output(&self) -> Option<Self::OutputType>;
    /// Maps the index of the most recently pushed value to the index the output belongs to.
    fn apply_time_shift(&self, index: usize) -> usize;
}

#[derive(Clone)]
pub(crate) struct WindowIter<I, W>
where
    I: Iterator<Item = (usize, W::InputType)>,
    W: Window,
{
    window_function: W,
    source: I,
}

impl<I, W> WindowIter<I, W>
where
    I: Iterator<Item = (usize, W::InputType)>,
    W: Window,
{
    pub(crate) fn new(source: I, window_function: W) -> Self {
        WindowIter {
            source,
            window_function,
        }
    }

    #[cfg(test)]
    pub(crate) fn get_window(&self) -> &W {
        &self.window_function
    }
}

impl<I, W> Iterator for WindowIter<I, W>
where
    I: Iterator<Item = (usize, W::InputType)>,
    W: Window,
{
    type Item = (usize, W::OutputType);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, value) = self.source.next()?;
            if self.window_function.push(value) {
                if let Some(output) = self.window_function.output() {
                    return Some((self.window_function.apply_time_shift(index), output));
                }
            }
        }
    }
}

pub(crate) trait WindowFilter<I, W>
where
    I: Iterator<Item = (usize, W::InputType)>,
    W: Window,
{
    fn window(self, window: W) -> WindowIter<I, W>;
}

impl<I, W> WindowFilter<I, W> for I
where
    I: Iterator<Item = (usize, W::InputType)>,
    W: Window,
{
    fn window(self, window: W) -> WindowIter<I, W> {
        WindowIter::new(self, window)
    }
}

/// Applies a rolling statistic to `values`, placing each result at the index
/// determined by the window's alignment. Indices with no full, complete window
/// are `NaN`.
pub(crate) fn rolling(values: &[Real], window: RollingWindow, statistic: Statistic) -> Vec<Real> {
    let mut result = vec![Real::NAN; values.len()];
    for (index, stats) in values.iter().copied().enumerate().window(window) {
        if let Some(slot) = result.get_mut(index) {
            *slot = statistic.of(&stats);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const NAN: Real = Real::NAN;

    #[test]
    fn trailing_mean() {
        let data = [4.0, 3.0, 2.0, 5.0, 6.0];
        let output = rolling(&data, RollingWindow::new(3, Alignment::Trailing), Statistic::Mean);
        assert!(output[0].is_nan());
        assert!(output[1].is_nan());
        assert_approx_eq!(output[2], 3.0);
        assert_approx_eq!(output[3], 10.0 / 3.0);
        assert_approx_eq!(output[4], 13.0 / 3.0);
    }

    #[test]
    fn centred_odd_window() {
        let data = [4.0, 3.0, 2.0, 5.0, 6.0];
        let output = rolling(&data, RollingWindow::new(3, Alignment::Centre), Statistic::Mean);
        assert!(output[0].is_nan());
        assert_approx_eq!(output[1], 3.0);
        assert_approx_eq!(output[2], 10.0 / 3.0);
        assert_approx_eq!(output[3], 13.0 / 3.0);
        assert!(output[4].is_nan());
    }

    #[test]
    fn centred_even_window_leans_left() {
        // A centred window of 4 at index i covers [i - 2, i + 1]
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let output = rolling(&data, RollingWindow::new(4, Alignment::Centre), Statistic::Mean);
        assert!(output[0].is_nan());
        assert!(output[1].is_nan());
        assert_approx_eq!(output[2], 2.5);
        assert_approx_eq!(output[3], 3.5);
        assert_approx_eq!(output[4], 4.5);
        assert!(output[5].is_nan());
    }

    #[test]
    fn missing_value_spoils_window() {
        let data = [1.0, 2.0, NAN, 4.0, 5.0, 6.0, 7.0];
        let output = rolling(&data, RollingWindow::new(2, Alignment::Trailing), Statistic::Mean);
        assert_approx_eq!(output[1], 1.5);
        assert!(output[2].is_nan());
        assert!(output[3].is_nan());
        assert_approx_eq!(output[4], 4.5);
        assert_approx_eq!(output[6], 6.5);
    }

    #[test]
    fn std_dev_matches_sample_definition() {
        let data = [4.0, 3.0, 1.0, 5.0, 3.0];
        let output = rolling(&data, RollingWindow::new(3, Alignment::Trailing), Statistic::StdDev);
        let expected = (((4.0 as Real - 8. / 3.).powi(2)
            + (3.0 as Real - 8. / 3.).powi(2)
            + (1.0 as Real - 8. / 3.).powi(2))
            / 2.)
            .sqrt();
        assert_approx_eq!(output[2], expected);
        assert_approx_eq!(output[3], 2.0);
        assert_approx_eq!(output[4], 2.0);
    }

    #[test]
    fn no_data() {
        let output = rolling(&[], RollingWindow::new(3, Alignment::Centre), Statistic::Mean);
        assert!(output.is_empty());
    }

    #[test]
    fn insufficient_data() {
        let output = rolling(&[4.0, 3.0], RollingWindow::new(3, Alignment::Centre), Statistic::Mean);
        assert!(output.iter().all(|v| v.is_nan()));
    }
}
