use super::MultiResolution;
use crate::Real;
use dwt::{Operation, Transform, wavelet};

/// Orthogonal discrete wavelet transform with the Haar basis, computed by [dwt]
/// one stage at a time.
///
/// Odd length stages are extended symmetrically, by repeating the final sample,
/// so a stage of length `n` has `(n + 1) / 2` coefficients and reconstructs to
/// an even length.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Haar;

impl Haar {
    /// Splits one stage into its approximation and detail halves.
    fn forward(signal: &[Real]) -> (Vec<Real>, Vec<Real>) {
        let mut stage = signal.to_vec();
        if stage.len() % 2 == 1 {
            stage.extend(signal.last().copied());
        }
        stage.transform(Operation::Forward, &wavelet::Haar::new(), 1);
        let detail = stage.split_off(stage.len() / 2);
        (stage, detail)
    }

    fn inverse(approximation: &[Real], detail: &[Real]) -> Vec<Real> {
        let mut stage = [approximation, detail].concat();
        stage.transform(Operation::Inverse, &wavelet::Haar::new(), 1);
        stage
    }
}

impl MultiResolution for Haar {
    fn max_level(&self, len: usize) -> usize {
        // floor(log2(len / (filter_length - 1))) with a filter of length 2.
        // dwt itself only transforms lengths divisible by 2^level, hence the
        // stage by stage decomposition below.
        len.checked_ilog2().unwrap_or_default() as usize
    }

    fn decompose(&self, signal: &[Real], level: usize) -> Vec<Vec<Real>> {
        let mut approximation = signal.to_vec();
        let mut details = Vec::with_capacity(level);
        for _ in 0..level {
            let (next, detail) = Self::forward(&approximation);
            details.push(detail);
            approximation = next;
        }
        std::iter::once(approximation)
            .chain(details.into_iter().rev())
            .collect()
    }

    fn reconstruct(&self, components: &[Vec<Real>]) -> Vec<Real> {
        let Some((approximation, details)) = components.split_first() else {
            return Vec::new();
        };
        details
            .iter()
            .fold(approximation.clone(), |mut approximation, detail| {
                // Drop the sample introduced by symmetric extension of an odd stage
                if approximation.len() == detail.len() + 1 {
                    approximation.pop();
                }
                Self::inverse(&approximation, detail)
            })
    }
}
