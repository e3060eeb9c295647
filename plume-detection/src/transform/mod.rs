//! Multi-resolution decomposition of a signal into one approximation
//! component and a number of detail components.
//!
//! Components are indexed as follows:
//! - `0`: the approximation at the coarsest level,
//! - `1..=level`: detail components, from the coarsest (`1`) to the finest (`level`).
pub(crate) mod haar;

pub use haar::Haar;

use crate::Real;

pub trait MultiResolution {
    /// The deepest decomposition level which is meaningful for a signal of length `len`.
    fn max_level(&self, len: usize) -> usize;

    /// Decomposes `signal` into `level + 1` components.
    fn decompose(&self, signal: &[Real], level: usize) -> Vec<Vec<Real>>;

    /// Inverts [MultiResolution::decompose]. The result may be longer than the
    /// original signal, depending on the boundary handling of the transform.
    fn reconstruct(&self, components: &[Vec<Real>]) -> Vec<Real>;
}
