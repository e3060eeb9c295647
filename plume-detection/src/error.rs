use plumeid_common::Timestamp;
use thiserror::Error;

pub type PlumeDetectionResult<T> = Result<T, PlumeDetectionError>;

/// Describes where two series first disagree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Misalignment {
    #[error("lengths {left} and {right} differ")]
    Length { left: usize, right: usize },
    #[error("timestamps differ at index {index}: {left} vs {right}")]
    Timestamp {
        index: usize,
        left: Timestamp,
        right: Timestamp,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlumeDetectionError {
    #[error("Wavelet level {level} outside valid range [1, {max_level}]")]
    InvalidLevel { level: usize, max_level: usize },
    #[error("Series not aligned: {0}")]
    Misaligned(Misalignment),
    #[error("Series has {times} timestamps but {values} values")]
    LengthMismatch { times: usize, values: usize },
    #[error("Timestamps not strictly increasing at index {index}")]
    NonIncreasingTimestamps { index: usize },
    #[error("Window size of {0} must be positive")]
    ZeroWindow(&'static str),
}
