use chrono::TimeDelta;
use plumeid_common::{TIMESTAMP_FORMAT, Timestamp};
use serde::Serialize;
use std::fmt::Display;

/// A closed time range `[start, end]`.
/// Ordering is by `start`, then by `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{0}, {1}]",
            self.start.format(TIMESTAMP_FORMAT),
            self.end.format(TIMESTAMP_FORMAT)
        )
    }
}

/// An interval produced by grouping contiguous classified samples,
/// not yet merged or identified.
pub type PlumeCandidate = Interval;
