use super::Interval;
use crate::Real;
use plumeid_common::{PlumeId, Timestamp};
use serde::Serialize;
use std::fmt::Display;

/// A merged, uniquely identified plume interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plume {
    pub id: PlumeId,
    pub interval: Interval,
}

impl Plume {
    pub fn start(&self) -> Timestamp {
        self.interval.start
    }

    pub fn end(&self) -> Timestamp {
        self.interval.end
    }
}

impl Display for Plume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "plume {0}: {1}", self.id, self.interval)
    }
}

/// One row of the plume membership table: a raw concentration sample lying
/// inside a plume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlumeSample {
    pub plume_id: PlumeId,
    pub time: Timestamp,
    pub concentration: Real,
}

/// The integrated, background-subtracted area of one plume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaResult {
    pub plume_id: PlumeId,
    pub start: Timestamp,
    pub end: Timestamp,
    pub area: Real,
}
