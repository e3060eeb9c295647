mod tracer;

pub use tracer::{TracerEngine, TracerError, TracerOptions};

use chrono::{DateTime, TimeDelta, Utc};

/// Scalar type of every concentration, background and area value.
/// Missing samples are represented as `NaN`.
pub type Real = f64;

pub type Timestamp = DateTime<Utc>;

/// Plume identifiers are assigned 1, 2, 3, ... in order of start time.
pub type PlumeId = u32;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Converts a duration in (possibly fractional) seconds into a [TimeDelta],
/// rounded to the nearest nanosecond.
pub fn seconds_to_delta(seconds: Real) -> TimeDelta {
    TimeDelta::nanoseconds((seconds * 1e9).round() as i64)
}
