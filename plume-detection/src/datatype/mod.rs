pub(crate) mod interval;
pub(crate) mod plume;
pub(crate) mod timeseries;

pub use interval::{Interval, PlumeCandidate};
pub use plume::{AreaResult, Plume, PlumeSample};
pub use timeseries::{Sample, TimeSeries};
