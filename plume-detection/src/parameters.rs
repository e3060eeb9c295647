use crate::{
    Real,
    error::{PlumeDetectionError, PlumeDetectionResult},
};
use chrono::TimeDelta;
use clap::Args;
use plumeid_common::seconds_to_delta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundParameters {
    /// Size, in samples, of the centred rolling standard deviation window and
    /// of the rolling mean which smooths it
    #[clap(id = "bg_sd_window", long = "bg-sd-window", env = "PLUMEID_BG_SD_WINDOW", default_value_t = 180)]
    #[serde(rename = "bg_sd_window")]
    pub sd_window: usize,

    /// Samples whose smoothed rolling standard deviation is at most this value are background
    #[clap(id = "bg_sd_threshold", long = "bg-sd-threshold", env = "PLUMEID_BG_SD_THRESHOLD", default_value_t = 0.5)]
    #[serde(rename = "bg_sd_threshold")]
    pub sd_threshold: Real,

    /// Size, in samples, of the trailing rolling mean applied to the interpolated background
    #[clap(id = "bg_mean_window", long = "bg-mean-window", env = "PLUMEID_BG_MEAN_WINDOW", default_value_t = 660)]
    #[serde(rename = "bg_mean_window")]
    pub mean_window: usize,
}

impl Default for BackgroundParameters {
    fn default() -> Self {
        Self {
            sd_window: 180,
            sd_threshold: 0.5,
            mean_window: 660,
        }
    }
}

impl BackgroundParameters {
    pub(crate) fn validate(&self) -> PlumeDetectionResult<()> {
        if self.sd_window == 0 {
            return Err(PlumeDetectionError::ZeroWindow("bg_sd_window"));
        }
        if self.mean_window == 0 {
            return Err(PlumeDetectionError::ZeroWindow("bg_mean_window"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParameters {
    /// A plume must exceed the background by this many background standard deviations
    #[clap(id = "plume_sd_threshold", long = "plume-sd-threshold", env = "PLUMEID_PLUME_SD_THRESHOLD", default_value_t = 3.)]
    #[serde(rename = "plume_sd_threshold")]
    pub sd_threshold: Real,

    /// A plume extends as long as it exceeds the background by this many background
    /// standard deviations. Should be less than `plume-sd-threshold`.
    #[clap(id = "plume_sd_starting", long = "plume-sd-starting", env = "PLUMEID_PLUME_SD_STARTING", default_value_t = 2.)]
    #[serde(rename = "plume_sd_starting")]
    pub sd_starting: Real,
}

impl Default for ThresholdParameters {
    fn default() -> Self {
        Self {
            sd_threshold: 3.,
            sd_starting: 2.,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeParameters {
    /// Plumes separated by no more than this many seconds are merged
    #[clap(long = "plume-buffer", env = "PLUMEID_PLUME_BUFFER", default_value_t = 10.)]
    #[serde(rename = "plume_buffer")]
    pub buffer_seconds: Real,
}

impl Default for MergeParameters {
    fn default() -> Self {
        Self {
            buffer_seconds: 10.,
        }
    }
}

impl MergeParameters {
    pub fn buffer(&self) -> TimeDelta {
        seconds_to_delta(self.buffer_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationParameters {
    /// Sampling interval, in seconds, used as the step of the trapezoidal rule
    #[clap(long, env = "PLUMEID_DX", default_value_t = 1.)]
    pub dx: Real,
}

impl Default for IntegrationParameters {
    fn default() -> Self {
        Self { dx: 1. }
    }
}

#[derive(Debug, Clone, PartialEq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveletParameters {
    /// Detail levels kept when reconstructing the signal, e.g. `--levels 5,6,7`.
    /// Level 0, the approximation, is always discarded.
    #[clap(long, value_delimiter = ',')]
    pub levels: Vec<usize>,

    /// A plume must have a reconstructed magnitude greater than this value
    #[clap(long = "plume-threshold", env = "PLUMEID_PLUME_THRESHOLD", default_value_t = 1.)]
    pub plume_threshold: Real,

    /// A plume extends as long as its reconstructed magnitude is greater than this value
    #[clap(long = "plume-starting", env = "PLUMEID_PLUME_STARTING", default_value_t = 0.5)]
    pub plume_starting: Real,

    /// Linearly interpolate missing values before decomposition
    #[clap(long)]
    pub interpolate: bool,
}

impl Default for WaveletParameters {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            plume_threshold: 1.,
            plume_starting: 0.5,
            interpolate: false,
        }
    }
}

impl WaveletParameters {
    /// The requested levels, deduplicated and ascending.
    pub fn level_set(&self) -> BTreeSet<usize> {
        self.levels.iter().copied().collect()
    }

    /// Checks every requested level lies in `[1, max_level]`.
    pub(crate) fn validate_levels(&self, max_level: usize) -> PlumeDetectionResult<()> {
        match self
            .levels
            .iter()
            .find(|&&level| level == 0 || level > max_level)
        {
            Some(&level) => Err(PlumeDetectionError::InvalidLevel { level, max_level }),
            None => Ok(()),
        }
    }
}
