pub mod detected;
pub mod filled;

pub use detected::DetectedPeak;
pub use filled::FilledPeak;

use crate::utils::range::IncludedRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeakStatus {
    /// Found by a peak detection method on the raw data.
    Detected,
    /// Reconstructed afterwards, eg. by gap filling.
    Estimated,
}

/// Capabilities shared by every peak that can sit in a feature table cell,
/// regardless of how it was built.
pub trait ChromatographicPeak {
    /// Representative m/z of the peak.
    fn mz(&self) -> f64;
    /// Retention time of the apex.
    fn rt(&self) -> f64;
    fn height(&self) -> f64;
    fn area(&self) -> f64;
    /// m/z span of the raw data points the peak was built from.
    fn mz_range(&self) -> IncludedRange<f64>;
    /// RT span of the raw data points the peak was built from.
    fn rt_range(&self) -> IncludedRange<f64>;
    fn status(&self) -> PeakStatus;
}

/// A peak as stored in a feature table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Peak {
    Detected(DetectedPeak),
    Filled(FilledPeak),
}

impl Peak {
    pub fn as_filled(&self) -> Option<&FilledPeak> {
        match self {
            Peak::Filled(x) => Some(x),
            Peak::Detected(_) => None,
        }
    }
}

impl From<DetectedPeak> for Peak {
    fn from(value: DetectedPeak) -> Self {
        Peak::Detected(value)
    }
}

impl From<FilledPeak> for Peak {
    fn from(value: FilledPeak) -> Self {
        Peak::Filled(value)
    }
}

macro_rules! delegate_peak {
    ($self:ident, $method:ident) => {
        match $self {
            Peak::Detected(x) => x.$method(),
            Peak::Filled(x) => x.$method(),
        }
    };
}

impl ChromatographicPeak for Peak {
    fn mz(&self) -> f64 {
        delegate_peak!(self, mz)
    }

    fn rt(&self) -> f64 {
        delegate_peak!(self, rt)
    }

    fn height(&self) -> f64 {
        delegate_peak!(self, height)
    }

    fn area(&self) -> f64 {
        delegate_peak!(self, area)
    }

    fn mz_range(&self) -> IncludedRange<f64> {
        delegate_peak!(self, mz_range)
    }

    fn rt_range(&self) -> IncludedRange<f64> {
        delegate_peak!(self, rt_range)
    }

    fn status(&self) -> PeakStatus {
        delegate_peak!(self, status)
    }
}
