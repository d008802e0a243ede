use super::{ChromatographicPeak, PeakStatus};
use crate::utils::range::IncludedRange;
use serde::{Deserialize, Serialize};

/// A peak coming from upstream peak detection.
///
/// Gap filling never re-quantifies these, it only reads their ranges to
/// build the search window for the runs where the feature is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPeak {
    pub mz: f64,
    pub rt: f64,
    pub height: f64,
    pub area: f64,
    pub mz_range: IncludedRange<f64>,
    pub rt_range: IncludedRange<f64>,
}

impl ChromatographicPeak for DetectedPeak {
    fn mz(&self) -> f64 {
        self.mz
    }

    fn rt(&self) -> f64 {
        self.rt
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn area(&self) -> f64 {
        self.area
    }

    fn mz_range(&self) -> IncludedRange<f64> {
        self.mz_range
    }

    fn rt_range(&self) -> IncludedRange<f64> {
        self.rt_range
    }

    fn status(&self) -> PeakStatus {
        PeakStatus::Detected
    }
}
