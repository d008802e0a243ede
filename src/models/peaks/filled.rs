use super::{ChromatographicPeak, PeakStatus};
use crate::models::scans::ScanDataPoint;
use crate::utils::range::IncludedRange;
use serde::{Deserialize, Serialize};

/// A peak reconstructed from the raw signal of a run inside the RT and m/z
/// window where the same feature was detected in other runs.
///
/// Only built by finalizing a
/// [`SameRangePeakAggregator`](crate::models::aggregators::SameRangePeakAggregator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledPeak {
    /// m/z of the most intense point.
    pub mz: f64,
    /// RT of the scan holding the most intense point.
    pub rt: f64,
    pub representative_scan: usize,
    pub height: f64,
    pub area: f64,
    pub mz_range: IncludedRange<f64>,
    pub rt_range: IncludedRange<f64>,
    /// One point per scan in the window, placeholders included.
    pub data_points: Vec<ScanDataPoint>,
}

impl FilledPeak {
    pub fn scan_numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.data_points.iter().map(|x| x.scan_id)
    }
}

impl ChromatographicPeak for FilledPeak {
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
        PeakStatus::Estimated
    }
}
