use serde::{Deserialize, Serialize};

/// A single centroid of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub mz: f64,
    pub intensity: f64,
}

impl DataPoint {
    pub fn new(mz: f64, intensity: f64) -> Self {
        Self { mz, intensity }
    }

    /// Zero intensity point used to keep one entry per scan when a scan
    /// has no signal inside the searched m/z window.
    pub fn placeholder(mz: f64) -> Self {
        Self { mz, intensity: 0.0 }
    }

    pub fn has_signal(&self) -> bool {
        self.intensity > 0.0
    }
}

impl From<(f64, f64)> for DataPoint {
    fn from(value: (f64, f64)) -> Self {
        Self {
            mz: value.0,
            intensity: value.1,
        }
    }
}

/// A data point tagged with the scan it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanDataPoint {
    pub scan_id: usize,
    pub rt: f64,
    pub point: DataPoint,
}

impl From<(usize, f64, DataPoint)> for ScanDataPoint {
    fn from(value: (usize, f64, DataPoint)) -> Self {
        Self {
            scan_id: value.0,
            rt: value.1,
            point: value.2,
        }
    }
}
