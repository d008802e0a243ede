use super::data_point::DataPoint;
use crate::errors::{DataProcessingError, Result};
use crate::sort_vecs_by_first;
use crate::utils::range::IncludedRange;
use serde::{Deserialize, Serialize};

/// One spectrum of a run, with its data points sorted by m/z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SerializedScan")]
pub struct Scan {
    pub scan_id: usize,
    pub rt: f64,
    pub ms_level: u8,
    mzs: Vec<f64>,
    intensities: Vec<f64>,
}

#[derive(Deserialize)]
struct SerializedScan {
    scan_id: usize,
    rt: f64,
    ms_level: u8,
    mzs: Vec<f64>,
    intensities: Vec<f64>,
}

impl TryFrom<SerializedScan> for Scan {
    type Error = crate::errors::GapFillError;

    fn try_from(value: SerializedScan) -> Result<Self> {
        Scan::new(
            value.scan_id,
            value.rt,
            value.ms_level,
            value.mzs,
            value.intensities,
        )
    }
}

impl Scan {
    pub fn new(
        scan_id: usize,
        rt: f64,
        ms_level: u8,
        mzs: Vec<f64>,
        intensities: Vec<f64>,
    ) -> Result<Self> {
        if mzs.len() != intensities.len() {
            return Err(DataProcessingError::ExpectedVectorSameLength {
                left: mzs.len(),
                right: intensities.len(),
            }
            .into());
        }
        let is_sorted = mzs.windows(2).all(|w| w[0] <= w[1]);
        let (mzs, intensities) = if is_sorted {
            (mzs, intensities)
        } else {
            sort_vecs_by_first!(&mzs, &intensities)
        };

        Ok(Self {
            scan_id,
            rt,
            ms_level,
            mzs,
            intensities,
        })
    }

    pub fn from_data_points(
        scan_id: usize,
        rt: f64,
        ms_level: u8,
        points: impl IntoIterator<Item = DataPoint>,
    ) -> Self {
        let (mzs, intensities): (Vec<f64>, Vec<f64>) =
            points.into_iter().map(|p| (p.mz, p.intensity)).unzip();
        // Both halves of the same unzip, lengths always agree.
        let (mzs, intensities) = sort_vecs_by_first!(&mzs, &intensities);
        Self {
            scan_id,
            rt,
            ms_level,
            mzs,
            intensities,
        }
    }

    pub fn len(&self) -> usize {
        self.mzs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mzs.is_empty()
    }

    pub fn mzs(&self) -> &[f64] {
        &self.mzs
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn data_points(&self) -> impl Iterator<Item = DataPoint> + '_ {
        self.mzs
            .iter()
            .zip(self.intensities.iter())
            .map(|(mz, intensity)| DataPoint::new(*mz, *intensity))
    }

    /// Indices of the data points whose m/z falls inside `mz_range`.
    pub fn indices_in_mz_range(&self, mz_range: &IncludedRange<f64>) -> std::ops::Range<usize> {
        let start = self.mzs.partition_point(|x| *x < mz_range.start());
        let end = start + self.mzs[start..].partition_point(|x| *x <= mz_range.end());
        start..end
    }

    pub fn base_peak(&self, mz_range: &IncludedRange<f64>) -> Option<DataPoint> {
        find_base_peak(self, mz_range)
    }
}

/// Most intense data point of `scan` inside `mz_range`.
///
/// Returns `None` when no point falls in the range. On ties the point with
/// the lowest m/z wins.
pub fn find_base_peak(scan: &Scan, mz_range: &IncludedRange<f64>) -> Option<DataPoint> {
    let mut out: Option<DataPoint> = None;
    for i in scan.indices_in_mz_range(mz_range) {
        let intensity = scan.intensities[i];
        match out {
            Some(best) if best.intensity >= intensity => {}
            _ => out = Some(DataPoint::new(scan.mzs[i], intensity)),
        }
    }
    out
}
