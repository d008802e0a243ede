use crate::models::peaks::FilledPeak;
use crate::models::scans::ScanDataPoint;
use crate::traits::aggregator::Aggregator;
use crate::utils::math::trapezoid_area;
use crate::utils::range::IncludedRange;

/// Why a [`SameRangePeakAggregator`] did not produce a peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakRejection {
    /// None of the added points had a positive intensity.
    NoSignal,
    /// There was signal but the integrated area is zero,
    /// eg. a single scan or all signal at the same RT.
    ZeroArea,
}

/// Builds a peak from one point per scan, taken inside a fixed RT and m/z
/// window.
///
/// Points must be added in ascending RT order, scan ids may come in any
/// order. Zero intensity
/// placeholders are kept in the series, they take part in the area
/// integration and the RT range but never in the m/z range.
#[derive(Debug, Clone, Default)]
pub struct SameRangePeakAggregator {
    points: Vec<ScanDataPoint>,
    mz_range: Option<IncludedRange<f64>>,
    rt_range: Option<IncludedRange<f64>>,
}

impl SameRangePeakAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_signal(&self) -> bool {
        self.mz_range.is_some()
    }
}

fn extend_or_init(range: &mut Option<IncludedRange<f64>>, value: f64) {
    match range {
        Some(range) => range.extend_value(value),
        None => *range = Some(IncludedRange::point(value)),
    }
}

impl Aggregator for SameRangePeakAggregator {
    type Item = ScanDataPoint;
    type Output = Result<FilledPeak, PeakRejection>;

    fn add(&mut self, item: impl Into<ScanDataPoint>) {
        let item = item.into();
        debug_assert!(
            self.points.last().map_or(true, |last| last.rt <= item.rt),
            "Points must be added in ascending RT order, last: {:?}, new: {:?}",
            self.points.last(),
            item,
        );

        if item.point.has_signal() {
            extend_or_init(&mut self.mz_range, item.point.mz);
        }
        extend_or_init(&mut self.rt_range, item.rt);
        self.points.push(item);
    }

    fn finalize(self) -> Result<FilledPeak, PeakRejection> {
        let (mz_range, rt_range) = match (self.mz_range, self.rt_range) {
            (Some(mz_range), Some(rt_range)) => (mz_range, rt_range),
            _ => return Err(PeakRejection::NoSignal),
        };

        // First point with the max intensity is the apex.
        let mut apex = self.points[0];
        for point in self.points.iter().skip(1) {
            if point.point.intensity > apex.point.intensity {
                apex = *point;
            }
        }

        let rts: Vec<f64> = self.points.iter().map(|x| x.rt).collect();
        let intensities: Vec<f64> = self.points.iter().map(|x| x.point.intensity).collect();
        let area = trapezoid_area(&rts, &intensities);
        if area <= 0.0 {
            return Err(PeakRejection::ZeroArea);
        }

        Ok(FilledPeak {
            mz: apex.point.mz,
            rt: apex.rt,
            representative_scan: apex.scan_id,
            height: apex.point.intensity,
            area,
            mz_range,
            rt_range,
            data_points: self.points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scans::DataPoint;

    fn feed(points: &[(usize, f64, f64, f64)]) -> SameRangePeakAggregator {
        let mut agg = SameRangePeakAggregator::new();
        for (scan_id, rt, mz, intensity) in points {
            agg.add((*scan_id, *rt, DataPoint::new(*mz, *intensity)));
        }
        agg
    }

    #[test]
    fn test_finalize_with_placeholders() {
        let agg = feed(&[
            (1, 10.0, 500.1, 0.0),
            (2, 12.5, 500.1, 50.0),
            (3, 15.0, 500.12, 50.0),
            (4, 17.5, 500.1, 0.0),
            (5, 20.0, 500.08, 50.0),
        ]);
        assert!(agg.has_signal());
        let peak = agg.finalize().unwrap();

        assert_eq!(peak.height, 50.0);
        // 2.5 * (0 + 50) / 2 + 2.5 * (50 + 50) / 2 + 2.5 * (50 + 0) / 2 + 2.5 * (0 + 50) / 2
        assert!((peak.area - 312.5).abs() < 1e-9, "area: {}", peak.area);
        assert_eq!(peak.rt_range.as_tuple(), (10.0, 20.0));
        assert_eq!(peak.mz_range.as_tuple(), (500.08, 500.12));
        // Ties go to the first apex.
        assert_eq!(peak.mz, 500.1);
        assert_eq!(peak.rt, 12.5);
        assert_eq!(peak.representative_scan, 2);
        assert_eq!(peak.data_points.len(), 5);
        assert_eq!(peak.scan_numbers().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_placeholder_mz_does_not_extend_mz_range() {
        let agg = feed(&[
            (1, 1.0, 400.0, 0.0),
            (2, 2.0, 500.0, 10.0),
            (3, 3.0, 600.0, 0.0),
        ]);
        let peak = agg.finalize().unwrap();
        assert_eq!(peak.mz_range.as_tuple(), (500.0, 500.0));
        assert_eq!(peak.rt_range.as_tuple(), (1.0, 3.0));
        assert!((peak.area - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_placeholders_is_no_signal() {
        let agg = feed(&[(1, 1.0, 400.0, 0.0), (2, 2.0, 400.0, 0.0)]);
        assert!(!agg.has_signal());
        assert_eq!(agg.finalize().unwrap_err(), PeakRejection::NoSignal);
    }

    #[test]
    fn test_empty_is_no_signal() {
        let agg = SameRangePeakAggregator::with_capacity(4);
        assert!(agg.is_empty());
        assert_eq!(agg.finalize().unwrap_err(), PeakRejection::NoSignal);
    }

    #[test]
    fn test_single_point_is_zero_area() {
        let agg = feed(&[(1, 5.0, 300.0, 1e6)]);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.finalize().unwrap_err(), PeakRejection::ZeroArea);
    }

    #[test]
    fn test_add_all_matches_add() {
        let points = vec![
            (1usize, 1.0, DataPoint::new(300.0, 5.0)),
            (2usize, 2.0, DataPoint::new(300.0, 15.0)),
        ];
        let mut agg = SameRangePeakAggregator::new();
        agg.add_all(points);
        let peak = agg.finalize().unwrap();
        assert_eq!(peak.height, 15.0);
        assert!((peak.area - 10.0).abs() < 1e-9);
    }

    // Feeding scans out of order is a caller error, area would be meaningless.
    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "ascending RT order")]
    fn test_out_of_order_points_are_rejected_in_debug() {
        let _ = feed(&[(2, 2.0, 300.0, 5.0), (1, 1.0, 300.0, 5.0)]);
    }

    #[test]
    fn test_scan_ids_out_of_rt_order_are_accepted() {
        let peak = feed(&[
            (7, 1.0, 300.0, 5.0),
            (3, 2.0, 300.1, 10.0),
            (5, 3.0, 300.0, 5.0),
        ])
        .finalize()
        .unwrap();
        assert_eq!(peak.scan_numbers().collect::<Vec<_>>(), vec![7, 3, 5]);
        assert_eq!(peak.representative_scan, 3);
        assert_eq!(peak.rt_range.as_tuple(), (1.0, 3.0));
    }
}
