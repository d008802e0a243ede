use super::config::GAP_FILL_MS_LEVEL;
use super::state::TaskState;
use crate::errors::Result;
use crate::models::aggregators::{PeakRejection, SameRangePeakAggregator};
use crate::models::feature_table::FeatureRow;
use crate::models::peaks::FilledPeak;
use crate::models::scans::{find_base_peak, DataPoint};
use crate::traits::aggregator::Aggregator;
use crate::traits::raw_run::RawRun;
use tracing::trace;

/// Result of one gap filling attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FillOutcome {
    Filled(FilledPeak),
    /// Scans were found but none had signal inside the m/z window.
    NoSignalInWindow,
    /// There was signal but it integrates to a zero area.
    DegenerateArea,
    /// No other run of the row has a peak to take a window from.
    NoSiblingPeaks,
    Canceled,
}

impl FillOutcome {
    pub fn into_peak(self) -> Option<FilledPeak> {
        match self {
            FillOutcome::Filled(peak) => Some(peak),
            _ => None,
        }
    }
}

/// Reconstructs the missing peak of a row in one run, looking at the raw
/// signal inside the RT and m/z window spanned by the peaks the row has in
/// the other runs.
#[derive(Debug, Clone, Copy)]
pub struct GapFiller<'a> {
    state: &'a TaskState,
}

impl<'a> GapFiller<'a> {
    pub fn new(state: &'a TaskState) -> Self {
        Self { state }
    }

    pub fn fill(&self, row: &FeatureRow, run_index: usize, run: &impl RawRun) -> Result<FillOutcome> {
        debug_assert!(
            row.peak(run_index).is_none(),
            "Row {} already has a peak in run {}",
            row.id,
            run_index
        );

        let (rt_range, mz_range) = match row.peak_window() {
            Some(x) => x,
            None => return Ok(FillOutcome::NoSiblingPeaks),
        };

        let scan_ids = run.scan_numbers_in_range(GAP_FILL_MS_LEVEL, rt_range)?;
        let placeholder_mz = mz_range.average();
        let mut agg = SameRangePeakAggregator::with_capacity(scan_ids.len());

        for scan_id in scan_ids {
            if self.state.is_canceled() {
                return Ok(FillOutcome::Canceled);
            }
            let scan = run.scan(scan_id)?;
            let point = match find_base_peak(&scan, &mz_range) {
                Some(point) if point.has_signal() => point,
                _ => DataPoint::placeholder(placeholder_mz),
            };
            agg.add((scan_id, scan.rt, point));
        }

        trace!(
            "Row {} in run {}: {} scans in rt {:?} mz {:?}",
            row.id,
            run.name(),
            agg.len(),
            rt_range.as_tuple(),
            mz_range.as_tuple(),
        );

        if !agg.has_signal() {
            return Ok(FillOutcome::NoSignalInWindow);
        }

        Ok(match agg.finalize() {
            Ok(peak) => FillOutcome::Filled(peak),
            Err(PeakRejection::NoSignal) => FillOutcome::NoSignalInWindow,
            Err(PeakRejection::ZeroArea) => FillOutcome::DegenerateArea,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::peaks::{DetectedPeak, Peak};
    use crate::models::runs::InMemoryRun;
    use crate::models::scans::Scan;

    fn row_with_sibling(rt: (f64, f64), mz: (f64, f64)) -> FeatureRow {
        let mut row = FeatureRow::new(1, 2);
        row.set_peak(
            0,
            Peak::from(DetectedPeak {
                mz: (mz.0 + mz.1) / 2.0,
                rt: (rt.0 + rt.1) / 2.0,
                height: 100.0,
                area: 100.0,
                mz_range: mz.try_into().unwrap(),
                rt_range: rt.try_into().unwrap(),
            }),
        );
        row
    }

    fn run_with(points: &[(usize, f64, f64, f64)]) -> InMemoryRun {
        let scans = points
            .iter()
            .map(|(id, rt, mz, intensity)| {
                Scan::from_data_points(*id, *rt, 1, vec![DataPoint::new(*mz, *intensity)])
            })
            .collect();
        InMemoryRun::new("b", scans)
    }

    #[test]
    fn test_fill_finds_peak() {
        let state = TaskState::new();
        let filler = GapFiller::new(&state);
        let row = row_with_sibling((10.0, 20.0), (500.0, 500.2));
        let run = run_with(&[
            (1, 10.0, 500.1, 0.0),
            (2, 12.5, 500.1, 50.0),
            (3, 15.0, 500.12, 50.0),
            (4, 17.5, 500.1, 0.0),
            (5, 20.0, 500.08, 50.0),
            // Outside of the RT window.
            (6, 30.0, 500.1, 1000.0),
        ]);

        let peak = filler.fill(&row, 1, &run).unwrap().into_peak().unwrap();
        assert_eq!(peak.height, 50.0);
        assert!(peak.area > 0.0);
        assert_eq!(peak.data_points.len(), 5);
        assert_eq!(peak.rt_range.as_tuple(), (10.0, 20.0));
    }

    #[test]
    fn test_fill_out_of_mz_window_is_placeholder() {
        let state = TaskState::new();
        let filler = GapFiller::new(&state);
        let row = row_with_sibling((1.0, 3.0), (300.0, 300.5));
        let run = run_with(&[(1, 1.0, 300.2, 10.0), (2, 2.0, 900.0, 99.0), (3, 3.0, 300.3, 10.0)]);

        let peak = filler.fill(&row, 1, &run).unwrap().into_peak().unwrap();
        assert_eq!(peak.height, 10.0);
        assert_eq!(peak.data_points[1].point.intensity, 0.0);
        assert_eq!(peak.data_points[1].point.mz, 300.25);
        assert_eq!(peak.mz_range.as_tuple(), (300.2, 300.3));
    }

    #[test]
    fn test_fill_no_signal() {
        let state = TaskState::new();
        let filler = GapFiller::new(&state);
        let row = row_with_sibling((1.0, 3.0), (300.0, 300.5));

        let run = run_with(&[(1, 1.0, 800.0, 10.0), (2, 2.0, 800.0, 10.0)]);
        assert_eq!(filler.fill(&row, 1, &run).unwrap(), FillOutcome::NoSignalInWindow);

        let empty = run_with(&[(1, 50.0, 300.2, 10.0)]);
        assert_eq!(filler.fill(&row, 1, &empty).unwrap(), FillOutcome::NoSignalInWindow);
    }

    #[test]
    fn test_fill_single_scan_is_degenerate() {
        let state = TaskState::new();
        let filler = GapFiller::new(&state);
        let row = row_with_sibling((1.0, 3.0), (300.0, 300.5));
        let run = run_with(&[(1, 2.0, 300.2, 10.0)]);
        assert_eq!(filler.fill(&row, 1, &run).unwrap(), FillOutcome::DegenerateArea);
    }

    #[test]
    fn test_fill_without_siblings() {
        let state = TaskState::new();
        let filler = GapFiller::new(&state);
        let row = FeatureRow::new(1, 2);
        let run = run_with(&[(1, 2.0, 300.2, 10.0)]);
        assert_eq!(filler.fill(&row, 1, &run).unwrap(), FillOutcome::NoSiblingPeaks);
    }

    #[test]
    fn test_fill_stops_when_canceled() {
        let state = TaskState::new();
        state.cancel();
        let filler = GapFiller::new(&state);
        let row = row_with_sibling((1.0, 3.0), (300.0, 300.5));
        let run = run_with(&[(1, 1.0, 300.2, 10.0), (2, 2.0, 300.2, 10.0)]);
        assert_eq!(filler.fill(&row, 1, &run).unwrap(), FillOutcome::Canceled);
    }
}
