use super::config::GapFillConfig;
use super::filler::{FillOutcome, GapFiller};
use super::state::TaskState;
use crate::errors::{DataProcessingError, Result};
use crate::models::feature_table::{FeatureRow, FeatureTable};
use crate::models::peaks::Peak;
use crate::traits::raw_run::RawRun;
use rayon::prelude::*;
use serde::Serialize;
use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Tally of what happened to every cell of a table during gap filling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FillSummary {
    /// Peaks already present in the input and shared as is.
    pub copied: usize,
    pub filled: usize,
    pub no_signal: usize,
    pub degenerate_area: usize,
    pub no_sibling: usize,
}

impl FillSummary {
    fn record(&mut self, outcome: &FillOutcome) {
        match outcome {
            FillOutcome::Filled(_) => self.filled += 1,
            FillOutcome::NoSignalInWindow => self.no_signal += 1,
            FillOutcome::DegenerateArea => self.degenerate_area += 1,
            FillOutcome::NoSiblingPeaks => self.no_sibling += 1,
            FillOutcome::Canceled => {}
        }
    }

    /// Number of cells that were absent in the input.
    pub fn gaps(&self) -> usize {
        self.filled + self.no_signal + self.degenerate_area + self.no_sibling
    }
}

impl AddAssign for FillSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.copied += rhs.copied;
        self.filled += rhs.filled;
        self.no_signal += rhs.no_signal;
        self.degenerate_area += rhs.degenerate_area;
        self.no_sibling += rhs.no_sibling;
    }
}

#[derive(Debug, Clone)]
pub struct GapFillResult {
    pub table: FeatureTable,
    pub summary: FillSummary,
}

#[derive(Debug, Clone)]
pub enum RebuildOutcome {
    Finished(GapFillResult),
    /// The partial table is dropped.
    Canceled { processed_rows: usize },
}

impl RebuildOutcome {
    pub fn finished(self) -> Option<GapFillResult> {
        match self {
            RebuildOutcome::Finished(x) => Some(x),
            RebuildOutcome::Canceled { .. } => None,
        }
    }
}

enum RowOutcome {
    Done(FeatureRow, FillSummary),
    Canceled,
}

/// Builds a new table out of an input table where every absent peak was
/// given a chance to be filled from the raw data of its run.
///
/// The input table is only read. Peaks it already has are shared with the
/// output through their `Arc`.
pub struct TableRebuilder<'a> {
    config: &'a GapFillConfig,
    state: &'a TaskState,
}

impl<'a> TableRebuilder<'a> {
    pub fn new(config: &'a GapFillConfig, state: &'a TaskState) -> Self {
        Self { config, state }
    }

    /// `runs` must hold exactly one run per run of the table, matched by
    /// name, in any order.
    #[instrument(name = "TableRebuilder::rebuild", skip_all, fields(table = %input.name))]
    pub fn rebuild<R: RawRun>(&self, input: &FeatureTable, runs: &[R]) -> Result<RebuildOutcome> {
        let st = Instant::now();
        let runs = match_runs(input, runs)?;
        self.state.reset_progress(input.len());
        let filler = GapFiller::new(self.state);

        let rows: Vec<(FeatureRow, FillSummary)> = if self.config.parallel {
            let done: Vec<RowOutcome> = input
                .rows()
                .par_iter()
                .map(|row| self.rebuild_row(row, &runs, &filler))
                .collect::<Result<Vec<_>>>()?;

            let mut rows = Vec::with_capacity(done.len());
            for row in done {
                match row {
                    RowOutcome::Done(row, summary) => rows.push((row, summary)),
                    RowOutcome::Canceled => return Ok(self.canceled()),
                }
            }
            rows
        } else {
            let mut rows = Vec::with_capacity(input.len());
            for row in input.rows() {
                match self.rebuild_row(row, &runs, &filler)? {
                    RowOutcome::Done(row, summary) => rows.push((row, summary)),
                    RowOutcome::Canceled => return Ok(self.canceled()),
                }
            }
            rows
        };

        let mut table = FeatureTable::with_capacity(
            self.config.output_name(&input.name),
            input.runs().to_vec(),
            rows.len(),
        );
        table.applied_methods = input.applied_methods.clone();
        table.applied_methods.push(self.config.applied_method());

        let mut summary = FillSummary::default();
        for (row, row_summary) in rows {
            summary += row_summary;
            table.add_row(row)?;
        }

        info!(
            "Rebuilt {} rows of {} in {:#?}: {:?}",
            table.len(),
            input.name,
            st.elapsed(),
            summary
        );
        Ok(RebuildOutcome::Finished(GapFillResult { table, summary }))
    }

    fn canceled(&self) -> RebuildOutcome {
        let processed_rows = self.state.processed_rows();
        info!("Gap filling canceled after {} rows", processed_rows);
        RebuildOutcome::Canceled { processed_rows }
    }

    fn rebuild_row<R: RawRun>(
        &self,
        row: &FeatureRow,
        runs: &[&R],
        filler: &GapFiller<'_>,
    ) -> Result<RowOutcome> {
        if self.state.is_canceled() {
            return Ok(RowOutcome::Canceled);
        }

        let mut new_row = FeatureRow::with_annotations_of(row);
        let mut summary = FillSummary::default();

        for (run_index, run) in runs.iter().enumerate() {
            if self.state.is_canceled() {
                return Ok(RowOutcome::Canceled);
            }

            if let Some(peak) = row.peak(run_index) {
                new_row.set_peak(run_index, Arc::clone(peak));
                summary.copied += 1;
                continue;
            }

            let outcome = filler.fill(row, run_index, *run)?;
            summary.record(&outcome);
            match outcome {
                FillOutcome::Filled(peak) => {
                    new_row.set_peak(run_index, Peak::Filled(peak));
                }
                FillOutcome::Canceled => return Ok(RowOutcome::Canceled),
                _ => {}
            }
        }

        debug!("Row {}: {:?}", row.id, summary);
        self.state.row_done();
        Ok(RowOutcome::Done(new_row, summary))
    }
}

/// Orders `runs` like the runs of `table`.
fn match_runs<'r, R: RawRun>(table: &FeatureTable, runs: &'r [R]) -> Result<Vec<&'r R>> {
    let mismatch = || DataProcessingError::RunMismatch {
        expected: table.runs().to_vec(),
        got: runs.iter().map(|x| x.name().to_string()).collect(),
    };

    if runs.len() != table.runs().len() {
        return Err(mismatch().into());
    }

    table
        .runs()
        .iter()
        .map(|name| {
            runs.iter()
                .find(|x| x.name() == name)
                .ok_or_else(|| mismatch().into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GapFillError;
    use crate::models::peaks::{ChromatographicPeak, DetectedPeak, PeakStatus};
    use crate::models::runs::InMemoryRun;
    use crate::models::scans::{DataPoint, Scan};

    fn detected(rt: (f64, f64), mz: (f64, f64)) -> Peak {
        Peak::Detected(DetectedPeak {
            mz: (mz.0 + mz.1) / 2.0,
            rt: (rt.0 + rt.1) / 2.0,
            height: 100.0,
            area: 100.0,
            mz_range: mz.try_into().unwrap(),
            rt_range: rt.try_into().unwrap(),
        })
    }

    fn run(name: &str, signal_mz: f64) -> InMemoryRun {
        let scans = (0..10)
            .map(|i| {
                let intensity = if i % 2 == 0 { 0.0 } else { 10.0 * i as f64 };
                Scan::from_data_points(i, i as f64, 1, vec![DataPoint::new(signal_mz, intensity)])
            })
            .collect();
        InMemoryRun::new(name, scans)
    }

    // Three runs, row 1 detected in "a" only, row 2 detected in "a" and "b",
    // row 3 detected in "c" but outside of the signal of "a" and "b".
    fn table() -> FeatureTable {
        let mut table = FeatureTable::new("Aligned", vec!["a".into(), "b".into(), "c".into()]);

        let mut row = FeatureRow::new(1, 3);
        row.comment = Some("first".into());
        row.set_peak(0, detected((1.0, 5.0), (200.0, 200.1)));
        table.add_row(row).unwrap();

        let mut row = FeatureRow::new(2, 3);
        row.set_peak(0, detected((2.0, 4.0), (200.0, 200.1)));
        row.set_peak(1, detected((3.0, 6.0), (200.05, 200.2)));
        table.add_row(row).unwrap();

        let mut row = FeatureRow::new(3, 3);
        row.set_peak(2, detected((2.0, 4.0), (700.0, 700.1)));
        table.add_row(row).unwrap();

        table
    }

    fn runs() -> Vec<InMemoryRun> {
        vec![run("c", 200.05), run("a", 200.05), run("b", 200.05)]
    }

    #[test]
    fn test_rebuild_fills_and_shares_peaks() {
        let input = table();
        let config = GapFillConfig::default();
        let state = TaskState::new();
        let result = TableRebuilder::new(&config, &state)
            .rebuild(&input, &runs())
            .unwrap()
            .finished()
            .unwrap();

        let out = result.table;
        assert_eq!(out.name, "Aligned gap-filled");
        assert_eq!(out.runs(), input.runs());
        assert_eq!(out.len(), 3);
        assert_eq!(out.applied_methods.len(), 1);
        assert_eq!(out.rows()[0].comment.as_deref(), Some("first"));

        for (in_row, out_row) in input.rows().iter().zip(out.rows()) {
            assert_eq!(in_row.id, out_row.id);
            for (run_index, peak) in in_row.peaks() {
                if let Some(peak) = peak {
                    assert!(Arc::ptr_eq(peak, out_row.peak(run_index).unwrap()));
                }
            }
        }

        let filled = out.rows()[0].peak(1).unwrap();
        assert_eq!(filled.status(), PeakStatus::Estimated);
        assert!(filled.area() > 0.0);
        assert!(out.rows()[2].peak(0).is_none());

        assert_eq!(
            result.summary,
            FillSummary {
                copied: 4,
                filled: 3,
                no_signal: 2,
                degenerate_area: 0,
                no_sibling: 0,
            }
        );
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = table();
        let state = TaskState::new();
        let sequential = TableRebuilder::new(&GapFillConfig::default(), &state)
            .rebuild(&input, &runs())
            .unwrap()
            .finished()
            .unwrap();

        let config = GapFillConfig {
            parallel: true,
            ..Default::default()
        };
        let state = TaskState::new();
        let parallel = TableRebuilder::new(&config, &state)
            .rebuild(&input, &runs())
            .unwrap()
            .finished()
            .unwrap();

        assert_eq!(sequential.table.rows(), parallel.table.rows());
        assert_eq!(sequential.summary, parallel.summary);
    }

    #[test]
    fn test_rebuild_rejects_mismatched_runs() {
        let input = table();
        let config = GapFillConfig::default();
        let state = TaskState::new();
        let rebuilder = TableRebuilder::new(&config, &state);

        let too_few = vec![run("a", 200.0), run("b", 200.0)];
        let wrong_name = vec![run("a", 200.0), run("b", 200.0), run("d", 200.0)];
        for runs in [too_few, wrong_name] {
            assert!(matches!(
                rebuilder.rebuild(&input, &runs),
                Err(GapFillError::DataProcessingError(
                    DataProcessingError::RunMismatch { .. }
                ))
            ));
        }
    }

    #[test]
    fn test_rebuild_canceled_before_start() {
        let input = table();
        let config = GapFillConfig::default();
        let state = TaskState::new();
        state.cancel();
        let outcome = TableRebuilder::new(&config, &state)
            .rebuild(&input, &runs())
            .unwrap();
        assert!(matches!(
            outcome,
            RebuildOutcome::Canceled { processed_rows: 0 }
        ));
    }

    #[test]
    fn test_rebuild_empty_table() {
        let input = FeatureTable::new("Empty", vec!["a".into()]);
        let config = GapFillConfig::default();
        let state = TaskState::new();
        let result = TableRebuilder::new(&config, &state)
            .rebuild(&input, &[run("a", 1.0)])
            .unwrap()
            .finished()
            .unwrap();
        assert!(result.table.is_empty());
        assert_eq!(state.progress(), 0.0);
    }
}
