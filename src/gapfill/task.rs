use super::config::GapFillConfig;
use super::rebuilder::{RebuildOutcome, TableRebuilder};
use super::state::{TaskState, TaskStatus};
use crate::errors::{GapFillError, Result};
use crate::models::feature_table::FeatureTable;
use crate::traits::raw_run::RawRun;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Cheap handle to watch and cancel a [`GapFillTask`] from another thread.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    state: Arc<TaskState>,
    description: Arc<str>,
}

impl TaskHandle {
    pub fn status(&self) -> TaskStatus {
        self.state.status()
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    pub fn processed_rows(&self) -> usize {
        self.state.processed_rows()
    }

    pub fn cancel(&self) {
        self.state.cancel()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.error_message()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Gap filling of one feature table as a task a scheduler can run, poll
/// and cancel.
pub struct GapFillTask<R: RawRun> {
    input: Arc<FeatureTable>,
    runs: Vec<R>,
    config: GapFillConfig,
    handle: TaskHandle,
}

impl<R: RawRun> GapFillTask<R> {
    pub fn new(input: Arc<FeatureTable>, runs: Vec<R>, config: GapFillConfig) -> Self {
        let description = format!("Gap filling {} using RT and m/z range", input.name);
        let state = Arc::new(TaskState::new());
        state.reset_progress(input.len());
        Self {
            input,
            runs,
            config,
            handle: TaskHandle {
                state,
                description: description.into(),
            },
        }
    }

    pub fn handle(&self) -> TaskHandle {
        self.handle.clone()
    }

    pub fn status(&self) -> TaskStatus {
        self.handle.status()
    }

    pub fn progress(&self) -> f64 {
        self.handle.progress()
    }

    pub fn cancel(&self) {
        self.handle.cancel()
    }

    pub fn error_message(&self) -> Option<String> {
        self.handle.error_message()
    }

    pub fn description(&self) -> &str {
        self.handle.description()
    }

    pub fn config(&self) -> &GapFillConfig {
        &self.config
    }

    /// Runs the whole pass on the calling thread.
    ///
    /// A task only runs once. Canceling before it starts, or while rows are
    /// left, gives back [`RebuildOutcome::Canceled`]; once the last row is
    /// done the task finishes anyway. Errors of the raw runs
    /// abort the pass, leave the task as [`TaskStatus::Errored`] and are
    /// returned.
    #[instrument(name = "GapFillTask::run", skip_all, fields(table = %self.input.name))]
    pub fn run(&self) -> Result<RebuildOutcome> {
        let state = &self.handle.state;
        if !state.start() {
            return match state.status() {
                TaskStatus::Canceled => Ok(RebuildOutcome::Canceled {
                    processed_rows: state.processed_rows(),
                }),
                status => Err(GapFillError::custom(format!(
                    "{} cannot be started, it is {}",
                    self.description(),
                    status
                ))),
            };
        }

        info!("Started {}", self.description());
        let outcome = TableRebuilder::new(&self.config, state).rebuild(&self.input, &self.runs);

        match outcome {
            Ok(RebuildOutcome::Finished(result)) => {
                // Every row is done, a cancel that came in meanwhile is dropped.
                state.finish();
                info!(
                    "Finished {}, filled {} of {} gaps",
                    self.description(),
                    result.summary.filled,
                    result.summary.gaps()
                );
                Ok(RebuildOutcome::Finished(result))
            }
            Ok(canceled @ RebuildOutcome::Canceled { .. }) => {
                info!("{} canceled", self.description());
                Ok(canceled)
            }
            Err(e) => {
                warn!("{} failed: {}", self.description(), e);
                state.fail(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DataReadingError;
    use crate::models::feature_table::FeatureRow;
    use crate::models::peaks::{DetectedPeak, Peak};
    use crate::models::runs::InMemoryRun;
    use crate::models::scans::{DataPoint, Scan};
    use crate::utils::range::IncludedRange;
    use std::borrow::Cow;

    fn input() -> Arc<FeatureTable> {
        let mut table = FeatureTable::new("Aligned", vec!["a".into(), "b".into()]);
        let mut row = FeatureRow::new(1, 2);
        row.set_peak(
            0,
            Peak::from(DetectedPeak {
                mz: 150.0,
                rt: 2.0,
                height: 10.0,
                area: 10.0,
                mz_range: (149.9, 150.1).try_into().unwrap(),
                rt_range: (1.0, 3.0).try_into().unwrap(),
            }),
        );
        table.add_row(row).unwrap();
        Arc::new(table)
    }

    fn run(name: &str) -> InMemoryRun {
        let scans = (1..=3)
            .map(|i| Scan::from_data_points(i, i as f64, 1, vec![DataPoint::new(150.0, 5.0)]))
            .collect();
        InMemoryRun::new(name, scans)
    }

    struct BrokenRun;

    impl RawRun for BrokenRun {
        fn name(&self) -> &str {
            "b"
        }

        fn scan_numbers_in_range(
            &self,
            _ms_level: u8,
            _rt_range: IncludedRange<f64>,
        ) -> Result<Vec<usize>> {
            Ok(vec![1])
        }

        fn scan(&self, scan_id: usize) -> Result<Cow<'_, Scan>> {
            Err(DataReadingError::ScanNotFound {
                run: "b".into(),
                scan_id,
            }
            .into())
        }
    }

    #[test]
    fn test_task_lifecycle() {
        let task = GapFillTask::new(input(), vec![run("a"), run("b")], GapFillConfig::default());
        assert_eq!(task.status(), TaskStatus::Waiting);
        assert_eq!(task.progress(), 0.0);
        assert_eq!(task.description(), "Gap filling Aligned using RT and m/z range");

        let result = task.run().unwrap().finished().unwrap();
        assert_eq!(task.status(), TaskStatus::Finished);
        assert_eq!(task.progress(), 1.0);
        assert_eq!(result.summary.filled, 1);

        // Finished tasks stay finished and are not run again.
        task.cancel();
        assert_eq!(task.status(), TaskStatus::Finished);
        assert!(task.run().is_err());
    }

    #[test]
    fn test_cancel_before_run() {
        let task = GapFillTask::new(input(), vec![run("a"), run("b")], GapFillConfig::default());
        let handle = task.handle();
        handle.cancel();
        let outcome = task.run().unwrap();
        assert!(matches!(outcome, RebuildOutcome::Canceled { processed_rows: 0 }));
        assert_eq!(handle.status(), TaskStatus::Canceled);
    }

    #[test]
    fn test_collaborator_failure_errors_task() {
        let runs: Vec<Box<dyn RawRun>> = vec![Box::new(run("a")), Box::new(BrokenRun)];
        let task = GapFillTask::new(input(), runs, GapFillConfig::default());
        assert!(task.run().is_err());
        assert_eq!(task.status(), TaskStatus::Errored);
        let message = task.error_message().unwrap();
        assert!(message.contains("Scan 1 not found"), "{}", message);
    }
}
