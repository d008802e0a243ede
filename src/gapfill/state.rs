use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TaskStatus {
    Waiting = 0,
    Processing = 1,
    Canceled = 2,
    Finished = 3,
    Errored = 4,
}

impl TaskStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskStatus::Waiting,
            1 => TaskStatus::Processing,
            2 => TaskStatus::Canceled,
            3 => TaskStatus::Finished,
            _ => TaskStatus::Errored,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Canceled | TaskStatus::Finished | TaskStatus::Errored
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskStatus::Waiting => "waiting",
            TaskStatus::Processing => "processing",
            TaskStatus::Canceled => "canceled",
            TaskStatus::Finished => "finished",
            TaskStatus::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Status, progress and cancellation shared between a running gap filling
/// pass, its workers and whoever polls it.
///
/// Every transition is a compare and swap, so a canceled task is never
/// moved back to processing and a finished one is never canceled.
#[derive(Debug, Default)]
pub struct TaskState {
    status: AtomicU8,
    processed_rows: AtomicUsize,
    total_rows: AtomicUsize,
    error_message: Mutex<Option<String>>,
}

impl TaskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    fn transition(&self, from: TaskStatus, to: TaskStatus) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Moves a waiting task to processing, false if it was canceled (or
    /// started) before.
    pub fn start(&self) -> bool {
        self.transition(TaskStatus::Waiting, TaskStatus::Processing)
    }

    /// Marks a started task whose rows are all done as finished.
    ///
    /// A cancel that lands after the last row was already processed is
    /// overridden. False for a waiting or errored task.
    pub fn finish(&self) -> bool {
        self.transition(TaskStatus::Processing, TaskStatus::Finished)
            || self.transition(TaskStatus::Canceled, TaskStatus::Finished)
    }

    /// Moves any non-terminal status to `to`, false if the task already
    /// ended.
    fn end(&self, to: TaskStatus) -> bool {
        let mut current = self.status.load(Ordering::Acquire);
        while !TaskStatus::from_u8(current).is_terminal() {
            match self.status.compare_exchange_weak(
                current,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
        false
    }

    /// Idempotent. Terminal states are kept.
    pub fn cancel(&self) {
        self.end(TaskStatus::Canceled);
    }

    pub fn is_canceled(&self) -> bool {
        self.status() == TaskStatus::Canceled
    }

    /// Moves a waiting or processing task to errored and keeps the message.
    /// A task that was canceled or already ended keeps its status.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        let mut guard = match self.error_message.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let failed = self.end(TaskStatus::Errored);
        if failed {
            *guard = Some(message.into());
        }
        failed
    }

    pub fn error_message(&self) -> Option<String> {
        match self.error_message.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn reset_progress(&self, total_rows: usize) {
        self.processed_rows.store(0, Ordering::Release);
        self.total_rows.store(total_rows, Ordering::Release);
    }

    pub fn row_done(&self) {
        self.processed_rows.fetch_add(1, Ordering::AcqRel);
    }

    pub fn processed_rows(&self) -> usize {
        self.processed_rows.load(Ordering::Acquire)
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows.load(Ordering::Acquire)
    }

    /// Fraction of rows done, 0 when there is nothing to do.
    pub fn progress(&self) -> f64 {
        let total = self.total_rows();
        if total == 0 {
            return 0.0;
        }
        (self.processed_rows() as f64 / total as f64).min(1.0)
    }
}
