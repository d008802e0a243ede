pub mod config;
pub mod filler;
pub mod rebuilder;
pub mod state;
pub mod task;

pub use config::{GapFillConfig, GAP_FILL_METHOD, GAP_FILL_MS_LEVEL};
pub use filler::{FillOutcome, GapFiller};
pub use rebuilder::{FillSummary, GapFillResult, RebuildOutcome, TableRebuilder};
pub use state::{TaskState, TaskStatus};
pub use task::{GapFillTask, TaskHandle};
