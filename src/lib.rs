// Re-export main structures
pub use crate::errors::{GapFillError, Result};
pub use crate::gapfill::{
    FillOutcome, FillSummary, GapFillConfig, GapFillResult, GapFillTask, GapFiller, RebuildOutcome,
    TableRebuilder, TaskHandle, TaskStatus,
};
pub use crate::models::aggregators::SameRangePeakAggregator;
pub use crate::models::feature_table::{AppliedMethod, FeatureRow, FeatureTable, PeakIdentity};
pub use crate::models::peaks::{DetectedPeak, FilledPeak, Peak};
pub use crate::models::runs::{load_run, InMemoryRun};
pub use crate::utils::range::IncludedRange;

// Re-export traits
pub use crate::models::peaks::ChromatographicPeak;
pub use crate::traits::aggregator::Aggregator;
pub use crate::traits::raw_run::RawRun;

// Declare modules
pub mod errors;
pub mod gapfill;
pub mod models;
pub mod traits;
pub mod utils;
