pub mod same_range_agg;

pub use same_range_agg::{PeakRejection, SameRangePeakAggregator};
