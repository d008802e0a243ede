pub mod aggregators;
pub mod feature_table;
pub mod peaks;
pub mod runs;
pub mod scans;
