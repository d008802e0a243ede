pub mod aggregator;
pub mod raw_run;
