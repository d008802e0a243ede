pub mod math;
pub mod range;
pub mod sorting;
