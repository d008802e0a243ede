pub mod data_point;
pub mod scan;

pub use data_point::{DataPoint, ScanDataPoint};
pub use scan::{find_base_peak, Scan};
