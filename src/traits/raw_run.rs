use crate::errors::Result;
use crate::models::scans::Scan;
use crate::utils::range::IncludedRange;
use std::borrow::Cow;

/// Read only access to the scans of one raw data run.
///
/// Implementations are shared between the workers of a gap filling pass,
/// hence the `Send + Sync` bound.
pub trait RawRun: Send + Sync {
    fn name(&self) -> &str;

    /// Ids of the scans at `ms_level` whose RT falls inside `rt_range`,
    /// sorted by ascending RT.
    fn scan_numbers_in_range(&self, ms_level: u8, rt_range: IncludedRange<f64>)
        -> Result<Vec<usize>>;

    fn scan(&self, scan_id: usize) -> Result<Cow<'_, Scan>>;
}

impl<T: RawRun + ?Sized> RawRun for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn scan_numbers_in_range(
        &self,
        ms_level: u8,
        rt_range: IncludedRange<f64>,
    ) -> Result<Vec<usize>> {
        (**self).scan_numbers_in_range(ms_level, rt_range)
    }

    fn scan(&self, scan_id: usize) -> Result<Cow<'_, Scan>> {
        (**self).scan(scan_id)
    }
}

impl<T: RawRun + ?Sized> RawRun for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn scan_numbers_in_range(
        &self,
        ms_level: u8,
        rt_range: IncludedRange<f64>,
    ) -> Result<Vec<usize>> {
        (**self).scan_numbers_in_range(ms_level, rt_range)
    }

    fn scan(&self, scan_id: usize) -> Result<Cow<'_, Scan>> {
        (**self).scan(scan_id)
    }
}
