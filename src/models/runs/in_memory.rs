use crate::errors::{DataReadingError, Result};
use crate::models::scans::Scan;
use crate::traits::raw_run::RawRun;
use crate::utils::range::IncludedRange;
use nohash_hasher::BuildNoHashHasher;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

type ScanIdIndex = HashMap<usize, usize, BuildNoHashHasher<usize>>;

/// A run whose scans are all held in memory, sorted by RT.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SerializedRun")]
pub struct InMemoryRun {
    name: String,
    scans: Vec<Scan>,
    #[serde(skip_serializing)]
    rts: Vec<f64>,
    #[serde(skip_serializing)]
    scan_index: ScanIdIndex,
}

#[derive(Deserialize)]
struct SerializedRun {
    name: String,
    scans: Vec<Scan>,
}

impl From<SerializedRun> for InMemoryRun {
    fn from(value: SerializedRun) -> Self {
        InMemoryRun::new(value.name, value.scans)
    }
}

impl InMemoryRun {
    pub fn new(name: impl Into<String>, mut scans: Vec<Scan>) -> Self {
        let name = name.into();
        scans.sort_by(|a, b| {
            a.rt.partial_cmp(&b.rt)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.scan_id.cmp(&b.scan_id))
        });
        let rts = scans.iter().map(|x| x.rt).collect();
        let mut scan_index = ScanIdIndex::with_capacity_and_hasher(
            scans.len(),
            BuildNoHashHasher::default(),
        );
        for (i, scan) in scans.iter().enumerate() {
            if scan_index.insert(scan.scan_id, i).is_some() {
                debug!("Duplicate scan id {} in run {}, keeping the last one", scan.scan_id, name);
            }
        }

        Self {
            name,
            scans,
            rts,
            scan_index,
        }
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    pub fn rt_span(&self) -> Option<IncludedRange<f64>> {
        let first = self.rts.first()?;
        let last = self.rts.last()?;
        IncludedRange::try_new(*first, *last).ok()
    }
}

impl RawRun for InMemoryRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn scan_numbers_in_range(
        &self,
        ms_level: u8,
        rt_range: IncludedRange<f64>,
    ) -> Result<Vec<usize>> {
        let start = self.rts.partition_point(|x| *x < rt_range.start());
        let end = start + self.rts[start..].partition_point(|x| *x <= rt_range.end());
        Ok(self.scans[start..end]
            .iter()
            .filter(|x| x.ms_level == ms_level)
            .map(|x| x.scan_id)
            .collect())
    }

    fn scan(&self, scan_id: usize) -> Result<Cow<'_, Scan>> {
        match self.scan_index.get(&scan_id) {
            Some(i) => Ok(Cow::Borrowed(&self.scans[*i])),
            None => Err(DataReadingError::ScanNotFound {
                run: self.name.clone(),
                scan_id,
            }
            .into()),
        }
    }
}
