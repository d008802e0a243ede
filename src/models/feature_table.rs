use crate::errors::{DataProcessingError, Result};
use crate::models::peaks::{ChromatographicPeak, Peak};
use crate::utils::range::IncludedRange;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakIdentity {
    pub name: String,
    #[serde(default)]
    pub formula: Option<String>,
    /// How the identity was assigned (eg. a database search).
    #[serde(default)]
    pub method: Option<String>,
}

impl PeakIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formula: None,
            method: None,
        }
    }
}

/// Record of a processing step applied to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedMethod {
    pub description: String,
    pub parameters: serde_json::Value,
}

/// One aligned feature across all the runs of a table.
///
/// `peaks` has exactly one slot per run of the owning table, in the
/// table's run order. Peaks are shared behind `Arc` so that tables derived
/// from this one can reuse them without copying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub id: u64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub identities: Vec<PeakIdentity>,
    /// Index into `identities`.
    #[serde(default)]
    pub preferred_identity: Option<usize>,
    peaks: Vec<Option<Arc<Peak>>>,
}

impl FeatureRow {
    pub fn new(id: u64, num_runs: usize) -> Self {
        Self {
            id,
            comment: None,
            identities: Vec::new(),
            preferred_identity: None,
            peaks: vec![None; num_runs],
        }
    }

    /// A row that keeps the id, comment and identities of `other` but has
    /// no peaks yet.
    pub fn with_annotations_of(other: &FeatureRow) -> Self {
        Self {
            id: other.id,
            comment: other.comment.clone(),
            identities: other.identities.clone(),
            preferred_identity: other.preferred_identity,
            peaks: vec![None; other.peaks.len()],
        }
    }

    pub fn num_runs(&self) -> usize {
        self.peaks.len()
    }

    pub fn peak(&self, run_index: usize) -> Option<&Arc<Peak>> {
        self.peaks.get(run_index).and_then(|x| x.as_ref())
    }

    /// Puts `peak` in the slot of `run_index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// If `run_index` is not a run of the row.
    pub fn set_peak(&mut self, run_index: usize, peak: impl Into<Arc<Peak>>) -> Option<Arc<Peak>> {
        self.peaks[run_index].replace(peak.into())
    }

    pub fn peaks(&self) -> impl Iterator<Item = (usize, Option<&Arc<Peak>>)> + '_ {
        self.peaks.iter().map(|x| x.as_ref()).enumerate()
    }

    pub fn num_peaks(&self) -> usize {
        self.peaks.iter().filter(|x| x.is_some()).count()
    }

    pub fn preferred_identity(&self) -> Option<&PeakIdentity> {
        self.preferred_identity.and_then(|i| self.identities.get(i))
    }

    /// Union of the RT and m/z ranges of all the peaks in the row,
    /// `None` if the row has no peaks.
    pub fn peak_window(&self) -> Option<(IncludedRange<f64>, IncludedRange<f64>)> {
        let mut out: Option<(IncludedRange<f64>, IncludedRange<f64>)> = None;
        for peak in self.peaks.iter().flatten() {
            match out.as_mut() {
                Some((rt_range, mz_range)) => {
                    rt_range.extend(&peak.rt_range());
                    mz_range.extend(&peak.mz_range());
                }
                None => out = Some((peak.rt_range(), peak.mz_range())),
            }
        }
        out
    }
}

/// Aligned features of a set of runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub name: String,
    runs: Vec<String>,
    rows: Vec<FeatureRow>,
    #[serde(default)]
    pub applied_methods: Vec<AppliedMethod>,
}

impl FeatureTable {
    pub fn new(name: impl Into<String>, runs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            runs,
            rows: Vec::new(),
            applied_methods: Vec::new(),
        }
    }

    pub fn with_capacity(name: impl Into<String>, runs: Vec<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            runs,
            rows: Vec::with_capacity(capacity),
            applied_methods: Vec::new(),
        }
    }

    /// Appends a row, checking it has one slot per run of the table.
    pub fn add_row(&mut self, row: FeatureRow) -> Result<()> {
        self.check_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    fn check_row(&self, row: &FeatureRow) -> Result<()> {
        if row.num_runs() != self.runs.len() {
            return Err(DataProcessingError::ExpectedVectorSameLength {
                left: row.num_runs(),
                right: self.runs.len(),
            }
            .into());
        }
        if let Some(index) = row.preferred_identity {
            if index >= row.identities.len() {
                return Err(DataProcessingError::PreferredIdentityOutOfBounds {
                    row_id: row.id,
                    index,
                    len: row.identities.len(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Checks every row, meant for tables coming from deserialization.
    pub fn validate(&self) -> Result<()> {
        self.rows.iter().try_for_each(|row| self.check_row(row))
    }

    pub fn runs(&self) -> &[String] {
        &self.runs
    }

    pub fn run_index(&self, name: &str) -> Option<usize> {
        self.runs.iter().position(|x| x == name)
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&FeatureRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
