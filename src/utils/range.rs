use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A closed-closed range `[start, end]` over a numeric axis (RT or m/z).
///
/// The first element is always less than or equal to the second. Ranges
/// only ever grow: `extend` replaces the range with the union of both, which
/// is how the window of a feature is built from the peaks of its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "(T, T)",
    bound(deserialize = "T: Deserialize<'de> + std::fmt::Debug")
)]
pub struct IncludedRange<T: Copy + PartialOrd>(T, T);

#[derive(Error, Debug)]
pub enum IncludedRangeError<T: Copy + PartialOrd + std::fmt::Debug> {
    #[error(
        "Expected the first element to be less than or equal to the second, got ({0:?}, {1:?})"
    )]
    ExpectedOrderedRange(T, T),
}

impl<T: Copy + PartialOrd + std::fmt::Debug> IncludedRange<T> {
    pub fn try_new(start: T, end: T) -> Result<Self, IncludedRangeError<T>> {
        // `!(start <= end)` so NaNs are rejected too.
        if !(start <= end) {
            Err(IncludedRangeError::ExpectedOrderedRange(start, end))
        } else {
            Ok(Self(start, end))
        }
    }

    /// Zero-width range at `value`.
    pub fn point(value: T) -> Self {
        Self(value, value)
    }

    pub fn start(&self) -> T {
        self.0
    }

    pub fn end(&self) -> T {
        self.1
    }

    pub fn as_tuple(&self) -> (T, T) {
        (self.0, self.1)
    }

    pub fn contains(&self, x: T) -> bool {
        self.0 <= x && x <= self.1
    }

    /// Replaces this range with the union of itself and `other`.
    pub fn extend(&mut self, other: &Self) {
        if other.0 < self.0 {
            self.0 = other.0;
        }
        if other.1 > self.1 {
            self.1 = other.1;
        }
    }

    pub fn extend_value(&mut self, value: T) {
        self.extend(&Self::point(value));
    }

    pub fn union(mut self, other: &Self) -> Self {
        self.extend(other);
        self
    }
}

impl IncludedRange<f64> {
    pub fn average(&self) -> f64 {
        (self.0 + self.1) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.1 - self.0
    }
}

impl<T: Copy + PartialOrd + std::fmt::Debug> From<T> for IncludedRange<T> {
    fn from(value: T) -> Self {
        Self::point(value)
    }
}

impl<T> TryFrom<(T, T)> for IncludedRange<T>
where
    T: Copy + PartialOrd + std::fmt::Debug,
{
    type Error = IncludedRangeError<T>;

    fn try_from(value: (T, T)) -> Result<Self, Self::Error> {
        Self::try_new(value.0, value.1)
    }
}
