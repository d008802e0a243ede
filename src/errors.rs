use std::fmt::Display;
use timsrust::TimsRustError;

#[derive(Debug)]
pub enum GapFillError {
    DataReadingError(DataReadingError),
    DataProcessingError(DataProcessingError),
    Other(String),
}

pub type Result<T> = std::result::Result<T, GapFillError>;

impl Display for GapFillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataReadingError(e) => write!(f, "Error reading data: {}", e),
            Self::DataProcessingError(e) => write!(f, "Error processing data: {:?}", e),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GapFillError {}

impl GapFillError {
    pub fn custom(msg: impl Display) -> Self {
        Self::Other(msg.to_string())
    }
}

/// Failures of the raw data collaborators (files, scans, serialized inputs).
#[derive(Debug)]
pub enum DataReadingError {
    ScanNotFound { run: String, scan_id: usize },
    UnsupportedDataError(UnsupportedDataError),
    TimsRustError(TimsRustError),
    IoError(std::io::Error),
    SerializationError(String),
}

impl Display for DataReadingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScanNotFound { run, scan_id } => {
                write!(f, "Scan {} not found in run {}", scan_id, run)
            }
            Self::UnsupportedDataError(e) => write!(f, "{}", e),
            Self::TimsRustError(e) => write!(f, "{:?}", e),
            Self::IoError(e) => write!(f, "{}", e),
            Self::SerializationError(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug)]
pub enum UnsupportedDataError {
    NoMS1DataError { path: String },
    UnknownRunFormat { path: String },
}

impl Display for UnsupportedDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMS1DataError { path } => write!(f, "No MS1 data found in {}", path),
            Self::UnknownRunFormat { path } => write!(
                f,
                "Unknown raw run format for {} (expected a .d directory, .json or .msgpack)",
                path
            ),
        }
    }
}

#[derive(Debug)]
pub enum DataProcessingError {
    ExpectedVectorSameLength { left: usize, right: usize },
    RunMismatch { expected: Vec<String>, got: Vec<String> },
    PreferredIdentityOutOfBounds { row_id: u64, index: usize, len: usize },
}

impl From<DataProcessingError> for GapFillError {
    fn from(e: DataProcessingError) -> Self {
        GapFillError::DataProcessingError(e)
    }
}

impl From<UnsupportedDataError> for DataReadingError {
    fn from(e: UnsupportedDataError) -> Self {
        DataReadingError::UnsupportedDataError(e)
    }
}

impl From<std::io::Error> for DataReadingError {
    fn from(e: std::io::Error) -> Self {
        DataReadingError::IoError(e)
    }
}

impl From<serde_json::Error> for DataReadingError {
    fn from(e: serde_json::Error) -> Self {
        DataReadingError::SerializationError(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for DataReadingError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        DataReadingError::SerializationError(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for DataReadingError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        DataReadingError::SerializationError(e.to_string())
    }
}

impl From<TimsRustError> for DataReadingError {
    fn from(e: TimsRustError) -> Self {
        DataReadingError::TimsRustError(e)
    }
}

impl<T: Into<DataReadingError>> From<T> for GapFillError {
    fn from(e: T) -> Self {
        GapFillError::DataReadingError(e.into())
    }
}
