use std::path::PathBuf;
use thiserror::Error;

/// The main error type for mmstack operations.
#[derive(Debug, Error)]
pub enum MmStackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No companion metadata file found for {path}")]
    MissingCompanion { path: PathBuf },

    #[error("Metadata file at {path} is too large to be parsed ({size} bytes, limit is {limit} bytes)")]
    MetadataTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Failed to scan directory {path}: {message}")]
    DirectoryScan { path: PathBuf, message: String },

    #[error("Failed to parse acquisition sidecar {path}: {source}")]
    SidecarParse {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Unknown pixel type '{code}' in {path} at line {line}")]
    UnknownPixelType {
        path: PathBuf,
        line: usize,
        code: String,
    },

    #[error("Malformed plane record in {path} at line {line}: {message}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Axis lengths in {path} describe too many planes (Z {z}, C {channel}, T {time})")]
    TooManyPlanes {
        path: PathBuf,
        z: usize,
        channel: usize,
        time: usize,
    },

    #[error("Could not find TIFF files in {path}")]
    NoImageFiles { path: PathBuf },

    #[error("Failed to write CSV output: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("Failed to write JSON output: {0}")]
    JsonWrite(#[source] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Position {index} does not exist (acquisition has {count} position(s))")]
    PositionOutOfRange { index: usize, count: usize },
}

/// Coarse classification of an [`MmStackError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The dataset layout or a file on disk is unusable.
    Structural,
    /// The metadata text declares something the parser cannot represent.
    Schema,
    /// Rendering results for the user failed, or the command line asked for
    /// something the acquisition does not have.
    Output,
}

impl MmStackError {
    /// Which class of failure this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            MmStackError::Io(_)
            | MmStackError::MissingCompanion { .. }
            | MmStackError::MetadataTooLarge { .. }
            | MmStackError::DirectoryScan { .. }
            | MmStackError::SidecarParse { .. }
            | MmStackError::NoImageFiles { .. } => ErrorClass::Structural,
            MmStackError::UnknownPixelType { .. }
            | MmStackError::MalformedRecord { .. }
            | MmStackError::TooManyPlanes { .. } => ErrorClass::Schema,
            MmStackError::CsvWrite(_)
            | MmStackError::JsonWrite(_)
            | MmStackError::UnsupportedFormat(_)
            | MmStackError::PositionOutOfRange { .. } => ErrorClass::Output,
        }
    }
}
