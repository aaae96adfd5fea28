//! Caller-facing error type for deck operations.
//!
//! Every failure a tool call can report is a [`DeckError`]. Lower layers
//! keep their own error types ([`OoxmlError`], [`OpcError`]); document
//! failures are wrapped with the deck and operation they happened in.
//!
//! [`OpcError`]: crate::ooxml::opc::OpcError
use crate::ooxml::OoxmlError;
use crate::ooxml::pptx::Region;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Broad class of a [`DeckError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced deck, region or file does not exist.
    NotFound,
    /// The request payload is malformed.
    Validation,
    /// The image provider, network or storage failed.
    External,
    /// A required credential or setting is missing.
    Configuration,
}

/// Main error type for deck operations.
#[derive(Error, Debug)]
pub enum DeckError {
    /// No deck is registered under this name
    #[error("Presentation not found: {0}")]
    DeckNotFound(String),

    /// A required argument is missing or empty
    #[error("Missing required arguments: {0}")]
    MissingArgument(&'static str),

    #[error("Table headers are required")]
    MissingTableHeaders,

    #[error("Table rows are required")]
    MissingTableRows,

    /// A table row does not have one cell per header
    #[error(
        "All rows must have the same number of columns as headers (row {row} has {actual}, expected {expected})"
    )]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The layout behind a slide template lacks one of its regions
    #[error("region index out of range: layout '{layout}' has no {region} placeholder")]
    RegionMissing { layout: String, region: Region },

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Image could not be decoded: {}: {source}", .path.display())]
    ImageNotDecodable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The chart payload cannot be plotted
    #[error("Invalid chart data: {0}")]
    InvalidChartData(String),

    /// A path argument resolves outside the base directory
    #[error("Invalid path. Attempted to access location outside allowed directory: {0}")]
    InvalidPath(String),

    /// A credential is missing from the environment
    #[error("{0} environment variable not set.")]
    MissingCredential(&'static str),

    /// The image provider answered without a usable image
    #[error("Failed to generate image: {0}")]
    ImageGeneration(String),

    /// The image provider could not be reached
    #[error("Failed to generate image: {0}")]
    Http(#[from] reqwest::Error),

    /// The document layer failed while performing `operation` on `deck`
    #[error("Unable to {operation} presentation {deck}: {source}")]
    Document {
        deck: String,
        operation: &'static str,
        #[source]
        source: OoxmlError,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DeckNotFound(_) | Self::RegionMissing { .. } | Self::ImageNotFound(_) => {
                ErrorKind::NotFound
            },
            Self::MissingArgument(_)
            | Self::MissingTableHeaders
            | Self::MissingTableRows
            | Self::RowLengthMismatch { .. }
            | Self::ImageNotDecodable { .. }
            | Self::InvalidChartData(_)
            | Self::InvalidPath(_) => ErrorKind::Validation,
            Self::ImageGeneration(_) | Self::Http(_) | Self::Document { .. } | Self::Io { .. } => {
                ErrorKind::External
            },
            Self::MissingCredential(_) => ErrorKind::Configuration,
        }
    }

    /// Wrap a document failure with the deck and operation it belongs to.
    pub fn document(deck: &str, operation: &'static str, source: OoxmlError) -> Self {
        Self::Document {
            deck: deck.to_string(),
            operation,
            source,
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type for deck operations.
pub type Result<T> = std::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(DeckError::DeckNotFound("q3".into()).to_string(), "Presentation not found: q3");
        assert_eq!(
            DeckError::MissingCredential("GEMINI_API_KEY").to_string(),
            "GEMINI_API_KEY environment variable not set."
        );
        let err = DeckError::RegionMissing {
            layout: "Blank".into(),
            region: Region::Caption,
        };
        assert!(err.to_string().starts_with("region index out of range"));
        assert!(err.to_string().contains("caption"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(DeckError::DeckNotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(DeckError::MissingTableRows.kind(), ErrorKind::Validation);
        assert_eq!(DeckError::MissingCredential("K").kind(), ErrorKind::Configuration);
        let wrapped = DeckError::document("x", "save", OoxmlError::InvalidFormat("bad".into()));
        assert_eq!(wrapped.kind(), ErrorKind::External);
        assert_eq!(wrapped.to_string(), "Unable to save presentation x: Invalid format: bad");
    }
}
