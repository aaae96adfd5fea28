//! Errors raised while reading, assembling or writing an OPC package.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// A partname or relationship target is not a valid pack URI
    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// `[Content_Types].xml` maps no type to this part
    #[error("No content type for part {0}")]
    ContentTypeNotFound(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    /// Malformed content types, relationships or non-UTF-8 part XML
    #[error("Malformed package XML: {0}")]
    Xml(String),

    #[error("Container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for OpcError {
    fn from(err: quick_xml::Error) -> Self {
        OpcError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::Xml(format!("bad attribute: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
