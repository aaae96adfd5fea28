//! Open Packaging Conventions (OPC) implementation.
//!
//! Parts, relationships and content types of a zip-based package. Parts are
//! loaded by walking the relationship graph and written back out with a
//! regenerated `[Content_Types].xml`.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

pub use error::{OpcError, Result};
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::Part;
pub use rel::{Relationship, Relationships};
