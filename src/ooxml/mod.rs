//! Office Open XML support: just enough of OPC, PresentationML and
//! DrawingML charts to create, reopen, extend and save `.pptx` decks.

pub mod charts;
pub mod error;
pub mod opc;
pub mod pptx;

pub use error::{OoxmlError, Result};
pub use opc::{OpcPackage, PackURI};
