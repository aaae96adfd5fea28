//! Named decks and the slide operations applied to them.
//!
//! A [`Deck`] pairs a caller-chosen name with a [`PresentationDocument`].
//! Decks live in a [`DeckRegistry`] for the lifetime of the process (or
//! until closed); [`builder`] appends slides to them and [`chart`] picks
//! chart shapes for chart slides.

pub mod builder;
pub mod chart;
pub mod fit;
pub mod registry;
pub mod text;

pub use builder::{ComparisonSides, TablePayload};
pub use chart::{ChartPayload, ChartSelection, ChartShape, ValueEncoding, select_chart};
pub use registry::{BACKUP_FILE_NAME, DeckRegistry, SharedDeck};

use crate::error::{DeckError, Result};
use crate::ooxml::pptx::PresentationDocument;
use std::path::{Path, PathBuf};

/// One in-memory presentation.
#[derive(Debug)]
pub struct Deck {
    name: String,
    document: PresentationDocument,
    default_path: Option<PathBuf>,
}

impl Deck {
    /// An empty deck built from the default template.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let document =
            PresentationDocument::new().map_err(|e| DeckError::document(&name, "create", e))?;
        Ok(Self::from_document(name, document))
    }

    pub fn from_document(name: impl Into<String>, document: PresentationDocument) -> Self {
        Self {
            name: name.into(),
            document,
            default_path: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn document(&self) -> &PresentationDocument {
        &self.document
    }

    #[inline]
    pub(crate) fn document_mut(&mut self) -> &mut PresentationDocument {
        &mut self.document
    }

    /// Where [`DeckRegistry::save`] writes when no path is given.
    pub fn default_path(&self) -> Option<&Path> {
        self.default_path.as_deref()
    }

    pub fn set_default_path(&mut self, path: Option<PathBuf>) {
        self.default_path = path;
    }

    pub fn slide_count(&self) -> Result<usize> {
        self.document
            .slide_count()
            .map_err(|e| DeckError::document(&self.name, "count slides in", e))
    }

    /// Serialize to `.pptx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.document
            .to_bytes()
            .map_err(|e| DeckError::document(&self.name, "serialize", e))
    }
}
