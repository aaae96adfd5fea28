//! Process-wide map of open decks.
//!
//! The map sits behind a [`RwLock`] and each deck behind its own [`Mutex`],
//! so mutating one deck never blocks lookups of another. Locks are never
//! held across an `.await`.

use crate::deck::Deck;
use crate::error::{DeckError, Result};
use crate::ooxml::pptx::PresentationDocument;
use crate::paths::resolve_in_base;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// File written into the base folder whenever a deck is opened.
pub const BACKUP_FILE_NAME: &str = "backup.pptx";

/// A deck handle shared between the registry and in-flight calls.
pub type SharedDeck = Arc<Mutex<Deck>>;

#[derive(Debug)]
pub struct DeckRegistry {
    base_dir: PathBuf,
    decks: RwLock<HashMap<String, SharedDeck>>,
}

fn require_name(name: &str, field: &'static str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DeckError::MissingArgument(field));
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DeckError::io(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| DeckError::io(path, e))
}

impl DeckRegistry {
    /// A registry resolving every file path against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            decks: RwLock::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `{name}.pptx` inside the base folder.
    fn default_file(&self, name: &str) -> Result<PathBuf> {
        resolve_in_base(&self.base_dir, format!("{}.pptx", name))
    }

    fn insert(&self, deck: Deck) -> SharedDeck {
        let name = deck.name().to_string();
        let shared = Arc::new(Mutex::new(deck));
        if self.decks.write().insert(name.clone(), shared.clone()).is_some() {
            warn!("Replaced existing presentation {}", name);
        }
        shared
    }

    /// Register a new empty deck. An existing deck of the same name is
    /// replaced.
    pub fn create(&self, name: &str) -> Result<SharedDeck> {
        require_name(name, "name")?;
        let shared = self.insert(Deck::new(name)?);
        info!("Created presentation {}", name);
        Ok(shared)
    }

    /// Load `{name}.pptx` from the base folder, write [`BACKUP_FILE_NAME`],
    /// then register the deck.
    ///
    /// `output_path`, when given, becomes the deck's default save location.
    /// Every path is checked before any file is touched.
    pub fn open(&self, name: &str, output_path: Option<&str>) -> Result<SharedDeck> {
        require_name(name, "presentation_name")?;
        let source = self.default_file(name)?;
        let backup = resolve_in_base(&self.base_dir, BACKUP_FILE_NAME)?;
        let default_path = output_path
            .filter(|p| !p.is_empty())
            .map(|p| resolve_in_base(&self.base_dir, p))
            .transpose()?;

        let data = std::fs::read(&source).map_err(|e| DeckError::io(&source, e))?;
        let document =
            PresentationDocument::from_bytes(&data).map_err(|e| DeckError::document(name, "load", e))?;
        let mut deck = Deck::from_document(name, document);
        deck.set_default_path(default_path);

        write_file(&backup, &deck.to_bytes()?)?;
        info!("Opened presentation {} (backup at {})", name, backup.display());
        Ok(self.insert(deck))
    }

    pub fn get(&self, name: &str) -> Result<SharedDeck> {
        require_name(name, "presentation_name")?;
        self.decks
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DeckError::DeckNotFound(name.to_string()))
    }

    /// Write the deck to `output_path`, else to its default location, else
    /// to `{name}.pptx` in the base folder. Returns the path written.
    pub fn save(&self, name: &str, output_path: Option<&str>) -> Result<PathBuf> {
        let shared = self.get(name)?;
        let explicit = output_path
            .filter(|p| !p.is_empty())
            .map(|p| resolve_in_base(&self.base_dir, p))
            .transpose()?;

        let deck = shared.lock();
        let destination = match explicit.or_else(|| deck.default_path().map(Path::to_path_buf)) {
            Some(path) => path,
            None => self.default_file(name)?,
        };
        write_file(&destination, &deck.to_bytes()?)?;
        info!("Saved presentation {} to {}", name, destination.display());
        Ok(destination)
    }

    /// Drop a deck from the registry. Unsaved changes are lost.
    pub fn close(&self, name: &str) -> Result<()> {
        require_name(name, "presentation_name")?;
        match self.decks.write().remove(name) {
            Some(_) => {
                info!("Closed presentation {}", name);
                Ok(())
            },
            None => Err(DeckError::DeckNotFound(name.to_string())),
        }
    }

    /// Registered deck names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.decks.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.decks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::builder::{add_title_content, add_title_slide};
    use crate::error::ErrorKind;

    fn registry() -> (tempfile::TempDir, DeckRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = DeckRegistry::new(dir.path());
        (dir, registry)
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, registry) = registry();
        registry.create("q3").unwrap();
        assert_eq!(registry.get("q3").unwrap().lock().name(), "q3");
        assert_eq!(registry.names(), vec!["q3".to_string()]);

        let err = registry.get("Q3").unwrap_err();
        assert!(matches!(err, DeckError::DeckNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(registry.create(""), Err(DeckError::MissingArgument("name"))));
    }

    #[test]
    fn test_create_replaces_existing() {
        let (_dir, registry) = registry();
        let first = registry.create("deck").unwrap();
        add_title_slide(&mut first.lock(), "Old").unwrap();

        registry.create("deck").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("deck").unwrap().lock().slide_count().unwrap(), 0);
    }

    #[test]
    fn test_save_default_and_explicit_paths() {
        let (dir, registry) = registry();
        let deck = registry.create("report").unwrap();
        add_title_content(&mut deck.lock(), "Agenda", "One\n\tTwo").unwrap();

        let saved = registry.save("report", None).unwrap();
        assert_eq!(saved, dir.path().join("report.pptx"));
        let reopened = PresentationDocument::open(&saved).unwrap();
        assert_eq!(reopened.slide_count().unwrap(), 1);

        let saved = registry.save("report", Some("out/final.pptx")).unwrap();
        assert_eq!(saved, dir.path().join("out/final.pptx"));
        assert!(saved.is_file());
    }

    #[test]
    fn test_save_rejects_traversal_before_writing() {
        let (dir, registry) = registry();
        registry.create("report").unwrap();
        let err = registry.save("report", Some("../escape.pptx")).unwrap_err();
        assert!(matches!(err, DeckError::InvalidPath(_)));
        assert!(!dir.path().join("../escape.pptx").exists());
        assert!(matches!(
            registry.save("missing", None),
            Err(DeckError::DeckNotFound(_))
        ));
    }

    #[test]
    fn test_open_writes_backup_and_keeps_output_path() {
        let (dir, registry) = registry();
        let deck = registry.create("source").unwrap();
        add_title_slide(&mut deck.lock(), "Hello").unwrap();
        registry.save("source", None).unwrap();
        registry.close("source").unwrap();
        assert!(registry.is_empty());

        let backup = dir.path().join(BACKUP_FILE_NAME);
        assert!(!backup.exists());
        let opened = registry.open("source", Some("copy.pptx")).unwrap();
        assert!(backup.is_file());
        assert_eq!(PresentationDocument::open(&backup).unwrap().slide_count().unwrap(), 1);
        assert_eq!(opened.lock().slide_count().unwrap(), 1);

        let saved = registry.save("source", None).unwrap();
        assert_eq!(saved, dir.path().join("copy.pptx"));
    }

    #[test]
    fn test_open_failures() {
        let (dir, registry) = registry();
        let err = registry.open("absent", None).unwrap_err();
        assert!(matches!(err, DeckError::Io { .. }));

        std::fs::write(dir.path().join("broken.pptx"), b"not a zip").unwrap();
        let err = registry.open("broken", None).unwrap_err();
        assert!(matches!(err, DeckError::Document { operation: "load", .. }));
        assert!(!dir.path().join(BACKUP_FILE_NAME).exists());
        assert!(registry.is_empty());

        assert!(matches!(
            registry.open("../outside", None),
            Err(DeckError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_close_unknown() {
        let (_dir, registry) = registry();
        assert!(matches!(registry.close("nope"), Err(DeckError::DeckNotFound(_))));
    }
}
