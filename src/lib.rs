//! deckmill - build PowerPoint decks slide by slide
//!
//! This crate keeps named presentations in memory, appends slides built from
//! a fixed set of templates, and writes them out as `.pptx` packages. The
//! operations are served as Model Context Protocol tools by the `deckmill`
//! binary, but every layer is usable as a library.
//!
//! # Features
//!
//! - **Deck registry**: create, open (with backup), save and close named decks
//! - **Slide templates**: title, section header, bulleted content with
//!   indentation levels, comparison, table, chart and picture with caption
//! - **Chart selection**: scatter, pie, line, clustered bar or column, picked
//!   from the shape of the data
//! - **Picture fitting**: pictures keep their aspect ratio inside the layout's
//!   picture placeholder
//! - **Image generation**: prompts rendered through the Gemini API and saved
//!   next to the decks
//!
//! # Example
//!
//! ```no_run
//! use deckmill::deck::{DeckRegistry, builder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = DeckRegistry::new("/srv/decks");
//! let deck = registry.create("q3-review")?;
//! {
//!     let mut deck = deck.lock();
//!     builder::add_title_slide(&mut deck, "Q3 Review")?;
//!     builder::add_title_content(&mut deck, "Highlights", "Revenue up\n\tEMEA +12%\nChurn down")?;
//! }
//! let path = registry.save("q3-review", None)?;
//! println!("Saved to {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod deck;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod ooxml;
pub mod paths;
pub mod vision;

pub use deck::{Deck, DeckRegistry};
pub use error::{DeckError, ErrorKind, Result};
