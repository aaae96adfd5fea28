//! PresentationML: the default template, layouts, and the writer that
//! appends slides to a deck.
//!
//! # Example
//!
//! ```no_run
//! use deckmill::ooxml::pptx::{Paragraph, PlaceholderSlot, PresentationDocument, SlideTemplate};
//!
//! let mut doc = PresentationDocument::new()?;
//! let mut slide = doc.begin_slide(SlideTemplate::TitleAndContent)?;
//! slide.set_text(PlaceholderSlot::Title, vec![Paragraph::new("Quarterly review", 0)])?;
//! slide.set_text(PlaceholderSlot::Index(1), vec![Paragraph::new("Revenue up", 0)])?;
//! doc.add_slide(slide)?;
//! doc.save("review.pptx")?;
//! # Ok::<(), deckmill::ooxml::OoxmlError>(())
//! ```

pub mod document;
pub mod format;
pub mod layout;
pub mod template;
pub mod writer;

pub use document::{PresentationDocument, SlideRef};
pub use format::{EmbeddedImage, ImageFormat};
pub use layout::{LayoutPlaceholder, PlaceholderSlot, Region, SlideLayout, SlideTemplate};
pub use writer::{Paragraph, SlideBuilder, TableSpec};
