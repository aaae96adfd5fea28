//! Writers for new slide content.

pub mod shape;
pub mod slide;

pub use shape::{Paragraph, TableSpec, MAX_LEVEL};
pub use slide::SlideBuilder;
