//! Helpers shared by the container and deck layers.

pub mod number;
pub mod unit;
pub mod xml;

pub use number::format_number;
pub use unit::{EMUS_PER_INCH, Emu, Rect, inches};
pub use xml::escape_xml;
