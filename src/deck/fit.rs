//! Aspect-ratio fitting of pictures into placeholder boxes.

use crate::common::{Emu, Rect};

/// Shrink `placeholder` to the aspect ratio of a `width` x `height` image and
/// center the result inside the original box.
///
/// When the placeholder is relatively wider than the image the width
/// shrinks, otherwise the height does; the other dimension keeps the
/// placeholder's size, so the picture is never scaled past the box. Offsets
/// move by half the freed space. Degenerate sizes leave the box unchanged.
pub fn fit_picture(placeholder: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 || placeholder.cx <= 0 || placeholder.cy <= 0 {
        return placeholder;
    }

    let image_ratio = width as f64 / height as f64;
    let placeholder_ratio = placeholder.cx as f64 / placeholder.cy as f64;

    if placeholder_ratio > image_ratio {
        let new_width = (placeholder.cy as f64 * image_ratio).round() as Emu;
        let freed = placeholder.cx - new_width;
        Rect::new(placeholder.x + freed / 2, placeholder.y, new_width, placeholder.cy)
    } else {
        let new_height = (placeholder.cx as f64 / image_ratio).round() as Emu;
        let freed = placeholder.cy - new_height;
        Rect::new(placeholder.x, placeholder.y + freed / 2, placeholder.cx, new_height)
    }
}
