//! Length units used by DrawingML geometry.

/// English Metric Units, the integral length unit of DrawingML.
pub type Emu = i64;

pub const EMUS_PER_INCH: Emu = 914_400;

/// Convert whole and fractional inches to EMU, truncating like the
/// Office object models do.
#[inline]
pub fn inches(value: f64) -> Emu {
    (value * EMUS_PER_INCH as f64) as Emu
}

/// Font size in hundredths of a point, as stored in `a:rPr/@sz`.
#[inline]
pub fn font_size_centipoints(pt: u32) -> u32 {
    pt * 100
}

/// An axis-aligned box in EMU: offset plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: Emu,
    pub y: Emu,
    pub cx: Emu,
    pub cy: Emu,
}

impl Rect {
    pub const fn new(x: Emu, y: Emu, cx: Emu, cy: Emu) -> Self {
        Self { x, y, cx, cy }
    }
}
