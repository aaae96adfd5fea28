//! Chart families and small enumerations written into chart XML.

/// The chart families a deck can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    /// Vertical bars, series side by side
    ColumnClustered,
    /// Horizontal bars, series side by side
    BarClustered,
    /// Line chart over a category axis
    Line,
    /// Single-series pie
    Pie,
    /// XY scatter, markers only
    XyScatter,
}

impl ChartKind {
    /// Whether series are keyed by a shared category axis.
    #[inline]
    pub const fn uses_categories(&self) -> bool {
        !matches!(self, Self::XyScatter)
    }

    /// Whether the plot has axes at all.
    #[inline]
    pub const fn has_axes(&self) -> bool {
        !matches!(self, Self::Pie)
    }
}

/// Axis position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    Bottom,
    Left,
}

impl AxisPosition {
    #[inline]
    pub const fn xml_value(&self) -> &'static str {
        match self {
            Self::Bottom => "b",
            Self::Left => "l",
        }
    }
}

/// Legend position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    Right,
    Bottom,
}

impl LegendPosition {
    #[inline]
    pub const fn xml_value(&self) -> &'static str {
        match self {
            Self::Right => "r",
            Self::Bottom => "b",
        }
    }
}
