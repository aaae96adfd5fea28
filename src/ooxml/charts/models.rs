//! Chart content ready to be written as a chart part.

use crate::ooxml::charts::types::{ChartKind, LegendPosition};

/// Values of one series in the encoding its chart kind expects.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValues {
    /// One value per category
    Category(Vec<f64>),
    /// Independent (x, y) points
    Points(Vec<(f64, f64)>),
}

impl SeriesValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Category(values) => values.len(),
            Self::Points(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: SeriesValues,
}

impl ChartSeries {
    pub fn new(name: impl Into<String>, values: SeriesValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A complete chart: kind, shared categories, series, legend and axis titles.
///
/// Categories are ignored for [`ChartKind::XyScatter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDefinition {
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub legend: Option<LegendPosition>,
    pub category_axis_title: Option<String>,
    pub value_axis_title: Option<String>,
}

impl ChartDefinition {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            categories: Vec::new(),
            series: Vec::new(),
            legend: None,
            category_axis_title: None,
            value_axis_title: None,
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn add_series(mut self, series: ChartSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_legend(mut self, position: LegendPosition) -> Self {
        self.legend = Some(position);
        self
    }

    pub fn with_axis_titles(mut self, category: Option<String>, value: Option<String>) -> Self {
        self.category_axis_title = category;
        self.value_axis_title = value;
        self
    }
}
