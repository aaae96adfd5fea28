//! Chart payloads and chart type selection.
//!
//! [`select_chart`] is a pure classifier over the payload shape. Rendering
//! happens afterwards in [`build_chart`], which checks the payload against
//! the selected encoding and produces the chart definition written into the
//! deck.

use crate::error::{DeckError, Result};
use crate::ooxml::charts::{ChartDefinition, ChartKind, ChartSeries, LegendPosition, SeriesValues};
use schemars::JsonSchema;
use serde::Deserialize;
use std::fmt;

/// Category-label tokens that mark a payload as a time series.
const TEMPORAL_TOKENS: [&str; 9] = ["date", "time", "year", "month", "quarter", "q1", "q2", "q3", "q4"];

/// Largest category count still drawn as a pie.
const PIE_MAX_CATEGORIES: usize = 8;

/// Inclusive range a single series must sum to for a pie.
const PIE_TOTAL: (f64, f64) = (95.0, 105.0);

/// A category label: text or a number.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Category {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One series value: a number, an `[x, y]` pair, or numeric text.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SeriesValue {
    Number(f64),
    Pair(f64, f64),
    Text(String),
}

impl SeriesValue {
    /// Scalar value, parsing numeric text. `NaN` and infinities are not
    /// numbers here; chart caches cannot hold them.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Pair(..) => None,
        };
        value.filter(|v: &f64| v.is_finite())
    }

    pub fn as_pair(&self) -> Option<(f64, f64)> {
        match self {
            Self::Pair(x, y) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct SeriesPayload {
    /// Name of the data series
    pub name: String,
    /// Values for the series. Can be simple numbers or [x,y] pairs for scatter plots
    pub values: Vec<SeriesValue>,
}

/// Chart data as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct ChartPayload {
    /// X-axis categories or labels (optional)
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
    pub series: Vec<SeriesPayload>,
    /// X-axis title (optional)
    #[serde(default)]
    pub x_axis: Option<String>,
    /// Y-axis title (optional)
    #[serde(default)]
    pub y_axis: Option<String>,
}

impl ChartPayload {
    /// Categories, with an empty list treated as absent.
    fn categories(&self) -> &[Category] {
        self.categories.as_deref().unwrap_or_default()
    }
}

/// The chart family chosen for a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartShape {
    Scatter,
    Pie,
    Line,
    ClusteredBar,
    ClusteredColumn,
}

impl ChartShape {
    pub const fn chart_kind(&self) -> ChartKind {
        match self {
            Self::Scatter => ChartKind::XyScatter,
            Self::Pie => ChartKind::Pie,
            Self::Line => ChartKind::Line,
            Self::ClusteredBar => ChartKind::BarClustered,
            Self::ClusteredColumn => ChartKind::ColumnClustered,
        }
    }
}

impl fmt::Display for ChartShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scatter => "xy_scatter",
            Self::Pie => "pie",
            Self::Line => "line",
            Self::ClusteredBar => "bar_clustered",
            Self::ClusteredColumn => "column_clustered",
        })
    }
}

/// How series values are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueEncoding {
    /// One value per shared category.
    Category,
    /// Independent (x, y) points per series.
    Pair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSelection {
    pub shape: ChartShape,
    pub encoding: ValueEncoding,
}

impl ChartSelection {
    const fn category(shape: ChartShape) -> Self {
        Self {
            shape,
            encoding: ValueEncoding::Category,
        }
    }
}

/// Pick a chart shape and value encoding for `payload`. First match wins:
///
/// 1. the first value of the first non-empty series is a pair: scatter;
/// 2. one series, at most eight categories, values summing to 95..=105: pie;
/// 3. any category label contains a temporal token: line;
/// 4. several series over categories: clustered bar;
/// 5. otherwise clustered column.
pub fn select_chart(payload: &ChartPayload) -> ChartSelection {
    let first_value = payload
        .series
        .iter()
        .find_map(|series| series.values.first());
    if first_value.is_some_and(|v| v.as_pair().is_some()) {
        return ChartSelection {
            shape: ChartShape::Scatter,
            encoding: ValueEncoding::Pair,
        };
    }

    let categories = payload.categories();

    if let [series] = payload.series.as_slice()
        && !categories.is_empty()
        && categories.len() <= PIE_MAX_CATEGORIES
        && let Some(total) = series
            .values
            .iter()
            .map(SeriesValue::as_number)
            .sum::<Option<f64>>()
        && (PIE_TOTAL.0..=PIE_TOTAL.1).contains(&total)
    {
        return ChartSelection::category(ChartShape::Pie);
    }

    let is_temporal = |category: &Category| {
        let label = category.to_string().to_lowercase();
        TEMPORAL_TOKENS.iter().any(|token| label.contains(token))
    };
    if categories.iter().any(is_temporal) {
        return ChartSelection::category(ChartShape::Line);
    }

    if payload.series.len() > 1 && !categories.is_empty() {
        return ChartSelection::category(ChartShape::ClusteredBar);
    }

    ChartSelection::category(ChartShape::ClusteredColumn)
}

/// Check `payload` against `selection` and build the chart definition.
///
/// Every series must match the selected encoding: all pairs for scatter
/// charts, all numbers otherwise. The legend sits below the plot when there
/// is more than one series. Pie charts have no axes, so axis titles are
/// dropped for them.
pub fn build_chart(payload: &ChartPayload, selection: ChartSelection) -> Result<ChartDefinition> {
    if payload.series.is_empty() {
        return Err(DeckError::InvalidChartData(
            "at least one series is required".to_string(),
        ));
    }

    let kind = selection.shape.chart_kind();
    let mut chart = ChartDefinition::new(kind);

    if selection.encoding == ValueEncoding::Category {
        chart = chart.with_categories(payload.categories().iter().map(ToString::to_string).collect());
    }

    for series in &payload.series {
        let values = match selection.encoding {
            ValueEncoding::Pair => SeriesValues::Points(
                series
                    .values
                    .iter()
                    .map(SeriesValue::as_pair)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        DeckError::InvalidChartData(format!(
                            "series '{}' mixes [x, y] pairs with other values",
                            series.name
                        ))
                    })?,
            ),
            ValueEncoding::Category => SeriesValues::Category(
                series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        v.as_number().ok_or_else(|| {
                            DeckError::InvalidChartData(format!(
                                "series '{}' value {} is not a finite number",
                                series.name,
                                i + 1
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        chart = chart.add_series(ChartSeries::new(series.name.clone(), values));
    }

    let legend = if payload.series.len() > 1 {
        LegendPosition::Bottom
    } else {
        LegendPosition::Right
    };
    chart = chart.with_legend(legend);

    if kind.has_axes() {
        chart = chart.with_axis_titles(payload.x_axis.clone(), payload.y_axis.clone());
    }

    Ok(chart)
}
