//! DrawingML charts: the chart part written for a chart slide and the
//! workbook embedded next to it.

pub mod models;
pub mod types;
pub mod workbook;
pub mod writer;

pub use models::{ChartDefinition, ChartSeries, SeriesValues};
pub use types::{AxisPosition, ChartKind, LegendPosition};
pub use workbook::generate_chart_workbook;
pub use writer::write_chart;
