//! Chart part XML writer.

use crate::common::{escape_xml, format_number};
use crate::ooxml::charts::models::{ChartDefinition, ChartSeries, SeriesValues};
use crate::ooxml::charts::types::{AxisPosition, ChartKind, LegendPosition};
use crate::ooxml::charts::workbook::SheetLayout;
use crate::ooxml::opc::constants::namespace;
use std::fmt::{Result, Write};

const PRIMARY_AXIS_ID: u32 = 2_094_734_552;
const SECONDARY_AXIS_ID: u32 = 2_094_734_553;

/// Write a complete `c:chartSpace` document for `chart`.
///
/// `workbook_rid` is the relationship id of the embedded workbook, when the
/// chart part has one.
pub fn write_chart<W: Write>(
    writer: &mut W,
    chart: &ChartDefinition,
    workbook_rid: Option<&str>,
) -> Result {
    let layout = SheetLayout::for_chart(chart);

    write!(writer, r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#)?;
    write!(
        writer,
        r#"<c:chartSpace xmlns:c="{}" xmlns:a="{}" xmlns:r="{}">"#,
        namespace::DML_CHART,
        namespace::DML_MAIN,
        namespace::OFC_RELATIONSHIPS
    )?;
    write!(writer, r#"<c:date1904 val="0"/><c:lang val="en-US"/><c:roundedCorners val="0"/>"#)?;

    write!(writer, "<c:chart>")?;
    write!(writer, r#"<c:autoTitleDeleted val="0"/>"#)?;
    write_plot_area(writer, chart, &layout)?;
    if let Some(position) = chart.legend {
        write_legend(writer, position)?;
    }
    write!(writer, r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/>"#)?;
    write!(writer, "</c:chart>")?;

    write_text_properties(writer)?;

    if let Some(r_id) = workbook_rid {
        write!(
            writer,
            r#"<c:externalData r:id="{}"><c:autoUpdate val="0"/></c:externalData>"#,
            escape_xml(r_id)
        )?;
    }

    write!(writer, "</c:chartSpace>")
}

fn write_plot_area<W: Write>(writer: &mut W, chart: &ChartDefinition, layout: &SheetLayout) -> Result {
    write!(writer, "<c:plotArea><c:layout/>")?;

    match chart.kind {
        ChartKind::ColumnClustered => write_bar_chart(writer, chart, layout, "col")?,
        ChartKind::BarClustered => write_bar_chart(writer, chart, layout, "bar")?,
        ChartKind::Line => write_line_chart(writer, chart, layout)?,
        ChartKind::Pie => write_pie_chart(writer, chart, layout)?,
        ChartKind::XyScatter => write_scatter_chart(writer, chart, layout)?,
    }

    match chart.kind {
        ChartKind::Pie => {},
        ChartKind::XyScatter => {
            write_value_axis(
                writer,
                PRIMARY_AXIS_ID,
                SECONDARY_AXIS_ID,
                AxisPosition::Bottom,
                chart.category_axis_title.as_deref(),
                false,
            )?;
            write_value_axis(
                writer,
                SECONDARY_AXIS_ID,
                PRIMARY_AXIS_ID,
                AxisPosition::Left,
                chart.value_axis_title.as_deref(),
                true,
            )?;
        },
        ChartKind::BarClustered => {
            write_category_axis(writer, AxisPosition::Left, chart.category_axis_title.as_deref())?;
            write_value_axis(
                writer,
                SECONDARY_AXIS_ID,
                PRIMARY_AXIS_ID,
                AxisPosition::Bottom,
                chart.value_axis_title.as_deref(),
                true,
            )?;
        },
        ChartKind::ColumnClustered | ChartKind::Line => {
            write_category_axis(writer, AxisPosition::Bottom, chart.category_axis_title.as_deref())?;
            write_value_axis(
                writer,
                SECONDARY_AXIS_ID,
                PRIMARY_AXIS_ID,
                AxisPosition::Left,
                chart.value_axis_title.as_deref(),
                true,
            )?;
        },
    }

    write!(writer, "</c:plotArea>")
}

fn write_bar_chart<W: Write>(
    writer: &mut W,
    chart: &ChartDefinition,
    layout: &SheetLayout,
    direction: &str,
) -> Result {
    write!(writer, "<c:barChart>")?;
    write!(writer, r#"<c:barDir val="{}"/>"#, direction)?;
    write!(writer, r#"<c:grouping val="clustered"/><c:varyColors val="0"/>"#)?;
    for (i, series) in chart.series.iter().enumerate() {
        write_category_series(writer, chart, layout, i, series, SeriesStyle::Bar)?;
    }
    write_data_labels_default(writer)?;
    write!(writer, r#"<c:gapWidth val="150"/>"#)?;
    write_axis_ids(writer)?;
    write!(writer, "</c:barChart>")
}

fn write_line_chart<W: Write>(writer: &mut W, chart: &ChartDefinition, layout: &SheetLayout) -> Result {
    write!(writer, "<c:lineChart>")?;
    write!(writer, r#"<c:grouping val="standard"/><c:varyColors val="0"/>"#)?;
    for (i, series) in chart.series.iter().enumerate() {
        write_category_series(writer, chart, layout, i, series, SeriesStyle::Line)?;
    }
    write_data_labels_default(writer)?;
    write!(writer, r#"<c:marker val="1"/>"#)?;
    write_axis_ids(writer)?;
    write!(writer, "</c:lineChart>")
}

fn write_pie_chart<W: Write>(writer: &mut W, chart: &ChartDefinition, layout: &SheetLayout) -> Result {
    write!(writer, "<c:pieChart>")?;
    write!(writer, r#"<c:varyColors val="1"/>"#)?;
    for (i, series) in chart.series.iter().enumerate() {
        write_category_series(writer, chart, layout, i, series, SeriesStyle::Pie)?;
    }
    write_data_labels_default(writer)?;
    write!(writer, r#"<c:firstSliceAng val="0"/>"#)?;
    write!(writer, "</c:pieChart>")
}

fn write_scatter_chart<W: Write>(writer: &mut W, chart: &ChartDefinition, layout: &SheetLayout) -> Result {
    write!(writer, "<c:scatterChart>")?;
    write!(writer, r#"<c:scatterStyle val="lineMarker"/><c:varyColors val="0"/>"#)?;
    for (i, series) in chart.series.iter().enumerate() {
        write_scatter_series(writer, layout, i, series)?;
    }
    write_data_labels_default(writer)?;
    write_axis_ids(writer)?;
    write!(writer, "</c:scatterChart>")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SeriesStyle {
    Bar,
    Line,
    Pie,
}

fn write_series_head<W: Write>(writer: &mut W, layout: &SheetLayout, i: usize, series: &ChartSeries) -> Result {
    write!(writer, r#"<c:ser><c:idx val="{}"/><c:order val="{}"/>"#, i, i)?;
    write!(writer, "<c:tx><c:strRef><c:f>{}</c:f>", layout.series_name_ref(i))?;
    write!(
        writer,
        r#"<c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>{}</c:v></c:pt></c:strCache>"#,
        escape_xml(&series.name)
    )?;
    write!(writer, "</c:strRef></c:tx>")
}

fn write_category_series<W: Write>(
    writer: &mut W,
    chart: &ChartDefinition,
    layout: &SheetLayout,
    i: usize,
    series: &ChartSeries,
    style: SeriesStyle,
) -> Result {
    write_series_head(writer, layout, i, series)?;

    match style {
        SeriesStyle::Bar => write!(writer, r#"<c:invertIfNegative val="0"/>"#)?,
        SeriesStyle::Line => write!(writer, r#"<c:marker><c:symbol val="none"/></c:marker>"#)?,
        SeriesStyle::Pie => {},
    }

    if !chart.categories.is_empty() {
        write!(writer, "<c:cat>")?;
        write_string_ref(writer, &layout.categories_ref(chart.categories.len()), &chart.categories)?;
        write!(writer, "</c:cat>")?;
    }

    let values: &[f64] = match &series.values {
        SeriesValues::Category(values) => values,
        SeriesValues::Points(_) => &[],
    };
    write!(writer, "<c:val>")?;
    write_numeric_ref(writer, &layout.values_ref(i, values.len()), values.iter().copied())?;
    write!(writer, "</c:val>")?;

    if style == SeriesStyle::Line {
        write!(writer, r#"<c:smooth val="0"/>"#)?;
    }
    write!(writer, "</c:ser>")
}

fn write_scatter_series<W: Write>(writer: &mut W, layout: &SheetLayout, i: usize, series: &ChartSeries) -> Result {
    write_series_head(writer, layout, i, series)?;
    write!(writer, r#"<c:spPr><a:ln w="47625"><a:noFill/></a:ln></c:spPr>"#)?;

    let points: &[(f64, f64)] = match &series.values {
        SeriesValues::Points(points) => points,
        SeriesValues::Category(_) => &[],
    };
    write!(writer, "<c:xVal>")?;
    write_numeric_ref(writer, &layout.x_values_ref(i, points.len()), points.iter().map(|p| p.0))?;
    write!(writer, "</c:xVal><c:yVal>")?;
    write_numeric_ref(writer, &layout.values_ref(i, points.len()), points.iter().map(|p| p.1))?;
    write!(writer, "</c:yVal>")?;
    write!(writer, r#"<c:smooth val="0"/></c:ser>"#)
}

fn write_string_ref<W: Write>(writer: &mut W, formula: &str, values: &[String]) -> Result {
    write!(writer, "<c:strRef><c:f>{}</c:f><c:strCache>", formula)?;
    write!(writer, r#"<c:ptCount val="{}"/>"#, values.len())?;
    for (i, value) in values.iter().enumerate() {
        write!(writer, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, escape_xml(value))?;
    }
    write!(writer, "</c:strCache></c:strRef>")
}

fn write_numeric_ref<W: Write>(
    writer: &mut W,
    formula: &str,
    values: impl ExactSizeIterator<Item = f64>,
) -> Result {
    write!(writer, "<c:numRef><c:f>{}</c:f><c:numCache>", formula)?;
    write!(writer, "<c:formatCode>General</c:formatCode>")?;
    write!(writer, r#"<c:ptCount val="{}"/>"#, values.len())?;
    for (i, value) in values.enumerate() {
        write!(writer, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, format_number(value))?;
    }
    write!(writer, "</c:numCache></c:numRef>")
}

fn write_data_labels_default<W: Write>(writer: &mut W) -> Result {
    write!(writer, "<c:dLbls>")?;
    write!(writer, r#"<c:showLegendKey val="0"/><c:showVal val="0"/><c:showCatName val="0"/>"#)?;
    write!(writer, r#"<c:showSerName val="0"/><c:showPercent val="0"/><c:showBubbleSize val="0"/>"#)?;
    write!(writer, "</c:dLbls>")
}

fn write_axis_ids<W: Write>(writer: &mut W) -> Result {
    write!(
        writer,
        r#"<c:axId val="{}"/><c:axId val="{}"/>"#,
        PRIMARY_AXIS_ID, SECONDARY_AXIS_ID
    )
}

fn write_axis_common<W: Write>(
    writer: &mut W,
    axis_id: u32,
    cross_axis_id: u32,
    position: AxisPosition,
    title: Option<&str>,
    gridlines: bool,
) -> Result {
    write!(writer, r#"<c:axId val="{}"/>"#, axis_id)?;
    write!(writer, r#"<c:scaling><c:orientation val="minMax"/></c:scaling>"#)?;
    write!(writer, r#"<c:delete val="0"/>"#)?;
    write!(writer, r#"<c:axPos val="{}"/>"#, position.xml_value())?;
    if gridlines {
        write!(writer, "<c:majorGridlines/>")?;
    }
    if let Some(title) = title {
        write_title(writer, title)?;
    }
    write!(writer, r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/>"#)?;
    write!(writer, r#"<c:tickLblPos val="nextTo"/>"#)?;
    write!(writer, r#"<c:crossAx val="{}"/>"#, cross_axis_id)?;
    write!(writer, r#"<c:crosses val="autoZero"/>"#)
}

fn write_category_axis<W: Write>(writer: &mut W, position: AxisPosition, title: Option<&str>) -> Result {
    write!(writer, "<c:catAx>")?;
    write_axis_common(writer, PRIMARY_AXIS_ID, SECONDARY_AXIS_ID, position, title, false)?;
    write!(writer, r#"<c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/>"#)?;
    write!(writer, r#"<c:noMultiLvlLbl val="0"/>"#)?;
    write!(writer, "</c:catAx>")
}

fn write_value_axis<W: Write>(
    writer: &mut W,
    axis_id: u32,
    cross_axis_id: u32,
    position: AxisPosition,
    title: Option<&str>,
    gridlines: bool,
) -> Result {
    write!(writer, "<c:valAx>")?;
    write_axis_common(writer, axis_id, cross_axis_id, position, title, gridlines)?;
    write!(writer, r#"<c:crossBetween val="between"/>"#)?;
    write!(writer, "</c:valAx>")
}

fn write_title<W: Write>(writer: &mut W, text: &str) -> Result {
    write!(writer, "<c:title><c:tx><c:rich>")?;
    write!(writer, "<a:bodyPr/><a:lstStyle/>")?;
    write!(writer, "<a:p><a:pPr><a:defRPr/></a:pPr>")?;
    write!(writer, r#"<a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r>"#, escape_xml(text))?;
    write!(writer, "</a:p></c:rich></c:tx>")?;
    write!(writer, r#"<c:overlay val="0"/></c:title>"#)
}

fn write_legend<W: Write>(writer: &mut W, position: LegendPosition) -> Result {
    write!(writer, "<c:legend>")?;
    write!(writer, r#"<c:legendPos val="{}"/>"#, position.xml_value())?;
    write!(writer, r#"<c:overlay val="0"/>"#)?;
    write!(writer, "</c:legend>")
}

fn write_text_properties<W: Write>(writer: &mut W) -> Result {
    write!(writer, "<c:txPr><a:bodyPr/><a:lstStyle/>")?;
    write!(writer, r#"<a:p><a:pPr><a:defRPr sz="1800"/></a:pPr><a:endParaRPr lang="en-US"/></a:p>"#)?;
    write!(writer, "</c:txPr>")
}
