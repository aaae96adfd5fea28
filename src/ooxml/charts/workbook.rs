//! Embedded workbook holding a chart's data.
//!
//! PowerPoint opens this workbook when the user edits chart data, and the
//! chart part's formulas point into it. Layout of `Sheet1`:
//!
//! ```text
//! category charts              XY charts (two columns per series)
//!     |  A   |  B   |  C  |        |  A  |  B   |  C  |  D   |
//!   1 |      | s1   | s2  |      1 |     | s1   |     | s2   |
//!   2 | cat1 | 10   | 15  |      2 | x   | y    | x   | y    |
//!   3 | cat2 | 20   | 25  |      3 | x   | y    | x   | y    |
//! ```

use crate::common::{escape_xml, format_number};
use crate::ooxml::charts::models::{ChartDefinition, SeriesValues};
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as ct, namespace, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Part};
use std::collections::BTreeMap;
use std::fmt::Write as _;

const SHEET_NAME: &str = "Sheet1";

/// Cell references shared by the worksheet writer and the chart formulas.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SheetLayout {
    xy: bool,
}

impl SheetLayout {
    pub(crate) fn for_chart(chart: &ChartDefinition) -> Self {
        Self {
            xy: !chart.kind.uses_categories(),
        }
    }

    /// Column holding series `i`'s name and (y) values.
    fn value_column(&self, i: usize) -> usize {
        if self.xy { 2 * i + 1 } else { i + 1 }
    }

    fn x_column(i: usize) -> usize {
        2 * i
    }

    pub(crate) fn series_name_ref(&self, i: usize) -> String {
        format!("{}!${}$1", SHEET_NAME, column_letter(self.value_column(i)))
    }

    pub(crate) fn categories_ref(&self, count: usize) -> String {
        range_ref(0, count)
    }

    pub(crate) fn values_ref(&self, i: usize, count: usize) -> String {
        range_ref(self.value_column(i), count)
    }

    pub(crate) fn x_values_ref(&self, i: usize, count: usize) -> String {
        range_ref(Self::x_column(i), count)
    }
}

/// `Sheet1!$B$2:$B$5` style reference to `count` data rows of a column.
fn range_ref(col: usize, count: usize) -> String {
    let letter = column_letter(col);
    format!(
        "{}!${}$2:${}${}",
        SHEET_NAME,
        letter,
        letter,
        count.max(1) + 1
    )
}

/// Convert a 0-based column index to its letter (0=A, 25=Z, 26=AA).
pub(crate) fn column_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Build the `.xlsx` bytes for `chart`.
pub fn generate_chart_workbook(chart: &ChartDefinition) -> Result<Vec<u8>> {
    let workbook_uri = PackURI::new("/xl/workbook.xml").map_err(invalid_uri)?;
    let sheet_uri = PackURI::new("/xl/worksheets/sheet1.xml").map_err(invalid_uri)?;
    let styles_uri = PackURI::new("/xl/styles.xml").map_err(invalid_uri)?;

    let mut package = OpcPackage::new();

    let mut workbook = Part::new(
        workbook_uri.clone(),
        ct::SML_SHEET_MAIN,
        workbook_xml().into_bytes(),
    );
    workbook.relate_to(&sheet_uri, rt::WORKSHEET);
    workbook.relate_to(&styles_uri, rt::STYLES);
    package.add_part(workbook);
    package.add_part(Part::new(
        sheet_uri,
        ct::SML_WORKSHEET,
        worksheet_xml(chart).into_bytes(),
    ));
    package.add_part(Part::new(styles_uri, ct::SML_STYLES, STYLES_XML.as_bytes().to_vec()));
    package.relate_to(&workbook_uri, rt::OFFICE_DOCUMENT);

    Ok(package.to_bytes()?)
}

fn invalid_uri(msg: String) -> crate::ooxml::OoxmlError {
    crate::ooxml::OoxmlError::InvalidFormat(msg)
}

fn workbook_xml() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <workbook xmlns=\"{}\" xmlns:r=\"{}\"><sheets><sheet name=\"{}\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>",
        namespace::SML_MAIN,
        namespace::OFC_RELATIONSHIPS,
        SHEET_NAME
    )
}

const STYLES_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
    "<styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">",
    "<fonts count=\"1\"><font><sz val=\"11\"/><name val=\"Calibri\"/></font></fonts>",
    "<fills count=\"2\"><fill><patternFill patternType=\"none\"/></fill><fill><patternFill patternType=\"gray125\"/></fill></fills>",
    "<borders count=\"1\"><border/></borders>",
    "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
    "<cellXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/></cellXfs>",
    "</styleSheet>"
);

/// Cell content keyed by (row, column), both 0-based.
enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

fn worksheet_xml(chart: &ChartDefinition) -> String {
    let layout = SheetLayout::for_chart(chart);
    let mut cells: BTreeMap<(usize, usize), Cell<'_>> = BTreeMap::new();

    if chart.kind.uses_categories() {
        for (row, category) in chart.categories.iter().enumerate() {
            cells.insert((row + 1, 0), Cell::Text(category));
        }
    }

    for (i, series) in chart.series.iter().enumerate() {
        let col = layout.value_column(i);
        cells.insert((0, col), Cell::Text(&series.name));
        match &series.values {
            SeriesValues::Category(values) => {
                for (row, value) in values.iter().enumerate() {
                    cells.insert((row + 1, col), Cell::Number(*value));
                }
            },
            SeriesValues::Points(points) => {
                for (row, (x, y)) in points.iter().enumerate() {
                    cells.insert((row + 1, SheetLayout::x_column(i)), Cell::Number(*x));
                    cells.insert((row + 1, col), Cell::Number(*y));
                }
            },
        }
    }

    let mut xml = String::with_capacity(512 + cells.len() * 48);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    let _ = write!(xml, "<worksheet xmlns=\"{}\"><sheetData>", namespace::SML_MAIN);

    let mut current_row = None;
    for ((row, col), cell) in &cells {
        if current_row != Some(*row) {
            if current_row.is_some() {
                xml.push_str("</row>");
            }
            let _ = write!(xml, "<row r=\"{}\">", row + 1);
            current_row = Some(*row);
        }
        let reference = format!("{}{}", column_letter(*col), row + 1);
        match cell {
            Cell::Text(text) => {
                let _ = write!(
                    xml,
                    "<c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                    reference,
                    escape_xml(text)
                );
            },
            Cell::Number(value) => {
                let _ = write!(xml, "<c r=\"{}\"><v>{}</v></c>", reference, format_number(*value));
            },
        }
    }
    if current_row.is_some() {
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::charts::models::ChartSeries;
    use crate::ooxml::charts::types::ChartKind;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_category_layout_refs() {
        let chart = ChartDefinition::new(ChartKind::ColumnClustered);
        let layout = SheetLayout::for_chart(&chart);
        assert_eq!(layout.series_name_ref(0), "Sheet1!$B$1");
        assert_eq!(layout.categories_ref(3), "Sheet1!$A$2:$A$4");
        assert_eq!(layout.values_ref(1, 3), "Sheet1!$C$2:$C$4");
    }

    #[test]
    fn test_xy_layout_refs() {
        let chart = ChartDefinition::new(ChartKind::XyScatter);
        let layout = SheetLayout::for_chart(&chart);
        assert_eq!(layout.series_name_ref(1), "Sheet1!$D$1");
        assert_eq!(layout.x_values_ref(1, 2), "Sheet1!$C$2:$C$3");
        assert_eq!(layout.values_ref(1, 2), "Sheet1!$D$2:$D$3");
    }

    #[test]
    fn test_worksheet_rows_in_order() {
        let chart = ChartDefinition::new(ChartKind::Line)
            .with_categories(vec!["Q1".into(), "Q2".into()])
            .add_series(ChartSeries::new("Sales", SeriesValues::Category(vec![10.0, 12.5])));

        let xml = worksheet_xml(&chart);
        assert!(xml.contains(r#"<row r="1"><c r="B1" t="inlineStr"><is><t>Sales</t></is></c></row>"#));
        assert!(xml.contains(r#"<c r="A2" t="inlineStr"><is><t>Q1</t></is></c><c r="B2"><v>10</v></c>"#));
        assert!(xml.contains(r#"<c r="B3"><v>12.5</v></c>"#));
    }

    #[test]
    fn test_workbook_is_a_readable_package() {
        let chart = ChartDefinition::new(ChartKind::XyScatter)
            .add_series(ChartSeries::new("pts", SeriesValues::Points(vec![(1.0, 2.0), (3.0, 4.0)])));

        let bytes = generate_chart_workbook(&chart).unwrap();
        assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x03, 0x04]);

        let pkg = OpcPackage::from_bytes(&bytes).unwrap();
        let main = pkg.main_document_partname().unwrap();
        assert_eq!(main.as_str(), "/xl/workbook.xml");
        let sheet = pkg
            .part(&PackURI::new("/xl/worksheets/sheet1.xml").unwrap())
            .unwrap();
        let text = sheet.xml_str().unwrap();
        assert!(text.contains(r#"<c r="A2"><v>1</v></c><c r="B2"><v>2</v></c>"#));
    }
}
