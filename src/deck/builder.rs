//! Slide operations, one per slide template.
//!
//! Each operation validates its arguments, drafts the slide against the
//! template's layout, and only then appends it to the deck. A failure at any
//! point leaves the deck unchanged.

use crate::common::{Rect, inches};
use crate::deck::Deck;
use crate::deck::chart::{ChartPayload, ChartShape, build_chart, select_chart};
use crate::deck::fit::fit_picture;
use crate::deck::text::indented_lines;
use crate::error::{DeckError, Result};
use crate::ooxml::OoxmlError;
use crate::ooxml::pptx::{
    EmbeddedImage, Paragraph, Region, SlideBuilder, SlideRef, SlideTemplate, TableSpec,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const TABLE_LEFT: f64 = 1.0;
const TABLE_TOP: f64 = 2.0;
const TABLE_WIDTH: f64 = 8.0;
const TABLE_ROW_HEIGHT: f64 = 0.4;
const TABLE_HEADER_PT: u32 = 11;
const TABLE_BODY_PT: u32 = 10;

/// Position and size of the chart frame, in inches.
const CHART_BOX: (f64, f64, f64, f64) = (1.0, 2.0, 8.0, 5.0);

/// Table data: one header row and any number of data rows.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct TablePayload {
    /// Array of column headers
    pub headers: Vec<serde_json::Value>,
    /// Array of row data arrays
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl TablePayload {
    /// Check the table shape: headers and rows present, every row as wide as
    /// the header.
    pub fn validate(&self) -> Result<()> {
        if self.headers.is_empty() {
            return Err(DeckError::MissingTableHeaders);
        }
        if self.rows.is_empty() {
            return Err(DeckError::MissingTableRows);
        }
        let expected = self.headers.len();
        if let Some((i, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
        {
            return Err(DeckError::RowLengthMismatch {
                row: i + 1,
                expected,
                actual: row.len(),
            });
        }
        Ok(())
    }

    fn to_spec(&self) -> TableSpec {
        let columns = self.headers.len().max(1);
        TableSpec {
            header: self.headers.iter().map(cell_text).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(cell_text).collect())
                .collect(),
            column_width: inches(TABLE_WIDTH / columns as f64),
            row_height: inches(TABLE_ROW_HEIGHT),
            header_font_size: TABLE_HEADER_PT,
            body_font_size: TABLE_BODY_PT,
        }
    }
}

/// Text shown in a table cell for any JSON value. Strings are shown as
/// given, `null` as an empty cell, and numbers and booleans in their JSON
/// spelling (`0.5`, `true`, `false`).
fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The four text regions of a comparison slide.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonSides<'a> {
    pub left_heading: &'a str,
    pub left_body: &'a str,
    pub right_heading: &'a str,
    pub right_body: &'a str,
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeckError::MissingArgument(field));
    }
    Ok(())
}

/// Start a draft for `template`, checking that the layout has every region
/// the template writes to.
fn draft(deck: &Deck, template: SlideTemplate) -> Result<SlideBuilder> {
    let builder = deck
        .document()
        .begin_slide(template)
        .map_err(|e| DeckError::document(deck.name(), "add a slide to", e))?;

    let layout = builder.layout();
    if let Some((region, _)) = template
        .regions()
        .iter()
        .find(|(_, slot)| layout.placeholder(*slot).is_none())
    {
        return Err(DeckError::RegionMissing {
            layout: layout.name().to_string(),
            region: *region,
        });
    }
    Ok(builder)
}

fn set_text(
    deck: &Deck,
    builder: &mut SlideBuilder,
    template: SlideTemplate,
    region: Region,
    paragraphs: Vec<Paragraph>,
) -> Result<()> {
    let slot = template.slot_for(region).ok_or_else(|| DeckError::RegionMissing {
        layout: builder.layout().name().to_string(),
        region,
    })?;
    builder
        .set_text(slot, paragraphs)
        .map_err(|e| DeckError::document(deck.name(), "fill a placeholder in", e))
}

fn plain(text: &str) -> Vec<Paragraph> {
    Paragraph::lines_of(text)
}

fn commit(deck: &mut Deck, builder: SlideBuilder, operation: &'static str) -> Result<SlideRef> {
    let slide = deck
        .document_mut()
        .add_slide(builder)
        .map_err(|e| DeckError::document(deck.name(), operation, e))?;
    debug!(
        "Added slide {} (id {}) to presentation {}",
        slide.index + 1,
        slide.slide_id,
        deck.name()
    );
    Ok(slide)
}

/// Append a slide holding only a title.
pub fn add_title_slide(deck: &mut Deck, title: &str) -> Result<SlideRef> {
    require(title, "title")?;
    let template = SlideTemplate::TitleOnly;
    let mut builder = draft(deck, template)?;
    set_text(deck, &mut builder, template, Region::Title, plain(title))?;
    commit(deck, builder, "add a title slide to")
}

/// Append a section header; the subtitle is written only when non-empty.
pub fn add_section_header(deck: &mut Deck, header: &str, subtitle: Option<&str>) -> Result<SlideRef> {
    require(header, "header")?;
    let template = SlideTemplate::SectionHeader;
    let mut builder = draft(deck, template)?;
    set_text(deck, &mut builder, template, Region::Title, plain(header))?;
    if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
        set_text(deck, &mut builder, template, Region::Subtitle, plain(subtitle))?;
    }
    commit(deck, builder, "add a section header slide to")
}

/// Append a title and content slide. Leading tabs in `content` set the
/// outline level of each line.
pub fn add_title_content(deck: &mut Deck, title: &str, content: &str) -> Result<SlideRef> {
    require(title, "title")?;
    require(content, "content")?;
    let template = SlideTemplate::TitleAndContent;
    let mut builder = draft(deck, template)?;
    set_text(deck, &mut builder, template, Region::Title, plain(title))?;
    let body = indented_lines(content)
        .into_iter()
        .map(|line| Paragraph::new(line.text, line.level))
        .collect();
    set_text(deck, &mut builder, template, Region::Body, body)?;
    commit(deck, builder, "add a content slide to")
}

/// Append a two-column comparison slide.
pub fn add_comparison(deck: &mut Deck, title: &str, sides: ComparisonSides<'_>) -> Result<SlideRef> {
    require(title, "title")?;
    require(sides.left_heading, "left_side_title")?;
    require(sides.left_body, "left_side_content")?;
    require(sides.right_heading, "right_side_title")?;
    require(sides.right_body, "right_side_content")?;

    let template = SlideTemplate::Comparison;
    let mut builder = draft(deck, template)?;
    for (region, text) in [
        (Region::Title, title),
        (Region::LeftHeading, sides.left_heading),
        (Region::LeftBody, sides.left_body),
        (Region::RightHeading, sides.right_heading),
        (Region::RightBody, sides.right_body),
    ] {
        set_text(deck, &mut builder, template, region, plain(text))?;
    }
    commit(deck, builder, "add a comparison slide to")
}

/// Append a title slide with a table below the title.
pub fn add_table_slide(deck: &mut Deck, title: &str, table: &TablePayload) -> Result<SlideRef> {
    require(title, "title")?;
    table.validate()?;

    let template = SlideTemplate::Table;
    let mut builder = draft(deck, template)?;
    set_text(deck, &mut builder, template, Region::Title, plain(title))?;
    builder.add_table(table.to_spec(), inches(TABLE_LEFT), inches(TABLE_TOP));
    commit(deck, builder, "add a table slide to")
}

/// Append a title slide with a chart whose shape is picked from the data.
pub fn add_chart_slide(
    deck: &mut Deck,
    title: &str,
    payload: &ChartPayload,
) -> Result<(SlideRef, ChartShape)> {
    require(title, "title")?;
    let selection = select_chart(payload);
    let chart = build_chart(payload, selection)?;

    let template = SlideTemplate::Chart;
    let mut builder = draft(deck, template)?;
    set_text(deck, &mut builder, template, Region::Title, plain(title))?;
    let (x, y, cx, cy) = CHART_BOX;
    builder
        .add_chart(&chart, Rect::new(inches(x), inches(y), inches(cx), inches(cy)))
        .map_err(|e| DeckError::document(deck.name(), "render a chart in", e))?;
    let slide = commit(deck, builder, "add a chart slide to")?;
    Ok((slide, selection.shape))
}

/// Append a picture slide. The picture keeps its own aspect ratio and is
/// centered in the picture placeholder; the caption goes underneath.
pub fn add_picture_slide(
    deck: &mut Deck,
    title: &str,
    caption: &str,
    image_path: &Path,
) -> Result<SlideRef> {
    require(title, "title")?;
    require(caption, "caption")?;
    if !image_path.is_file() {
        return Err(DeckError::ImageNotFound(image_path.to_path_buf()));
    }
    let bytes = std::fs::read(image_path).map_err(|e| DeckError::io(image_path, e))?;
    let image = EmbeddedImage::probe(bytes).map_err(|source| DeckError::ImageNotDecodable {
        path: image_path.to_path_buf(),
        source,
    })?;

    let template = SlideTemplate::Picture;
    let mut builder = draft(deck, template)?;
    let slot = template
        .slot_for(Region::Picture)
        .ok_or_else(|| DeckError::RegionMissing {
            layout: builder.layout().name().to_string(),
            region: Region::Picture,
        })?;
    let bbox = builder
        .layout()
        .placeholder(slot)
        .and_then(|placeholder| placeholder.bbox)
        .ok_or_else(|| {
            DeckError::document(
                deck.name(),
                "place a picture in",
                OoxmlError::InvalidFormat("picture placeholder has no position".to_string()),
            )
        })?;
    let rect = fit_picture(bbox, image.width, image.height);
    let description = image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    set_text(deck, &mut builder, template, Region::Title, plain(title))?;
    builder
        .set_picture(slot, image, rect, description)
        .map_err(|e| DeckError::document(deck.name(), "place a picture in", e))?;
    set_text(deck, &mut builder, template, Region::Caption, plain(caption))?;
    commit(deck, builder, "add a picture slide to")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EMUS_PER_INCH;
    use crate::error::ErrorKind;
    use crate::ooxml::PackURI;
    use image::{DynamicImage, RgbImage};
    use serde_json::json;

    fn deck() -> Deck {
        Deck::new("demo").unwrap()
    }

    fn slide_xml(deck: &Deck, slide: &SlideRef) -> String {
        deck.document()
            .package()
            .part(&slide.partname)
            .unwrap()
            .xml_str()
            .unwrap()
            .to_string()
    }

    fn table(value: serde_json::Value) -> TablePayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_title_and_section_slides() {
        let mut deck = deck();
        let first = add_title_slide(&mut deck, "Quarterly Review").unwrap();
        assert!(slide_xml(&deck, &first).contains("<a:t>Quarterly Review</a:t>"));

        let section = add_section_header(&mut deck, "Results", Some("")).unwrap();
        let xml = slide_xml(&deck, &section);
        assert!(xml.contains("<a:t>Results</a:t>"));
        assert_eq!(xml.matches("<a:t>").count(), 1);

        let section = add_section_header(&mut deck, "Outlook", Some("Next year")).unwrap();
        assert!(slide_xml(&deck, &section).contains("<a:t>Next year</a:t>"));
        assert_eq!(deck.slide_count().unwrap(), 3);
    }

    #[test]
    fn test_content_levels() {
        let mut deck = deck();
        let slide = add_title_content(&mut deck, "Agenda", "Intro\r\n\tDetails\r\n\r\nWrap-up").unwrap();
        let xml = slide_xml(&deck, &slide);
        assert!(xml.contains(r#"<a:p><a:pPr lvl="1"/><a:r><a:rPr lang="en-US" dirty="0"/><a:t>Details</a:t>"#));
        assert!(xml.contains("<a:t>Wrap-up</a:t>"));
        assert_eq!(xml.matches("<a:p>").count(), 4);
    }

    #[test]
    fn test_missing_argument_leaves_deck_untouched() {
        let mut deck = deck();
        let err = add_title_content(&mut deck, "Agenda", "  ").unwrap_err();
        assert!(matches!(err, DeckError::MissingArgument("content")));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(deck.slide_count().unwrap(), 0);
    }

    #[test]
    fn test_comparison_fills_four_regions() {
        let mut deck = deck();
        let sides = ComparisonSides {
            left_heading: "Rust",
            left_body: "Ownership",
            right_heading: "Go",
            right_body: "GC",
        };
        let slide = add_comparison(&mut deck, "Languages", sides).unwrap();
        let xml = slide_xml(&deck, &slide);
        let order: Vec<usize> = ["Languages", "Rust", "Ownership", "Go", "GC"]
            .iter()
            .map(|t| xml.find(&format!("<a:t>{}</a:t>", t)).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_table_validation() {
        let mut deck = deck();
        let ragged = table(json!({"headers": ["A", "B"], "rows": [["1", "2"], ["3"]]}));
        assert!(matches!(
            add_table_slide(&mut deck, "T", &ragged),
            Err(DeckError::RowLengthMismatch {
                row: 2,
                expected: 2,
                actual: 1
            })
        ));
        let no_headers = table(json!({"headers": [], "rows": [["1"]]}));
        assert!(matches!(no_headers.validate(), Err(DeckError::MissingTableHeaders)));
        let no_rows = table(json!({"headers": ["A"], "rows": []}));
        assert!(matches!(no_rows.validate(), Err(DeckError::MissingTableRows)));
        assert_eq!(deck.slide_count().unwrap(), 0);
    }

    #[test]
    fn test_table_cells_and_geometry() {
        let mut deck = deck();
        let payload = table(json!({
            "headers": ["Region", "Units", "Share"],
            "rows": [["North", 120, 0.5], ["South", null, true]]
        }));
        let spec = payload.to_spec();
        assert!((spec.column_width - 8 * EMUS_PER_INCH / 3).abs() <= 1);
        assert_eq!(spec.row_height, EMUS_PER_INCH * 2 / 5);
        assert_eq!(spec.rows[0], vec!["North", "120", "0.5"]);
        assert_eq!(spec.rows[1], vec!["South", "", "true"]);
        assert_eq!(cell_text(&json!(false)), "false");
        assert_eq!(cell_text(&json!("  padded ")), "  padded ");

        let slide = add_table_slide(&mut deck, "Sales", &payload).unwrap();
        let xml = slide_xml(&deck, &slide);
        assert!(xml.contains("<a:tbl>"));
        assert!(xml.contains("<a:t>North</a:t>"));
    }

    #[test]
    fn test_chart_slide_reports_shape() {
        let mut deck = deck();
        let payload: ChartPayload = serde_json::from_value(json!({
            "categories": ["Q1", "Q2"],
            "series": [{"name": "Revenue", "values": [10, 12]}]
        }))
        .unwrap();
        let (slide, shape) = add_chart_slide(&mut deck, "Trend", &payload).unwrap();
        assert_eq!(shape, ChartShape::Line);
        assert!(slide_xml(&deck, &slide).contains("<c:chart "));
        let chart = PackURI::new("/ppt/charts/chart1.xml").unwrap();
        assert!(deck.document().package().contains_part(&chart));
    }

    #[test]
    fn test_picture_slide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        DynamicImage::ImageRgb8(RgbImage::new(200, 50)).save(&path).unwrap();

        let mut deck = deck();
        let slide = add_picture_slide(&mut deck, "Photo", "A wide picture", &path).unwrap();
        let xml = slide_xml(&deck, &slide);
        assert!(xml.contains(r#"r:embed="rId2""#));
        assert!(xml.contains("<a:t>A wide picture</a:t>"));
        let media = PackURI::new("/ppt/media/image1.png").unwrap();
        assert!(deck.document().package().contains_part(&media));
    }

    #[test]
    fn test_picture_errors_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let mut deck = deck();

        let missing = dir.path().join("nope.png");
        let err = add_picture_slide(&mut deck, "P", "C", &missing).unwrap_err();
        assert!(matches!(err, DeckError::ImageNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not an image").unwrap();
        let err = add_picture_slide(&mut deck, "P", "C", &garbage).unwrap_err();
        assert!(matches!(err, DeckError::ImageNotDecodable { .. }));
        assert_eq!(deck.slide_count().unwrap(), 0);
    }
}
