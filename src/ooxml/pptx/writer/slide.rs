//! Slide drafts.
//!
//! A [`SlideBuilder`] collects the content of one new slide against a
//! layout without touching the package. Relationship ids for the layout,
//! pictures and charts are assigned up front so the slide XML can be
//! rendered before the slide part exists; the document commits the draft
//! in one step.

use crate::common::{Emu, Rect};
use crate::ooxml::charts::{ChartDefinition, generate_chart_workbook, write_chart};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::pptx::format::EmbeddedImage;
use crate::ooxml::pptx::layout::{PlaceholderSlot, SlideLayout};
use crate::ooxml::pptx::writer::shape::{
    Paragraph, TableSpec, write_chart_frame, write_placeholder, write_placeholder_picture,
    write_table,
};

/// Relationship id of the slide-to-layout relationship.
pub(crate) const LAYOUT_RID: &str = "rId1";

/// Relationship id of the chart-to-workbook relationship.
pub(crate) const WORKBOOK_RID: &str = "rId1";

#[derive(Debug, Clone)]
enum PlaceholderContent {
    Text(Vec<Paragraph>),
    Picture {
        r_id: String,
        rect: Rect,
        description: String,
    },
}

#[derive(Debug, Clone)]
enum GraphicFrame {
    Table { table: TableSpec, x: Emu, y: Emu },
    Chart { r_id: String, rect: Rect },
}

/// A part the slide links to, created when the draft is committed.
#[derive(Debug, Clone)]
pub(crate) enum Attachment {
    Image {
        r_id: String,
        image: EmbeddedImage,
    },
    Chart {
        r_id: String,
        chart_xml: String,
        workbook: Vec<u8>,
    },
}

/// Draft of a new slide based on one layout.
#[derive(Debug, Clone)]
pub struct SlideBuilder {
    layout: SlideLayout,
    content: Vec<Option<PlaceholderContent>>,
    frames: Vec<GraphicFrame>,
    attachments: Vec<Attachment>,
}

impl SlideBuilder {
    pub fn new(layout: SlideLayout) -> Self {
        let content = vec![None; layout.placeholders().len()];
        Self {
            layout,
            content,
            frames: Vec::new(),
            attachments: Vec::new(),
        }
    }

    #[inline]
    pub fn layout(&self) -> &SlideLayout {
        &self.layout
    }

    fn next_r_id(&self) -> String {
        format!("rId{}", self.attachments.len() + 2)
    }

    /// Index of the still-empty placeholder for `slot`.
    fn vacant(&self, slot: PlaceholderSlot) -> Result<usize> {
        let position = self.layout.position_of(slot).ok_or_else(|| {
            OoxmlError::InvalidFormat(format!(
                "layout '{}' has no placeholder for {:?}",
                self.layout.name(),
                slot
            ))
        })?;
        if self.content[position].is_some() {
            return Err(OoxmlError::InvalidFormat(format!(
                "placeholder {:?} already has content",
                slot
            )));
        }
        Ok(position)
    }

    /// Put `paragraphs` into the placeholder for `slot`.
    pub fn set_text(&mut self, slot: PlaceholderSlot, paragraphs: Vec<Paragraph>) -> Result<()> {
        let position = self.vacant(slot)?;
        self.content[position] = Some(PlaceholderContent::Text(paragraphs));
        Ok(())
    }

    /// Fill the picture placeholder for `slot` with `image` drawn at `rect`.
    pub fn set_picture(
        &mut self,
        slot: PlaceholderSlot,
        image: EmbeddedImage,
        rect: Rect,
        description: impl Into<String>,
    ) -> Result<()> {
        let position = self.vacant(slot)?;
        let r_id = self.next_r_id();
        self.content[position] = Some(PlaceholderContent::Picture {
            r_id: r_id.clone(),
            rect,
            description: description.into(),
        });
        self.attachments.push(Attachment::Image { r_id, image });
        Ok(())
    }

    /// Add a table whose top-left corner sits at (`x`, `y`).
    pub fn add_table(&mut self, table: TableSpec, x: Emu, y: Emu) {
        self.frames.push(GraphicFrame::Table { table, x, y });
    }

    /// Add a chart frame at `rect`, with its chart part and embedded workbook.
    pub fn add_chart(&mut self, chart: &ChartDefinition, rect: Rect) -> Result<()> {
        let mut chart_xml = String::with_capacity(4096);
        write_chart(&mut chart_xml, chart, Some(WORKBOOK_RID))?;
        let workbook = generate_chart_workbook(chart)?;

        let r_id = self.next_r_id();
        self.frames.push(GraphicFrame::Chart {
            r_id: r_id.clone(),
            rect,
        });
        self.attachments.push(Attachment::Chart {
            r_id,
            chart_xml,
            workbook,
        });
        Ok(())
    }

    /// Render the slide part XML.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            namespace::DML_MAIN,
            namespace::OFC_RELATIONSHIPS,
            namespace::PML_MAIN
        ));
        xml.push_str("<p:cSld><p:spTree>");

        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str("<p:grpSpPr><a:xfrm>");
        xml.push_str(r#"<a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#);
        xml.push_str(r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/>"#);
        xml.push_str("</a:xfrm></p:grpSpPr>");

        let mut shape_id = 2u32;
        for (placeholder, content) in self.layout.placeholders().iter().zip(&self.content) {
            if placeholder.is_footer() {
                continue;
            }
            match content {
                Some(PlaceholderContent::Text(paragraphs)) => {
                    write_placeholder(&mut xml, shape_id, placeholder, paragraphs)?;
                },
                Some(PlaceholderContent::Picture {
                    r_id,
                    rect,
                    description,
                }) => {
                    write_placeholder_picture(&mut xml, shape_id, placeholder, r_id, rect, description)?;
                },
                None => write_placeholder(&mut xml, shape_id, placeholder, &[])?,
            }
            shape_id += 1;
        }

        for frame in &self.frames {
            match frame {
                GraphicFrame::Table { table, x, y } => write_table(&mut xml, shape_id, table, *x, *y)?,
                GraphicFrame::Chart { r_id, rect } => write_chart_frame(&mut xml, shape_id, r_id, rect)?,
            }
            shape_id += 1;
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");

        Ok(xml)
    }

    pub(crate) fn into_attachments(self) -> Vec<Attachment> {
        self.attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::charts::{ChartKind, ChartSeries, SeriesValues};
    use crate::ooxml::opc::PackURI;
    use crate::ooxml::pptx::layout::parse_placeholders;
    use crate::ooxml::pptx::template;

    fn builder(index: usize) -> SlideBuilder {
        let master = parse_placeholders(template::default_slide_master_xml().as_bytes())
            .unwrap()
            .1;
        let partname = PackURI::new(format!("/ppt/slideLayouts/slideLayout{}.xml", index + 1)).unwrap();
        let xml = template::slide_layout_xml(index).unwrap();
        SlideBuilder::new(SlideLayout::parse(partname, xml.as_bytes(), &master).unwrap())
    }

    #[test]
    fn test_placeholders_cloned_without_footers() {
        let mut slide = builder(0);
        slide
            .set_text(PlaceholderSlot::Title, vec![Paragraph::new("Hello", 0)])
            .unwrap();
        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"<p:ph type="ctrTitle"/>"#));
        assert!(xml.contains(r#"<p:ph type="subTitle" idx="1"/>"#));
        assert!(xml.contains("<a:t>Hello</a:t>"));
        assert!(!xml.contains(r#"type="dt""#));
        assert!(!xml.contains(r#"type="sldNum""#));
        assert!(xml.ends_with("</p:sld>"));
    }

    #[test]
    fn test_region_written_once() {
        let mut slide = builder(1);
        slide.set_text(PlaceholderSlot::Index(1), vec![]).unwrap();
        assert!(slide.set_text(PlaceholderSlot::Index(1), vec![]).is_err());
        assert!(slide.set_text(PlaceholderSlot::Index(7), vec![]).is_err());
    }

    #[test]
    fn test_shape_ids_follow_placeholders() {
        let mut slide = builder(5);
        slide.add_table(
            TableSpec {
                header: vec!["A".into()],
                rows: vec![],
                column_width: 100,
                row_height: 10,
                header_font_size: 11,
                body_font_size: 10,
            },
            0,
            0,
        );
        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"<p:cNvPr id="2" name="Title 1"/>"#));
        assert!(xml.contains(r#"<p:cNvPr id="3" name="Table 2"/>"#));
    }

    #[test]
    fn test_chart_attachment_rids() {
        let mut slide = builder(5);
        let chart = ChartDefinition::new(ChartKind::ColumnClustered)
            .with_categories(vec!["A".into(), "B".into()])
            .add_series(ChartSeries::new("S", SeriesValues::Category(vec![1.0, 2.0])));
        slide.add_chart(&chart, Rect::new(0, 0, 10, 10)).unwrap();
        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"r:id="rId2""#));

        let attachments = slide.into_attachments();
        assert_eq!(attachments.len(), 1);
        match &attachments[0] {
            Attachment::Chart { r_id, chart_xml, workbook } => {
                assert_eq!(r_id, "rId2");
                assert!(chart_xml.contains(r#"<c:externalData r:id="rId1">"#));
                assert!(!workbook.is_empty());
            },
            other => panic!("unexpected attachment {other:?}"),
        }
    }
}
