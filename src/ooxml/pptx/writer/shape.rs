//! Shape XML for slides: placeholders, tables, pictures and chart frames.

use crate::common::unit::font_size_centipoints;
use crate::common::{Emu, Rect, escape_xml};
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::pptx::layout::LayoutPlaceholder;
use std::fmt::Write as FmtWrite;

/// Deepest outline level PowerPoint supports (`lvl` 0..=8).
pub const MAX_LEVEL: u8 = 8;

/// Style id of "Medium Style 2 - Accent 1", the default table style.
pub const DEFAULT_TABLE_STYLE: &str = "{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}";

/// One paragraph of placeholder text with its outline level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub level: u8,
}

impl Paragraph {
    /// A paragraph at `level`, clamped to [`MAX_LEVEL`].
    pub fn new(text: impl Into<String>, level: usize) -> Self {
        Self {
            text: text.into(),
            level: level.min(MAX_LEVEL as usize) as u8,
        }
    }

    /// One top-level paragraph per line of `text`, blank lines included.
    pub fn lines_of(text: &str) -> Vec<Self> {
        text.replace("\r\n", "\n")
            .replace('\r', "\n")
            .split('\n')
            .map(|line| Self::new(line, 0))
            .collect()
    }
}

/// A table with a header row, ready to be written as a graphic frame.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub column_width: Emu,
    pub row_height: Emu,
    /// Header font size in points; header cells are bold.
    pub header_font_size: u32,
    /// Data font size in points.
    pub body_font_size: u32,
}

impl TableSpec {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Header row plus data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }
}

/// Shape name for a placeholder cloned onto a slide: the layout shape's
/// name without its trailing number, followed by `shape_id - 1`.
fn placeholder_shape_name(placeholder: &LayoutPlaceholder, shape_id: u32) -> String {
    let base = match placeholder.name.rsplit_once(' ') {
        Some((base, n)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => base,
        _ => placeholder.name.as_str(),
    };
    let base = if base.is_empty() { "Placeholder" } else { base };
    format!("{} {}", base, shape_id.saturating_sub(1))
}

fn write_ph(xml: &mut String, placeholder: &LayoutPlaceholder) -> Result<()> {
    xml.push_str("<p:ph");
    if placeholder.ph_type != "obj" {
        write!(xml, r#" type="{}""#, escape_xml(&placeholder.ph_type))?;
    }
    if let Some(ref size) = placeholder.size {
        write!(xml, r#" sz="{}""#, escape_xml(size))?;
    }
    if placeholder.idx != 0 {
        write!(xml, r#" idx="{}""#, placeholder.idx)?;
    }
    xml.push_str("/>");
    Ok(())
}

fn write_xfrm(xml: &mut String, rect: &Rect) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )?;
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph, run_props: &str) -> Result<()> {
    xml.push_str("<a:p>");
    if paragraph.level > 0 {
        write!(xml, r#"<a:pPr lvl="{}"/>"#, paragraph.level)?;
    }
    if paragraph.text.is_empty() {
        write!(xml, r#"<a:endParaRPr lang="en-US"{}/>"#, run_props)?;
    } else {
        write!(
            xml,
            r#"<a:r><a:rPr lang="en-US"{} dirty="0"/><a:t>{}</a:t></a:r>"#,
            run_props,
            escape_xml(&paragraph.text)
        )?;
    }
    xml.push_str("</a:p>");
    Ok(())
}

/// Write a placeholder `p:sp` cloned from `placeholder`, holding
/// `paragraphs`. Picture placeholders without content carry no text body.
pub(crate) fn write_placeholder(
    xml: &mut String,
    shape_id: u32,
    placeholder: &LayoutPlaceholder,
    paragraphs: &[Paragraph],
) -> Result<()> {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}"/>"#,
        shape_id,
        escape_xml(&placeholder_shape_name(placeholder, shape_id))
    )?;
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>"#);
    write_ph(xml, placeholder)?;
    xml.push_str("</p:nvPr></p:nvSpPr><p:spPr/>");

    if !(placeholder.is_picture() && paragraphs.is_empty()) {
        xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
        if paragraphs.is_empty() {
            xml.push_str("<a:p/>");
        }
        for paragraph in paragraphs {
            write_paragraph(xml, paragraph, "")?;
        }
        xml.push_str("</p:txBody>");
    }

    xml.push_str("</p:sp>");
    Ok(())
}

/// Write a `p:pic` filling a picture placeholder at an explicit position.
pub(crate) fn write_placeholder_picture(
    xml: &mut String,
    shape_id: u32,
    placeholder: &LayoutPlaceholder,
    r_id: &str,
    rect: &Rect,
    description: &str,
) -> Result<()> {
    xml.push_str("<p:pic><p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}" descr="{}"/>"#,
        shape_id,
        escape_xml(&placeholder_shape_name(placeholder, shape_id)),
        escape_xml(description)
    )?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noGrp="1" noChangeAspect="1"/></p:cNvPicPr><p:nvPr>"#);
    write_ph(xml, placeholder)?;
    xml.push_str("</p:nvPr></p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(r_id))?;
    xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");

    xml.push_str("<p:spPr>");
    write_xfrm(xml, rect)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
    xml.push_str("</p:pic>");
    Ok(())
}

fn write_frame_start(xml: &mut String, shape_id: u32, kind: &str, rect: &Rect) -> Result<()> {
    xml.push_str("<p:graphicFrame><p:nvGraphicFramePr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{} {}"/>"#, shape_id, kind, shape_id.saturating_sub(1))?;
    xml.push_str(r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/>"#);
    xml.push_str("</p:nvGraphicFramePr>");
    write!(
        xml,
        r#"<p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )?;
    Ok(())
}

fn write_cell(xml: &mut String, text: &str, font_size: u32, bold: bool) -> Result<()> {
    let mut run_props = String::new();
    write!(run_props, r#" sz="{}""#, font_size_centipoints(font_size))?;
    if bold {
        run_props.push_str(r#" b="1""#);
    }
    xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>");
    write_paragraph(xml, &Paragraph::new(text, 0), &run_props)?;
    xml.push_str("</a:txBody><a:tcPr/></a:tc>");
    Ok(())
}

/// Write a table graphic frame with its top-left corner at (`x`, `y`).
pub(crate) fn write_table(xml: &mut String, shape_id: u32, table: &TableSpec, x: Emu, y: Emu) -> Result<()> {
    let rect = Rect::new(
        x,
        y,
        table.column_width * table.column_count() as Emu,
        table.row_height * table.row_count() as Emu,
    );
    write_frame_start(xml, shape_id, "Table", &rect)?;
    write!(xml, r#"<a:graphic><a:graphicData uri="{}"><a:tbl>"#, namespace::DML_TABLE)?;
    write!(
        xml,
        r#"<a:tblPr firstRow="1" bandRow="1"><a:tableStyleId>{}</a:tableStyleId></a:tblPr>"#,
        DEFAULT_TABLE_STYLE
    )?;

    xml.push_str("<a:tblGrid>");
    for _ in 0..table.column_count() {
        write!(xml, r#"<a:gridCol w="{}"/>"#, table.column_width)?;
    }
    xml.push_str("</a:tblGrid>");

    write!(xml, r#"<a:tr h="{}">"#, table.row_height)?;
    for heading in &table.header {
        write_cell(xml, heading, table.header_font_size, true)?;
    }
    xml.push_str("</a:tr>");

    for row in &table.rows {
        write!(xml, r#"<a:tr h="{}">"#, table.row_height)?;
        for cell in row {
            write_cell(xml, cell, table.body_font_size, false)?;
        }
        xml.push_str("</a:tr>");
    }

    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    Ok(())
}

/// Write a chart graphic frame referencing the chart part `r_id`.
pub(crate) fn write_chart_frame(xml: &mut String, shape_id: u32, r_id: &str, rect: &Rect) -> Result<()> {
    write_frame_start(xml, shape_id, "Chart", rect)?;
    write!(xml, r#"<a:graphic><a:graphicData uri="{}">"#, namespace::DML_CHART)?;
    write!(
        xml,
        r#"<c:chart xmlns:c="{}" r:id="{}"/>"#,
        namespace::DML_CHART,
        escape_xml(r_id)
    )?;
    xml.push_str("</a:graphicData></a:graphic></p:graphicFrame>");
    Ok(())
}
