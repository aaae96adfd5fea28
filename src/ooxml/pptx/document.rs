//! Editable presentation document.
//!
//! Wraps an [`OpcPackage`] holding a PresentationML deck. Layouts of the
//! first slide master are parsed once when the document is loaded; slides
//! are appended by committing a [`SlideBuilder`] draft.

use crate::common::xml::attr_value;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, namespace, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Part};
use crate::ooxml::pptx::layout::{SlideLayout, SlideTemplate, parse_placeholders};
use crate::ooxml::pptx::template;
use crate::ooxml::pptx::writer::slide::{Attachment, LAYOUT_RID, SlideBuilder, WORKBOOK_RID};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use std::path::Path;

/// Lowest id PowerPoint assigns to a slide in `p:sldIdLst`.
const MIN_SLIDE_ID: u32 = 256;

/// A slide appended to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    /// Zero-based position in the slide list.
    pub index: usize,
    /// `id` attribute of the slide's `p:sldId`.
    pub slide_id: u32,
    pub partname: PackURI,
}

/// A presentation being built.
#[derive(Debug, Clone)]
pub struct PresentationDocument {
    package: OpcPackage,
    presentation: PackURI,
    layouts: Vec<SlideLayout>,
}

impl PresentationDocument {
    /// A new deck from the default template, with no slides.
    pub fn new() -> Result<Self> {
        Self::from_package(template::default_package()?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_package(OpcPackage::from_bytes(data)?)
    }

    fn from_package(package: OpcPackage) -> Result<Self> {
        let presentation = package.main_document_partname()?;
        let pres_part = package.part(&presentation)?;
        if !pres_part.content_type().contains("presentation") {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_PRESENTATION_MAIN.to_string(),
                got: pres_part.content_type().to_string(),
            });
        }

        let master_rid = collect_rids(pres_part.blob(), b"sldMasterId")?
            .into_iter()
            .next()
            .ok_or_else(|| OoxmlError::InvalidFormat("presentation has no slide master".to_string()))?;
        let master_part = package.part(&pres_part.related_partname(&master_rid)?)?;
        let (_, master_placeholders) = parse_placeholders(master_part.blob())?;

        let mut layouts = Vec::new();
        for r_id in collect_rids(master_part.blob(), b"sldLayoutId")? {
            let partname = master_part.related_partname(&r_id)?;
            let layout_part = package.part(&partname)?;
            layouts.push(SlideLayout::parse(partname, layout_part.blob(), &master_placeholders)?);
        }

        Ok(Self {
            package,
            presentation,
            layouts,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.package.to_bytes()?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    #[inline]
    pub fn package(&self) -> &OpcPackage {
        &self.package
    }

    /// Layouts of the first slide master, in master order.
    #[inline]
    pub fn layouts(&self) -> &[SlideLayout] {
        &self.layouts
    }

    pub fn layout(&self, index: usize) -> Result<&SlideLayout> {
        self.layouts.get(index).ok_or_else(|| {
            OoxmlError::InvalidFormat(format!(
                "layout index {} out of range ({} layouts)",
                index,
                self.layouts.len()
            ))
        })
    }

    /// Ids of the slides in `p:sldIdLst`, in presentation order.
    pub fn slide_ids(&self) -> Result<Vec<u32>> {
        let pres_part = self.package.part(&self.presentation)?;
        let mut reader = pres_part.reader();
        let mut ids = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(ref e) | Event::Empty(ref e) if is_pml(&reader, e.name(), b"sldId") => {
                    if let Some(id) = attr_value(e, b"id").and_then(|v| v.parse().ok()) {
                        ids.push(id);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }
        Ok(ids)
    }

    pub fn slide_count(&self) -> Result<usize> {
        Ok(self.slide_ids()?.len())
    }

    /// Start a draft for a slide of `template`.
    pub fn begin_slide(&self, template: SlideTemplate) -> Result<SlideBuilder> {
        Ok(SlideBuilder::new(self.layout(template.layout_index())?.clone()))
    }

    /// Append the drafted slide and every part it links to.
    ///
    /// All new parts and the patched presentation XML are prepared first;
    /// the package is only modified once nothing else can fail.
    pub fn add_slide(&mut self, draft: SlideBuilder) -> Result<SlideRef> {
        let slide_xml = draft.to_xml()?;
        let layout_partname = draft.layout().partname().clone();
        let attachments = draft.into_attachments();

        let pres_part = self.package.part(&self.presentation)?;
        let existing_ids = self.slide_ids()?;
        let slide_id = existing_ids
            .iter()
            .copied()
            .max()
            .map_or(MIN_SLIDE_ID, |max| max.max(MIN_SLIDE_ID - 1) + 1);
        let slide_rid = pres_part.rels().next_r_id();
        let patched = insert_slide_id(pres_part.xml_str()?, slide_id, &slide_rid)?;

        let mut reserved: Vec<PackURI> = Vec::new();
        let slide_partname = self.package.next_partname("/ppt/slides/slide%d.xml", &reserved)?;
        reserved.push(slide_partname.clone());
        let mut slide_part = Part::new(slide_partname.clone(), ct::PML_SLIDE, slide_xml.into_bytes());
        slide_part.rels_mut().add_relationship(
            rt::SLIDE_LAYOUT.to_string(),
            layout_partname.relative_ref(slide_partname.base_uri()),
            LAYOUT_RID.to_string(),
            false,
        );

        let mut new_parts: Vec<Part> = Vec::with_capacity(attachments.len() * 2 + 1);
        for attachment in attachments {
            match attachment {
                Attachment::Image { r_id, image } => {
                    let template = format!("/ppt/media/image%d.{}", image.format.extension());
                    let partname = self.package.next_partname(&template, &reserved)?;
                    reserved.push(partname.clone());
                    slide_part.rels_mut().add_relationship(
                        rt::IMAGE.to_string(),
                        partname.relative_ref(slide_partname.base_uri()),
                        r_id,
                        false,
                    );
                    new_parts.push(Part::new(partname, image.format.mime_type(), image.bytes));
                },
                Attachment::Chart {
                    r_id,
                    chart_xml,
                    workbook,
                } => {
                    let chart_partname = self.package.next_partname("/ppt/charts/chart%d.xml", &reserved)?;
                    reserved.push(chart_partname.clone());
                    let workbook_partname =
                        self.package.next_partname("/ppt/embeddings/Microsoft_Excel_Sheet%d.xlsx", &reserved)?;
                    reserved.push(workbook_partname.clone());

                    let mut chart_part = Part::new(chart_partname.clone(), ct::DML_CHART, chart_xml.into_bytes());
                    chart_part.rels_mut().add_relationship(
                        rt::PACKAGE.to_string(),
                        workbook_partname.relative_ref(chart_partname.base_uri()),
                        WORKBOOK_RID.to_string(),
                        false,
                    );
                    slide_part.rels_mut().add_relationship(
                        rt::CHART.to_string(),
                        chart_partname.relative_ref(slide_partname.base_uri()),
                        r_id,
                        false,
                    );
                    new_parts.push(chart_part);
                    new_parts.push(Part::new(workbook_partname, ct::SML_SHEET, workbook));
                },
            }
        }
        new_parts.push(slide_part);

        let slide_target = slide_partname.relative_ref(self.presentation.base_uri());
        for part in new_parts {
            self.package.add_part(part);
        }
        let pres_part = self.package.part_mut(&self.presentation)?;
        pres_part
            .rels_mut()
            .add_relationship(rt::SLIDE.to_string(), slide_target, slide_rid, false);
        pres_part.set_blob(patched.into_bytes());

        Ok(SlideRef {
            index: existing_ids.len(),
            slide_id,
            partname: slide_partname,
        })
    }
}

/// Whether `name` is the PresentationML element `local_name`, whatever
/// prefix the document binds to the namespace.
fn is_pml(reader: &NsReader<&[u8]>, name: QName<'_>, local_name: &[u8]) -> bool {
    let (ns, local) = reader.resolve_element(name);
    local.as_ref() == local_name
        && matches!(ns, ResolveResult::Bound(Namespace(uri)) if uri == namespace::PML_MAIN.as_bytes())
}

/// The relationship-namespace `id` attribute of `e`.
fn relationship_id(reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        let (ns, local) = reader.resolve_attribute(attr.key);
        let is_rid = local.as_ref() == b"id"
            && matches!(ns, ResolveResult::Bound(Namespace(uri)) if uri == namespace::OFC_RELATIONSHIPS.as_bytes());
        if is_rid {
            attr.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

/// Relationship id of every PresentationML element named `local_name`, in
/// document order.
fn collect_rids(xml: &[u8], local_name: &[u8]) -> Result<Vec<String>> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut rids = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if is_pml(&reader, e.name(), local_name) => {
                if let Some(r_id) = relationship_id(&reader, e) {
                    rids.push(r_id);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }
    Ok(rids)
}

/// The `prefix:` an element was written with, or nothing for the default
/// namespace.
fn qualifier(name: QName<'_>) -> String {
    name.prefix()
        .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
        .unwrap_or_default()
}

/// A new `sldId` element spelled for the scope it is inserted into.
fn slide_id_entry(reader: &NsReader<&[u8]>, qualifier: &str, slide_id: u32, r_id: &str) -> String {
    let (ns, _) = reader.resolve_attribute(QName(b"r:id"));
    let r_in_scope =
        matches!(ns, ResolveResult::Bound(Namespace(uri)) if uri == namespace::OFC_RELATIONSHIPS.as_bytes());
    if r_in_scope {
        format!(r#"<{}sldId id="{}" r:id="{}"/>"#, qualifier, slide_id, r_id)
    } else {
        format!(
            r#"<{}sldId xmlns:r="{}" id="{}" r:id="{}"/>"#,
            qualifier,
            namespace::OFC_RELATIONSHIPS,
            slide_id,
            r_id
        )
    }
}

/// Append a slide id to the slide id list of `xml`, creating the list in
/// front of `sldSz` (or `notesSz`) when the deck has none yet.
fn insert_slide_id(xml: &str, slide_id: u32, r_id: &str) -> Result<String> {
    let mut reader = NsReader::from_str(xml);
    let mut list_entry: Option<String> = None;
    let mut slide_size: Option<(usize, String)> = None;
    let mut notes_size: Option<(usize, String)> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(ref e) if is_pml(&reader, e.name(), b"sldIdLst") => {
                list_entry = Some(slide_id_entry(&reader, &qualifier(e.name()), slide_id, r_id));
            },
            Event::End(ref e) if is_pml(&reader, e.name(), b"sldIdLst") => {
                if let Some(entry) = list_entry.take() {
                    return Ok(splice(xml, offset, offset, &entry));
                }
            },
            Event::Empty(ref e) if is_pml(&reader, e.name(), b"sldIdLst") => {
                let tag_end = reader.buffer_position() as usize;
                let prefix = qualifier(e.name());
                let entry = slide_id_entry(&reader, &prefix, slide_id, r_id);
                let open_tag = xml[offset..tag_end].trim_end_matches('>').trim_end_matches('/');
                let list = format!("{}>{}</{}sldIdLst>", open_tag, entry, prefix);
                return Ok(splice(xml, offset, tag_end, &list));
            },
            Event::Start(ref e) | Event::Empty(ref e)
                if slide_size.is_none() && is_pml(&reader, e.name(), b"sldSz") =>
            {
                let prefix = qualifier(e.name());
                let entry = slide_id_entry(&reader, &prefix, slide_id, r_id);
                slide_size = Some((offset, format!("<{0}sldIdLst>{1}</{0}sldIdLst>", prefix, entry)));
            },
            Event::Start(ref e) | Event::Empty(ref e)
                if notes_size.is_none() && is_pml(&reader, e.name(), b"notesSz") =>
            {
                let prefix = qualifier(e.name());
                let entry = slide_id_entry(&reader, &prefix, slide_id, r_id);
                notes_size = Some((offset, format!("<{0}sldIdLst>{1}</{0}sldIdLst>", prefix, entry)));
            },
            Event::Eof => break,
            _ => {},
        }
    }

    match slide_size.or(notes_size) {
        Some((offset, list)) => Ok(splice(xml, offset, offset, &list)),
        None => Err(OoxmlError::InvalidFormat(
            "presentation.xml has no place for a slide id list".to_string(),
        )),
    }
}

fn splice(xml: &str, start: usize, end: usize, insert: &str) -> String {
    let mut out = String::with_capacity(xml.len() + insert.len());
    out.push_str(&xml[..start]);
    out.push_str(insert);
    out.push_str(&xml[end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Rect;
    use crate::ooxml::charts::{ChartDefinition, ChartKind, ChartSeries, SeriesValues};
    use crate::ooxml::pptx::format::EmbeddedImage;
    use crate::ooxml::pptx::layout::PlaceholderSlot;
    use crate::ooxml::pptx::writer::shape::Paragraph;
    use image::{DynamicImage, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn uri(s: &str) -> PackURI {
        PackURI::new(s).unwrap()
    }

    #[test]
    fn test_new_document_has_layouts_and_no_slides() {
        let doc = PresentationDocument::new().unwrap();
        assert_eq!(doc.layouts().len(), template::LAYOUT_COUNT);
        assert_eq!(doc.layouts()[1].name(), "Title and Content");
        assert_eq!(doc.slide_count().unwrap(), 0);
        assert!(doc.layout(9).is_err());
    }

    #[test]
    fn test_add_slides_assigns_ids() {
        let mut doc = PresentationDocument::new().unwrap();
        let mut draft = doc.begin_slide(SlideTemplate::TitleOnly).unwrap();
        draft.set_text(PlaceholderSlot::Title, vec![Paragraph::new("One", 0)]).unwrap();
        let first = doc.add_slide(draft).unwrap();
        let second = doc.add_slide(doc.begin_slide(SlideTemplate::TitleAndContent).unwrap()).unwrap();

        assert_eq!((first.index, first.slide_id), (0, 256));
        assert_eq!((second.index, second.slide_id), (1, 257));
        assert_eq!(second.partname.as_str(), "/ppt/slides/slide2.xml");
        assert_eq!(doc.slide_ids().unwrap(), vec![256, 257]);

        let slide = doc.package().part(&first.partname).unwrap();
        assert_eq!(
            slide.related_partname("rId1").unwrap().as_str(),
            "/ppt/slideLayouts/slideLayout1.xml"
        );
    }

    #[test]
    fn test_round_trip_preserves_slides() {
        let mut doc = PresentationDocument::new().unwrap();
        doc.add_slide(doc.begin_slide(SlideTemplate::SectionHeader).unwrap()).unwrap();
        let bytes = doc.to_bytes().unwrap();

        let mut reopened = PresentationDocument::from_bytes(&bytes).unwrap();
        assert_eq!(reopened.slide_count().unwrap(), 1);
        assert_eq!(reopened.layouts().len(), template::LAYOUT_COUNT);
        let next = reopened.add_slide(reopened.begin_slide(SlideTemplate::Table).unwrap()).unwrap();
        assert_eq!(next.slide_id, 257);
        assert_eq!(reopened.slide_count().unwrap(), 2);
    }

    #[test]
    fn test_picture_and_chart_parts() {
        let mut doc = PresentationDocument::new().unwrap();
        let mut draft = doc.begin_slide(SlideTemplate::Picture).unwrap();
        let image = EmbeddedImage::probe(png(4, 2)).unwrap();
        draft
            .set_picture(PlaceholderSlot::Index(1), image, Rect::new(0, 0, 4, 2), "pic.png")
            .unwrap();
        let slide = doc.add_slide(draft).unwrap();
        assert!(doc.package().contains_part(&uri("/ppt/media/image1.png")));
        let slide_part = doc.package().part(&slide.partname).unwrap();
        assert_eq!(slide_part.related_partname("rId2").unwrap().as_str(), "/ppt/media/image1.png");

        let mut draft = doc.begin_slide(SlideTemplate::Chart).unwrap();
        let chart = ChartDefinition::new(ChartKind::Line)
            .with_categories(vec!["Jan".into(), "Feb".into()])
            .add_series(ChartSeries::new("Sales", SeriesValues::Category(vec![1.0, 2.0])));
        draft.add_chart(&chart, Rect::new(0, 0, 10, 10)).unwrap();
        let slide = doc.add_slide(draft).unwrap();

        let chart_part = doc.package().part(&uri("/ppt/charts/chart1.xml")).unwrap();
        assert!(chart_part.xml_str().unwrap().contains("<c:lineChart>"));
        assert_eq!(
            chart_part.related_partname("rId1").unwrap().as_str(),
            "/ppt/embeddings/Microsoft_Excel_Sheet1.xlsx"
        );
        let slide_part = doc.package().part(&slide.partname).unwrap();
        assert_eq!(slide_part.related_partname("rId2").unwrap().as_str(), "/ppt/charts/chart1.xml");

        let reread = OpcPackage::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert!(reread.contains_part(&uri("/ppt/embeddings/Microsoft_Excel_Sheet1.xlsx")));
    }

    const ROOT_NS: &str = r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    #[test]
    fn test_insert_slide_id_variants() {
        let existing = format!(
            r#"<p:presentation {ROOT_NS}><p:sldIdLst><p:sldId id="256" r:id="rId7"/></p:sldIdLst><p:sldSz/></p:presentation>"#
        );
        let out = insert_slide_id(&existing, 257, "rId8").unwrap();
        assert!(out.contains(r#"<p:sldId id="256" r:id="rId7"/><p:sldId id="257" r:id="rId8"/></p:sldIdLst>"#));

        let empty = format!("<p:presentation {ROOT_NS}><p:sldIdLst/><p:sldSz/></p:presentation>");
        let out = insert_slide_id(&empty, 256, "rId2").unwrap();
        assert!(out.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz/>"#));

        let missing = format!("<p:presentation {ROOT_NS}><p:sldMasterIdLst/><p:sldSz/></p:presentation>");
        let out = insert_slide_id(&missing, 256, "rId2").unwrap();
        assert!(out.contains(r#"<p:sldMasterIdLst/><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz/>"#));

        let notes_only = format!("<p:presentation {ROOT_NS}><p:notesSz/></p:presentation>");
        let out = insert_slide_id(&notes_only, 256, "rId2").unwrap();
        assert!(out.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:notesSz/>"#));

        assert!(insert_slide_id(&format!("<p:presentation {ROOT_NS}/>"), 256, "rId2").is_err());
    }

    #[test]
    fn test_slide_ids_with_other_prefixes() {
        let pml = "http://schemas.openxmlformats.org/presentationml/2006/main";
        let rel = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

        let prefixed = format!(
            r#"<pml:presentation xmlns:pml="{pml}" xmlns:rel="{rel}"><pml:sldIdLst><pml:sldId id="256" rel:id="rId7"/></pml:sldIdLst><pml:sldSz cx="1" cy="1"/></pml:presentation>"#
        );
        assert_eq!(collect_rids(prefixed.as_bytes(), b"sldId").unwrap(), vec!["rId7"]);
        let out = insert_slide_id(&prefixed, 257, "rId8").unwrap();
        assert!(out.contains(&format!(
            r#"<pml:sldId id="256" rel:id="rId7"/><pml:sldId xmlns:r="{rel}" id="257" r:id="rId8"/></pml:sldIdLst>"#
        )));
        assert_eq!(collect_rids(out.as_bytes(), b"sldId").unwrap(), vec!["rId7", "rId8"]);

        let default_ns = format!(r#"<presentation xmlns="{pml}" xmlns:r="{rel}"><sldSz/></presentation>"#);
        let out = insert_slide_id(&default_ns, 256, "rId2").unwrap();
        assert!(out.contains(r#"<sldIdLst><sldId id="256" r:id="rId2"/></sldIdLst><sldSz/>"#));

        let foreign = r#"<p:presentation xmlns:p="urn:other"><p:sldSz/></p:presentation>"#;
        assert!(insert_slide_id(foreign, 256, "rId2").is_err());
    }
}
