//! Slide layouts, their placeholders, and the named regions slide templates
//! write into.

use crate::common::Rect;
use crate::common::xml::attr_value;
use crate::ooxml::error::Result;
use crate::ooxml::opc::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt;

/// A placeholder shape declared by a slide layout or slide master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlaceholder {
    /// `type` attribute of `p:ph`; `obj` when absent.
    pub ph_type: String,
    /// `idx` attribute of `p:ph`; 0 when absent.
    pub idx: u32,
    /// `sz` attribute of `p:ph`, if any.
    pub size: Option<String>,
    /// Shape name from `p:cNvPr`.
    pub name: String,
    /// Explicit geometry, or the geometry inherited from the master.
    pub bbox: Option<Rect>,
}

impl LayoutPlaceholder {
    pub fn is_title(&self) -> bool {
        matches!(self.ph_type.as_str(), "title" | "ctrTitle")
    }

    /// Date, footer and slide-number placeholders, which new slides do not
    /// carry over from their layout.
    pub fn is_footer(&self) -> bool {
        matches!(self.ph_type.as_str(), "dt" | "ftr" | "sldNum")
    }

    pub fn is_picture(&self) -> bool {
        self.ph_type == "pic"
    }

    /// Whether a slide-master placeholder supplies inherited properties
    /// for this one.
    fn inherits_from(&self, master: &LayoutPlaceholder) -> bool {
        match self.ph_type.as_str() {
            "title" | "ctrTitle" => master.ph_type == "title",
            "dt" | "ftr" | "sldNum" => master.ph_type == self.ph_type,
            _ => master.ph_type == "body",
        }
    }

    fn matches(&self, slot: PlaceholderSlot) -> bool {
        match slot {
            PlaceholderSlot::Title => self.is_title(),
            PlaceholderSlot::Index(idx) => !self.is_title() && self.idx == idx,
        }
    }
}

/// A slide layout: its partname, display name and placeholders in
/// document order.
#[derive(Debug, Clone)]
pub struct SlideLayout {
    partname: PackURI,
    name: String,
    placeholders: Vec<LayoutPlaceholder>,
}

impl SlideLayout {
    /// Parse a layout part, filling missing placeholder geometry from the
    /// slide master's placeholders.
    pub fn parse(partname: PackURI, xml: &[u8], master: &[LayoutPlaceholder]) -> Result<Self> {
        let (name, mut placeholders) = parse_placeholders(xml)?;
        for placeholder in placeholders.iter_mut().filter(|p| p.bbox.is_none()) {
            placeholder.bbox = master
                .iter()
                .find(|m| placeholder.inherits_from(m))
                .and_then(|m| m.bbox);
        }
        Ok(Self {
            partname,
            name: name.unwrap_or_default(),
            placeholders,
        })
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn placeholders(&self) -> &[LayoutPlaceholder] {
        &self.placeholders
    }

    /// Position of the placeholder filling `slot`, if the layout has one.
    pub fn position_of(&self, slot: PlaceholderSlot) -> Option<usize> {
        self.placeholders.iter().position(|p| p.matches(slot))
    }

    pub fn placeholder(&self, slot: PlaceholderSlot) -> Option<&LayoutPlaceholder> {
        self.position_of(slot).map(|i| &self.placeholders[i])
    }
}

#[derive(Default)]
struct PendingPlaceholder {
    name: String,
    ph: Option<(String, u32, Option<String>)>,
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
}

impl PendingPlaceholder {
    fn finish(self) -> Option<LayoutPlaceholder> {
        let (ph_type, idx, size) = self.ph?;
        let bbox = match (self.off, self.ext) {
            (Some((x, y)), Some((cx, cy))) => Some(Rect::new(x, y, cx, cy)),
            _ => None,
        };
        Some(LayoutPlaceholder {
            ph_type,
            idx,
            size,
            name: self.name,
            bbox,
        })
    }
}

fn int_attr(e: &quick_xml::events::BytesStart<'_>, name: &[u8]) -> Option<i64> {
    attr_value(e, name).and_then(|v| v.trim().parse().ok())
}

/// Parse the `p:cSld` name and every placeholder `p:sp` of a slide layout or
/// slide master.
pub(crate) fn parse_placeholders(xml: &[u8]) -> Result<(Option<String>, Vec<LayoutPlaceholder>)> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut name = None;
    let mut placeholders = Vec::new();
    let mut current: Option<PendingPlaceholder> = None;
    let mut in_sp_pr = false;

    loop {
        let (e, empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"spPr" => in_sp_pr = false,
                    b"sp" => {
                        if let Some(placeholder) = current.take().and_then(PendingPlaceholder::finish) {
                            placeholders.push(placeholder);
                        }
                        in_sp_pr = false;
                    },
                    _ => {},
                }
                continue;
            },
            Event::Eof => break,
            _ => continue,
        };

        match (e.local_name().as_ref(), current.as_mut()) {
            (b"cSld", None) => name = attr_value(&e, b"name"),
            (b"sp", None) if !empty => current = Some(PendingPlaceholder::default()),
            (b"cNvPr", Some(pending)) => {
                pending.name = attr_value(&e, b"name").unwrap_or_default();
            },
            (b"ph", Some(pending)) => {
                let ph_type = attr_value(&e, b"type").unwrap_or_else(|| "obj".to_string());
                let idx = attr_value(&e, b"idx").and_then(|v| v.parse().ok()).unwrap_or(0);
                pending.ph = Some((ph_type, idx, attr_value(&e, b"sz")));
            },
            (b"spPr", Some(_)) if !empty => in_sp_pr = true,
            (b"off", Some(pending)) if in_sp_pr => {
                if let Some(off) = int_attr(&e, b"x").zip(int_attr(&e, b"y")) {
                    pending.off = Some(off);
                }
            },
            (b"ext", Some(pending)) if in_sp_pr => {
                if let Some(ext) = int_attr(&e, b"cx").zip(int_attr(&e, b"cy")) {
                    pending.ext = Some(ext);
                }
            },
            _ => {},
        }
    }

    Ok((name, placeholders))
}

/// Which placeholder of a layout a region maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSlot {
    /// The `title` or `ctrTitle` placeholder.
    Title,
    /// The non-title placeholder with this `idx`.
    Index(u32),
}

/// A named content area on a slide template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Title,
    Subtitle,
    Body,
    LeftHeading,
    LeftBody,
    RightHeading,
    RightBody,
    Picture,
    Caption,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Body => "body",
            Self::LeftHeading => "left heading",
            Self::LeftBody => "left body",
            Self::RightHeading => "right heading",
            Self::RightBody => "right body",
            Self::Picture => "picture",
            Self::Caption => "caption",
        })
    }
}

/// The slide kinds decks are built from, each bound to a layout of the
/// default master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideTemplate {
    TitleOnly,
    SectionHeader,
    TitleAndContent,
    Comparison,
    Table,
    Picture,
    Chart,
}

impl SlideTemplate {
    /// Zero-based layout index under the first slide master.
    pub const fn layout_index(&self) -> usize {
        match self {
            Self::TitleOnly => 0,
            Self::TitleAndContent => 1,
            Self::SectionHeader => 2,
            Self::Comparison => 4,
            Self::Table | Self::Chart => 5,
            Self::Picture => 8,
        }
    }

    /// Regions this template exposes and the placeholders backing them.
    pub const fn regions(&self) -> &'static [(Region, PlaceholderSlot)] {
        use PlaceholderSlot::{Index, Title};
        match self {
            Self::TitleOnly | Self::Table | Self::Chart => &[(Region::Title, Title)],
            Self::SectionHeader => &[(Region::Title, Title), (Region::Subtitle, Index(1))],
            Self::TitleAndContent => &[(Region::Title, Title), (Region::Body, Index(1))],
            Self::Comparison => &[
                (Region::Title, Title),
                (Region::LeftHeading, Index(1)),
                (Region::LeftBody, Index(2)),
                (Region::RightHeading, Index(3)),
                (Region::RightBody, Index(4)),
            ],
            Self::Picture => &[
                (Region::Title, Title),
                (Region::Picture, Index(1)),
                (Region::Caption, Index(2)),
            ],
        }
    }

    pub fn slot_for(&self, region: Region) -> Option<PlaceholderSlot> {
        self.regions()
            .iter()
            .find(|(r, _)| *r == region)
            .map(|(_, slot)| *slot)
    }
}
