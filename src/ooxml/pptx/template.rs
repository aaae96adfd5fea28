//! Presentation template module.
//!
//! The default deck: a 4:3 presentation with one slide master, the nine
//! standard layouts, a theme and the property parts PowerPoint expects.
//! New decks start from [`default_package`].

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::{OpcPackage, PackURI, Part};

/// Number of layouts under the default slide master.
pub const LAYOUT_COUNT: usize = 9;

/// Creates an empty presentation with no slides but complete text styling.
pub fn default_presentation_xml() -> &'static str {
    include_str!("../../../resources/pptx/presentation.xml")
}

/// Slide master with title, body, date, footer and slide number placeholders.
pub fn default_slide_master_xml() -> &'static str {
    include_str!("../../../resources/pptx/slideMaster1.xml")
}

/// Layout XML in slide-master order, zero-based.
///
/// 0 Title Slide, 1 Title and Content, 2 Section Header, 3 Two Content,
/// 4 Comparison, 5 Title Only, 6 Blank, 7 Content with Caption,
/// 8 Picture with Caption.
pub fn slide_layout_xml(index: usize) -> Option<&'static str> {
    let xml = match index {
        0 => include_str!("../../../resources/pptx/slideLayout1.xml"),
        1 => include_str!("../../../resources/pptx/slideLayout2.xml"),
        2 => include_str!("../../../resources/pptx/slideLayout3.xml"),
        3 => include_str!("../../../resources/pptx/slideLayout4.xml"),
        4 => include_str!("../../../resources/pptx/slideLayout5.xml"),
        5 => include_str!("../../../resources/pptx/slideLayout6.xml"),
        6 => include_str!("../../../resources/pptx/slideLayout7.xml"),
        7 => include_str!("../../../resources/pptx/slideLayout8.xml"),
        8 => include_str!("../../../resources/pptx/slideLayout9.xml"),
        _ => return None,
    };
    Some(xml)
}

pub fn default_theme_xml() -> &'static str {
    include_str!("../../../resources/pptx/theme1.xml")
}

pub fn default_pres_props_xml() -> &'static str {
    include_str!("../../../resources/pptx/presProps.xml")
}

pub fn default_view_props_xml() -> &'static str {
    include_str!("../../../resources/pptx/viewProps.xml")
}

/// Table style list whose default is Medium Style 2 - Accent 1.
pub fn default_table_styles_xml() -> &'static str {
    include_str!("../../../resources/pptx/tableStyles.xml")
}

pub fn default_core_props_xml() -> &'static str {
    include_str!("../../../resources/pptx/core.xml")
}

pub fn default_app_props_xml() -> &'static str {
    include_str!("../../../resources/pptx/app.xml")
}

fn uri(s: &str) -> Result<PackURI> {
    Ok(PackURI::new(s).map_err(OpcError::InvalidPackUri)?)
}

fn xml_part(partname: &PackURI, content_type: &str, xml: &str) -> Part {
    Part::new(partname.clone(), content_type, xml.as_bytes().to_vec())
}

/// Build the default presentation package.
pub fn default_package() -> Result<OpcPackage> {
    let presentation = uri("/ppt/presentation.xml")?;
    let master = uri("/ppt/slideMasters/slideMaster1.xml")?;
    let theme = uri("/ppt/theme/theme1.xml")?;
    let pres_props = uri("/ppt/presProps.xml")?;
    let view_props = uri("/ppt/viewProps.xml")?;
    let table_styles = uri("/ppt/tableStyles.xml")?;
    let core = uri("/docProps/core.xml")?;
    let app = uri("/docProps/app.xml")?;

    let mut pkg = OpcPackage::new();

    // Master rIds 1..=9 are the layouts in sldLayoutIdLst order; the theme follows.
    let mut master_part = xml_part(&master, ct::PML_SLIDE_MASTER, default_slide_master_xml());
    for index in 0..LAYOUT_COUNT {
        let layout = uri(&format!("/ppt/slideLayouts/slideLayout{}.xml", index + 1))?;
        master_part.relate_to(&layout, rt::SLIDE_LAYOUT);

        let xml = slide_layout_xml(index).unwrap_or_default();
        let mut layout_part = xml_part(&layout, ct::PML_SLIDE_LAYOUT, xml);
        layout_part.relate_to(&master, rt::SLIDE_MASTER);
        pkg.add_part(layout_part);
    }
    master_part.relate_to(&theme, rt::THEME);
    pkg.add_part(master_part);

    let mut pres_part = xml_part(&presentation, ct::PML_PRESENTATION_MAIN, default_presentation_xml());
    pres_part.relate_to(&master, rt::SLIDE_MASTER);
    pres_part.relate_to(&pres_props, rt::PRES_PROPS);
    pres_part.relate_to(&view_props, rt::VIEW_PROPS);
    pres_part.relate_to(&theme, rt::THEME);
    pres_part.relate_to(&table_styles, rt::TABLE_STYLES);
    pkg.add_part(pres_part);

    pkg.add_part(xml_part(&theme, ct::OFC_THEME, default_theme_xml()));
    pkg.add_part(xml_part(&pres_props, ct::PML_PRES_PROPS, default_pres_props_xml()));
    pkg.add_part(xml_part(&view_props, ct::PML_VIEW_PROPS, default_view_props_xml()));
    pkg.add_part(xml_part(&table_styles, ct::PML_TABLE_STYLES, default_table_styles_xml()));
    pkg.add_part(xml_part(&core, ct::OPC_CORE_PROPERTIES, default_core_props_xml()));
    pkg.add_part(xml_part(&app, ct::OFC_EXTENDED_PROPERTIES, default_app_props_xml()));

    pkg.relate_to(&presentation, rt::OFFICE_DOCUMENT);
    pkg.relate_to(&core, rt::CORE_PROPERTIES);
    pkg.relate_to(&app, rt::EXTENDED_PROPERTIES);

    Ok(pkg)
}
