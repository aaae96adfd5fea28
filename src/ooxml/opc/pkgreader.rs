//! Reading a serialized OPC package into an [`OpcPackage`].
//!
//! Content types come from `[Content_Types].xml`; parts are discovered by
//! walking the relationship graph outward from `/_rels/.rels`, so members
//! no relationship reaches are left behind.

use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::rel::Relationships;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Relationship as read from a `.rels` item, before it is attached to a part.
#[derive(Debug, Clone)]
struct SerializedRelationship {
    r_id: String,
    reltype: String,
    target_ref: String,
    target_mode: String,
}

impl SerializedRelationship {
    #[inline]
    fn is_external(&self) -> bool {
        self.target_mode == target_mode::EXTERNAL
    }
}

/// Default (by extension) and Override (by partname) content type lookup.
struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self {
            defaults: HashMap::new(),
            overrides: HashMap::new(),
        };
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let (key_attr, is_default): (&[u8], bool) = match e.local_name().as_ref() {
                        b"Default" => (b"Extension", true),
                        b"Override" => (b"PartName", false),
                        _ => {
                            buf.clear();
                            continue;
                        },
                    };

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == key_attr {
                            key = Some(attr.unescape_value()?.to_lowercase());
                        } else if attr.key.as_ref() == b"ContentType" {
                            content_type = Some(attr.unescape_value()?.to_string());
                        }
                    }

                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if is_default {
                            map.defaults.insert(key, ct);
                        } else {
                            map.overrides.insert(key, ct);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::Xml(format!("Content types parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Override for the partname first, then the default for its extension.
    fn get(&self, pack_uri: &PackURI) -> Result<&str> {
        self.overrides
            .get(&pack_uri.as_str().to_lowercase())
            .or_else(|| self.defaults.get(&pack_uri.ext().to_lowercase()))
            .map(String::as_str)
            .ok_or_else(|| OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Parse a `.rels` item.
fn parse_rels_xml(rels_xml: &[u8]) -> Result<SmallVec<[SerializedRelationship; 8]>> {
    let mut srels = SmallVec::new();
    let mut reader = Reader::from_reader(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut r_id = None;
                let mut reltype = None;
                let mut target_ref = None;
                let mut mode = target_mode::INTERNAL.to_string();

                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                        b"Type" => reltype = Some(attr.unescape_value()?.to_string()),
                        b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                        b"TargetMode" => mode = attr.unescape_value()?.to_string(),
                        _ => {},
                    }
                }

                if let (Some(r_id), Some(reltype), Some(target_ref)) = (r_id, reltype, target_ref) {
                    srels.push(SerializedRelationship {
                        r_id,
                        reltype,
                        target_ref,
                        target_mode: mode,
                    });
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::Xml(format!("Rels parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(srels)
}

/// Load the relationships owned by `source` from the archive.
fn load_rels(
    phys: &PhysPkgReader,
    source: &PackURI,
) -> Result<SmallVec<[SerializedRelationship; 8]>> {
    let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
    match phys.blob_for(&rels_uri) {
        Some(xml) => parse_rels_xml(xml),
        None => Ok(SmallVec::new()),
    }
}

fn to_relationships(base_uri: &str, srels: &[SerializedRelationship]) -> Relationships {
    let mut rels = Relationships::new(base_uri.to_string());
    for srel in srels {
        rels.add_relationship(
            srel.reltype.clone(),
            srel.target_ref.clone(),
            srel.r_id.clone(),
            srel.is_external(),
        );
    }
    rels
}

pub struct PackageReader;

impl PackageReader {
    /// Parse a zip-serialized package.
    pub fn read(data: &[u8]) -> Result<OpcPackage> {
        let mut phys = PhysPkgReader::from_bytes(data)?;

        let content_types_uri =
            PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        let content_types = ContentTypeMap::from_xml(
            phys.blob_for(&content_types_uri)
                .ok_or_else(|| OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()))?,
        )?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_srels = load_rels(&phys, &package_uri)?;
        let mut package = OpcPackage::with_rels(to_relationships(PACKAGE_URI, &pkg_srels));

        let mut visited: HashSet<PackURI> = HashSet::new();
        let mut queue: Vec<PackURI> = Vec::new();
        enqueue_targets(PACKAGE_URI, &pkg_srels, &mut visited, &mut queue);

        while let Some(partname) = queue.pop() {
            // Dangling targets are tolerated; the relationship is kept as-is.
            if phys.blob_for(&partname).is_none() {
                continue;
            }
            let srels = load_rels(&phys, &partname)?;
            enqueue_targets(partname.base_uri(), &srels, &mut visited, &mut queue);

            let content_type = content_types.get(&partname)?.to_string();
            let blob = phys.take_blob(&partname).unwrap_or_default();
            let rels = to_relationships(partname.base_uri(), &srels);

            let mut part = Part::new(partname, content_type, blob);
            *part.rels_mut() = rels;
            package.add_part(part);
        }

        Ok(package)
    }
}

fn enqueue_targets(
    base_uri: &str,
    srels: &[SerializedRelationship],
    visited: &mut HashSet<PackURI>,
    queue: &mut Vec<PackURI>,
) {
    for srel in srels.iter().filter(|srel| !srel.is_external()) {
        if let Ok(target) = PackURI::from_rel_ref(base_uri, &srel.target_ref) {
            if visited.insert(target.clone()) {
                queue.push(target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_map() {
        let xml = br#"<?xml version="1.0"?>
            <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="xml" ContentType="application/xml"/>
                <Default Extension="PNG" ContentType="image/png"/>
                <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
            </Types>"#;

        let map = ContentTypeMap::from_xml(xml).unwrap();

        assert_eq!(map.get(&PackURI::new("/a.xml").unwrap()).unwrap(), "application/xml");
        assert_eq!(map.get(&PackURI::new("/ppt/media/image1.png").unwrap()).unwrap(), "image/png");
        assert_eq!(
            map.get(&PackURI::new("/ppt/presentation.xml").unwrap()).unwrap(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"
        );
        assert!(map.get(&PackURI::new("/ppt/embeddings/x.bin").unwrap()).is_err());
    }

    #[test]
    fn test_parse_rels_xml() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="t/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
            <Relationship Id="rId2" Type="t/hyperlink" Target="https://example.com" TargetMode="External"/>
        </Relationships>"#;

        let srels = parse_rels_xml(xml).unwrap();
        assert_eq!(srels.len(), 2);
        assert_eq!(srels[0].r_id, "rId1");
        assert!(!srels[0].is_external());
        assert!(srels[1].is_external());
    }
}
