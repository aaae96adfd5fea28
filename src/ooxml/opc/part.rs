//! Parts: the units of content in an OPC package.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use quick_xml::NsReader;

/// A part in an OPC package: partname, content type, raw bytes and the
/// relationships it owns.
///
/// XML parts are kept as bytes and parsed on demand through [`Part::reader`];
/// the writer side replaces them wholesale with [`Part::set_blob`].
#[derive(Debug, Clone)]
pub struct Part {
    partname: PackURI,
    content_type: String,
    blob: Vec<u8>,
    rels: Relationships,
}

impl Part {
    pub fn new(partname: PackURI, content_type: impl Into<String>, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type: content_type.into(),
            blob,
            rels,
        }
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Whether the content type names an XML payload.
    pub fn is_xml(&self) -> bool {
        self.content_type.ends_with("+xml") || self.content_type.ends_with("/xml")
    }

    /// Part content as UTF-8 text.
    pub fn xml_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.blob)
            .map_err(|e| OpcError::Xml(format!("{} is not UTF-8: {}", self.partname, e)))
    }

    /// A namespace-aware reader over the part content with whitespace
    /// trimming on.
    pub fn reader(&self) -> NsReader<&[u8]> {
        let mut reader = NsReader::from_reader(self.blob.as_slice());
        reader.config_mut().trim_text(true);
        reader
    }

    /// rId of the relationship from this part to `target`, adding one if needed.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(self.partname.base_uri());
        self.rels.get_or_add(reltype, &target_ref).r_id().to_string()
    }

    /// Partname the relationship `r_id` points at.
    pub fn related_partname(&self, r_id: &str) -> Result<PackURI> {
        self.rels
            .get(r_id)
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(format!("{} in {}", r_id, self.partname))
            })?
            .target_partname()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relate_to_uses_relative_ref() {
        let mut part = Part::new(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            "application/xml",
            Vec::new(),
        );
        let layout = PackURI::new("/ppt/slideLayouts/slideLayout2.xml").unwrap();

        let r_id = part.relate_to(&layout, "layout");
        assert_eq!(r_id, "rId1");
        assert_eq!(part.relate_to(&layout, "layout"), "rId1");
        assert_eq!(part.rels().get("rId1").unwrap().target_ref(), "../slideLayouts/slideLayout2.xml");
        assert_eq!(part.related_partname("rId1").unwrap(), layout);
        assert!(part.related_partname("rId9").is_err());
    }

    #[test]
    fn test_is_xml() {
        let uri = PackURI::new("/a.xml").unwrap();
        assert!(Part::new(uri.clone(), "application/xml", Vec::new()).is_xml());
        assert!(
            Part::new(
                uri.clone(),
                "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
                Vec::new()
            )
            .is_xml()
        );
        assert!(!Part::new(uri, "image/png", Vec::new()).is_xml());
    }
}
