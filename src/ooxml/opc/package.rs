//! In-memory OPC package.

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::BTreeMap;
use std::path::Path;

/// An Open Packaging Convention package: package-level relationships plus
/// every part reachable from them, ordered by partname.
#[derive(Debug, Clone)]
pub struct OpcPackage {
    rels: Relationships,
    parts: BTreeMap<PackURI, Part>,
}

impl OpcPackage {
    pub fn new() -> Self {
        Self::with_rels(Relationships::new(PACKAGE_URI.to_string()))
    }

    pub(crate) fn with_rels(rels: Relationships) -> Self {
        Self {
            rels,
            parts: BTreeMap::new(),
        }
    }

    /// Read a package from a file on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        PackageReader::read(data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Relationship from the package to `target`, adding one if needed.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(PACKAGE_URI);
        self.rels.get_or_add(reltype, &target_ref).r_id().to_string()
    }

    pub fn part(&self, partname: &PackURI) -> Result<&Part> {
        self.parts
            .get(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn part_mut(&mut self, partname: &PackURI) -> Result<&mut Part> {
        self.parts
            .get_mut(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    #[inline]
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname)
    }

    /// Insert or replace a part.
    pub fn add_part(&mut self, part: Part) {
        self.parts.insert(part.partname().clone(), part);
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Partname of the main document (target of the officeDocument relationship).
    pub fn main_document_partname(&self) -> Result<PackURI> {
        self.rels
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?
            .target_partname()
    }

    /// First partname for `template` used neither by the package nor in
    /// `reserved`, where `%d` stands for the index, e.g.
    /// `/ppt/slides/slide%d.xml`.
    pub fn next_partname(&self, template: &str, reserved: &[PackURI]) -> Result<PackURI> {
        for n in 1..=self.parts.len() + reserved.len() + 1 {
            let candidate = PackURI::new(template.replacen("%d", &n.to_string(), 1))
                .map_err(OpcError::InvalidPackUri)?;
            if !self.parts.contains_key(&candidate) && !reserved.contains(&candidate) {
                return Ok(candidate);
            }
        }
        Err(OpcError::InvalidPackUri(format!("no free partname for {}", template)))
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;

    fn sample_package() -> OpcPackage {
        let mut pkg = OpcPackage::new();
        let pres = PackURI::new("/ppt/presentation.xml").unwrap();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();

        let mut pres_part = Part::new(pres.clone(), ct::PML_PRESENTATION_MAIN, b"<p:presentation/>".to_vec());
        pres_part.relate_to(&slide, relationship_type::SLIDE);
        pkg.add_part(pres_part);
        pkg.add_part(Part::new(slide, ct::PML_SLIDE, b"<p:sld/>".to_vec()));
        pkg.relate_to(&pres, relationship_type::OFFICE_DOCUMENT);
        pkg
    }

    #[test]
    fn test_next_partname() {
        let pkg = sample_package();
        assert_eq!(
            pkg.next_partname("/ppt/slides/slide%d.xml", &[]).unwrap().as_str(),
            "/ppt/slides/slide2.xml"
        );
        assert_eq!(
            pkg.next_partname("/ppt/media/image%d.png", &[]).unwrap().as_str(),
            "/ppt/media/image1.png"
        );
        let taken = [PackURI::new("/ppt/slides/slide2.xml").unwrap()];
        assert_eq!(
            pkg.next_partname("/ppt/slides/slide%d.xml", &taken).unwrap().as_str(),
            "/ppt/slides/slide3.xml"
        );
    }

    #[test]
    fn test_bytes_round_trip_keeps_graph() {
        let pkg = sample_package();
        let reread = OpcPackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();

        let main = reread.main_document_partname().unwrap();
        assert_eq!(main.as_str(), "/ppt/presentation.xml");
        let pres = reread.part(&main).unwrap();
        assert_eq!(pres.content_type(), ct::PML_PRESENTATION_MAIN);
        assert_eq!(
            pres.related_partname("rId1").unwrap().as_str(),
            "/ppt/slides/slide1.xml"
        );
        assert_eq!(reread.iter_parts().count(), 2);
    }

    #[test]
    fn test_unreachable_parts_are_dropped() {
        let mut pkg = sample_package();
        pkg.add_part(Part::new(PackURI::new("/orphan.xml").unwrap(), ct::XML, Vec::new()));

        let reread = OpcPackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert!(!reread.contains_part(&PackURI::new("/orphan.xml").unwrap()));
    }

    #[test]
    fn test_missing_part() {
        let pkg = OpcPackage::new();
        assert!(matches!(
            pkg.part(&PackURI::new("/nope.xml").unwrap()),
            Err(OpcError::PartNotFound(_))
        ));
    }
}
