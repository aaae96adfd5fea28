//! Relationships between parts of an OPC package.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::fmt::Write as _;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    target_ref: String,
    base_uri: String,
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Relative part reference for internal relationships, URL otherwise.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Absolute partname of the target. Fails for external relationships.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(
                "Cannot get target_partname for external relationship".to_string(),
            ));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Relationships of a single source part (or of the package), kept in
/// insertion order.
#[derive(Debug, Clone)]
pub struct Relationships {
    base_uri: String,
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: Vec::new(),
        }
    }

    /// Add a relationship under an explicit rId, replacing one with the same id.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) -> &Relationship {
        self.rels.retain(|rel| rel.r_id != r_id);
        self.rels.push(Relationship::new(
            r_id,
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        ));
        &self.rels[self.rels.len() - 1]
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    /// Relationship of `reltype` to `target_ref`, created with the next free
    /// rId when none exists yet.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> &Relationship {
        let existing = self.rels.iter().position(|rel| {
            rel.reltype == reltype && rel.target_ref == target_ref && !rel.is_external
        });
        match existing {
            Some(pos) => &self.rels[pos],
            None => {
                let r_id = self.next_r_id();
                self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id, false)
            },
        }
    }

    /// Lowest unused `rIdN`, filling gaps left by removed relationships.
    pub fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self.rels.iter().filter_map(|rel| rid_number(&rel.r_id)).collect();
        used.sort_unstable();

        let mut next = 1u32;
        for num in used {
            match num.cmp(&next) {
                std::cmp::Ordering::Equal => next += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }
        format!("rId{}", next)
    }

    /// The single relationship of `reltype`.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.iter().filter(|rel| rel.reltype == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize as a `.rels` item, ordered by rId number.
    pub fn to_xml(&self) -> String {
        let mut sorted: Vec<&Relationship> = self.rels.iter().collect();
        sorted.sort_by_key(|rel| (rid_number(&rel.r_id).unwrap_or(u32::MAX), rel.r_id.clone()));

        let mut xml = String::with_capacity(128 + sorted.len() * 160);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        let _ = write!(xml, "<Relationships xmlns=\"{}\">", namespace::OPC_RELATIONSHIPS);
        for rel in sorted {
            let target_mode = if rel.is_external {
                " TargetMode=\"External\""
            } else {
                ""
            };
            let _ = write!(
                xml,
                "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"{}/>",
                escape_xml(&rel.r_id),
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref),
                target_mode
            );
        }
        xml.push_str("</Relationships>");
        xml
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}

fn rid_number(r_id: &str) -> Option<u32> {
    r_id.strip_prefix("rId").and_then(|n| n.parse().ok())
}
