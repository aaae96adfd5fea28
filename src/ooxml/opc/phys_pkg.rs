//! Physical (zip) side of an OPC package.

use crate::ooxml::opc::error::Result;
use crate::ooxml::opc::packuri::PackURI;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Zip members of a package, fully decompressed into memory and keyed by
/// member name (partname without the leading slash).
pub struct PhysPkgReader {
    members: HashMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    /// Decompress every member of the archive in `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.insert(file.name().to_string(), blob);
        }

        Ok(Self { members })
    }

    #[inline]
    pub fn blob_for(&self, pack_uri: &PackURI) -> Option<&[u8]> {
        self.members.get(pack_uri.membername()).map(Vec::as_slice)
    }

    /// Move a member out of the reader, avoiding a copy of its bytes.
    #[inline]
    pub fn take_blob(&mut self, pack_uri: &PackURI) -> Option<Vec<u8>> {
        self.members.remove(pack_uri.membername())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Writes package items into an in-memory zip archive.
pub struct PhysPkgWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add a deflate-compressed member for `pack_uri`.
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(pack_uri.membername(), options)?;
        self.zip.write_all(blob)?;
        Ok(())
    }

    /// Finalize the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_members() {
        let mut writer = PhysPkgWriter::new();
        let uri = PackURI::new("/ppt/presentation.xml").unwrap();
        writer.write(&uri, b"<p:presentation/>").unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = PhysPkgReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.blob_for(&uri), Some(&b"<p:presentation/>"[..]));
        assert_eq!(reader.take_blob(&uri).unwrap(), b"<p:presentation/>".to_vec());
        assert!(reader.is_empty());
    }

    #[test]
    fn test_rejects_non_zip() {
        assert!(PhysPkgReader::from_bytes(b"definitely not a zip").is_err());
    }
}
