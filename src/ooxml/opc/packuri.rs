//! Part names inside an OPC package.

/// Pseudo-partname of the package itself; its relationships live in `/_rels/.rels`.
pub const PACKAGE_URI: &str = "/";

/// Partname of the content types item.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// A partname within an OPC package, such as `/ppt/slides/slide3.xml`.
///
/// Partnames always begin with a forward slash and use forward slashes as
/// separators regardless of platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a partname; fails unless `uri` starts with `/`.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relationship target such as `../slideLayouts/slideLayout1.xml`
    /// against the directory of its source part.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(normalize(&joined))
    }

    /// Directory portion, e.g. `/ppt/slides` for `/ppt/slides/slide1.xml`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Final path segment, e.g. `slide1.xml`. Empty for the package URI.
    pub fn filename(&self) -> &str {
        self.uri.rfind('/').map_or("", |pos| &self.uri[pos + 1..])
    }

    /// Extension without the leading period.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        filename.rfind('.').map_or("", |pos| &filename[pos + 1..])
    }

    /// Numeric suffix of a tuple partname: 21 for `/ppt/slides/slide21.xml`,
    /// `None` for singletons like `/ppt/presentation.xml`.
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let stem = filename.rfind('.').map_or(filename, |pos| &filename[..pos]);
        let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 || digits == stem.len() {
            return None;
        }
        stem[stem.len() - digits..].parse().ok()
    }

    /// Zip member name: the partname without its leading slash.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Relative reference from `base_uri` to this partname, as written into
    /// a `.rels` item.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

        let mut segments: Vec<&str> = vec![".."; from.len() - common];
        segments.extend(&to[common..]);
        segments.join("/")
    }

    /// Partname of the relationships item belonging to this part.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let base = self.base_uri();
        let rels = if base == "/" {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base, self.filename())
        };
        Self::new(rels)
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Collapse `.` and `..` segments of an absolute slash-separated path.
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            _ => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_slash() {
        assert!(PackURI::new("ppt/presentation.xml").is_err());
        assert!(PackURI::new("/ppt/presentation.xml").is_ok());
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/ppt/slides", "../slideLayouts/slideLayout2.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/slideLayouts/slideLayout2.xml");

        let uri = PackURI::from_rel_ref("/", "ppt/presentation.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/presentation.xml");

        let uri = PackURI::from_rel_ref("/ppt", "/docProps/app.xml").unwrap();
        assert_eq!(uri.as_str(), "/docProps/app.xml");
    }

    #[test]
    fn test_components() {
        let uri = PackURI::new("/ppt/slides/slide21.xml").unwrap();
        assert_eq!(uri.base_uri(), "/ppt/slides");
        assert_eq!(uri.filename(), "slide21.xml");
        assert_eq!(uri.ext(), "xml");
        assert_eq!(uri.idx(), Some(21));
        assert_eq!(uri.membername(), "ppt/slides/slide21.xml");

        let single = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(single.idx(), None);
        assert_eq!(PackURI::new(PACKAGE_URI).unwrap().base_uri(), "/");
    }

    #[test]
    fn test_relative_ref() {
        let uri = PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap();
        assert_eq!(uri.relative_ref("/ppt/slides"), "../slideLayouts/slideLayout1.xml");
        assert_eq!(uri.relative_ref("/ppt"), "slideLayouts/slideLayout1.xml");
        assert_eq!(uri.relative_ref("/"), "ppt/slideLayouts/slideLayout1.xml");
    }

    #[test]
    fn test_rels_uri() {
        let uri = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(uri.rels_uri().unwrap().as_str(), "/ppt/_rels/presentation.xml.rels");
        let pkg = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(pkg.rels_uri().unwrap().as_str(), "/_rels/.rels");
    }
}
