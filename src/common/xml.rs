use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

/// Escape text for use in XML content or attribute values.
///
/// Control characters that XML 1.0 cannot carry (everything below U+0020
/// except tab, line feed and carriage return) are dropped.
///
/// # Examples
///
/// ```
/// use deckmill::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<t>\"q\"</t>"), "&lt;t&gt;&quot;q&quot;&lt;/t&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    let escaped = XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"]);
    if escaped.bytes().any(is_forbidden_control) {
        escaped
            .chars()
            .filter(|c| !(c.is_ascii() && is_forbidden_control(*c as u8)))
            .collect()
    } else {
        escaped
    }
}

#[inline]
fn is_forbidden_control(b: u8) -> bool {
    b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')
}

/// Read an attribute value from a quick-xml start tag as an owned string.
pub(crate) fn attr_value(
    e: &quick_xml::events::BytesStart<'_>,
    name: &[u8],
) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_entities() {
        assert_eq!(escape_xml("Tom & \"Jerry\" <'cat'>"), "Tom &amp; &quot;Jerry&quot; &lt;&apos;cat&apos;&gt;");
    }

    #[test]
    fn test_escape_drops_control_chars() {
        assert_eq!(escape_xml("a\u{0}b\u{b}c\td"), "abc\td");
    }

    #[test]
    fn test_escape_keeps_non_ascii() {
        assert_eq!(escape_xml("Café ≥ 5"), "Café ≥ 5");
    }
}
