//! Text-level namespace and declaration stripping
//!
//! These passes run on raw markup before it reaches the parser, so a document
//! written with `xmlns` declarations and `ns:` prefixes parses into the same
//! tree as its unqualified equivalent.

use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::error::Result;
use crate::input::Source;

/// `xmlns` / `xmlns:prefix` declarations inside a start tag
#[allow(clippy::expect_used)]
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<[^>]*)\sxmlns[^"'>]+["'][^"'>]+["']"#).expect("valid pattern")
});

/// Prefix of an opening or closing tag name
#[allow(clippy::expect_used)]
static TAG_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(</?)[\w\-.]+:").expect("valid pattern"));

/// Prefix of an attribute name
#[allow(clippy::expect_used)]
static ATTRIBUTE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s+)([\w\-.]+:)([\w\-.]+\s*=)").expect("valid pattern")
});

#[allow(clippy::expect_used)]
static XML_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<\?xml[\w\s[:punct:]]*?\?>\s*").expect("valid pattern")
});

/// Remove namespace declarations and prefixes from markup text
pub fn strip_namespaces(markup: &str) -> String {
    let mut content = markup.to_string();

    // Declarations can overlap inside one tag, so repeat until none are left.
    while DECLARATION.is_match(&content) {
        content = DECLARATION.replace_all(&content, "${1}").into_owned();
    }

    let content = TAG_PREFIX.replace_all(&content, "${1}");
    let content = ATTRIBUTE_PREFIX.replace_all(&content, "${1}${3}");

    trace!(before = markup.len(), after = content.len(), "namespaces stripped");
    content.into_owned()
}

/// Decode UTF-8 bytes, then strip namespaces
pub fn strip_namespaces_bytes(markup: &[u8]) -> Result<String> {
    Ok(strip_namespaces(std::str::from_utf8(markup)?))
}

/// Read the stream to the end, then strip namespaces
pub fn strip_namespaces_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(strip_namespaces(&content))
}

/// Strip namespaces from a text-shaped source
///
/// Text, bytes and readers come back as [`Source::Text`]; every other shape
/// is returned unchanged.
pub fn strip_source_namespaces(source: Source) -> Result<Source> {
    let stripped = match source {
        Source::Text(text) => strip_namespaces(&text),
        Source::Bytes(bytes) => strip_namespaces_bytes(&bytes)?,
        Source::Reader(reader) => strip_namespaces_reader(reader)?,
        other => return Ok(other),
    };
    Ok(Source::Text(stripped))
}

/// Remove a leading `<?xml ...?>` declaration and the whitespace around it
pub fn strip_xml_declaration(markup: &str) -> &str {
    match XML_DECLARATION.find(markup) {
        Some(found) => markup.get(found.end()..).unwrap_or_default(),
        None => markup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Element;

    const NAMESPACED: &str = r#"<ns:root xmlns:ns="urn:a" xmlns="urn:default" ns:id="1"><ns:child ns:kind='x'>text</ns:child><plain/></ns:root>"#;

    #[test]
    fn test_strip_namespaces() {
        assert_eq!(
            strip_namespaces(NAMESPACED),
            r#"<root id="1"><child kind='x'>text</child><plain/></root>"#
        );
    }

    #[test]
    fn test_strip_namespaces_empty() {
        assert_eq!(strip_namespaces(""), "");
    }

    #[test]
    fn test_strip_namespaces_fixed_point() {
        let once = strip_namespaces(NAMESPACED);
        assert_eq!(strip_namespaces(&once), once);
    }

    #[test]
    fn test_text_content_untouched() {
        let markup = "<a>see: http://example.com and x:y</a>";
        assert_eq!(strip_namespaces(markup), markup);
    }

    #[test]
    fn test_strip_bytes_and_reader() -> Result<()> {
        let expected = strip_namespaces(NAMESPACED);
        assert_eq!(strip_namespaces_bytes(NAMESPACED.as_bytes())?, expected);
        assert_eq!(strip_namespaces_reader(NAMESPACED.as_bytes())?, expected);
        assert_eq!(strip_namespaces_bytes(b"")?, "");
        assert!(strip_namespaces_bytes(&[0xff, 0xfe]).is_err());
        Ok(())
    }

    #[test]
    fn test_strip_source_passes_through_other_shapes() -> Result<()> {
        let element = Element::new("a");
        let kept = strip_source_namespaces(Source::Element(element.clone()))?;
        assert!(matches!(kept, Source::Element(ref kept) if *kept == element));
        assert!(matches!(strip_source_namespaces(Source::None)?, Source::None));

        let stripped = strip_source_namespaces(Source::Bytes(NAMESPACED.as_bytes().to_vec()))?;
        assert!(matches!(stripped, Source::Text(ref text) if !text.contains("xmlns")));
        Ok(())
    }

    #[test]
    fn test_strip_xml_declaration() {
        let target = r#"<root a="aaa" b="bbb">text</root>"#;
        let declared = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{target}");
        assert_eq!(strip_xml_declaration(&declared), target);

        let multiline = "\n    <?xml\n     version=\"1.0\"\n     encoding=\"UTF-8\"\n     standalone=\"yes\" ?>\n";
        assert_eq!(strip_xml_declaration(multiline), "");
        assert_eq!(strip_xml_declaration(target), target);
        assert_eq!(strip_xml_declaration(""), "");
    }
}
