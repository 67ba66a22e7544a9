//! Source abstraction: every input shape the tree operations accept

use std::fmt;
use std::io::Read;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::namespace::{strip_namespaces, strip_xml_declaration};
use crate::path;
use crate::record::Record;
use crate::value::Value;
use crate::xml::{Config, Document, Element, Parser};

/// Anything that can be resolved into an element
#[derive(Default)]
pub enum Source {
    #[default]
    None,
    Element(Element),
    Document(Document),
    /// Markup text
    Text(String),
    /// UTF-8 encoded markup
    Bytes(Vec<u8>),
    /// A stream of UTF-8 encoded markup, read to the end on resolution
    Reader(Box<dyn Read>),
    Record(Record),
    /// A generic map holding a record, or markup text
    Value(Value),
}

impl Source {
    /// Wrap any reader
    pub fn reader(reader: impl Read + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short name of the shape, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Element(_) => "element",
            Self::Document(_) => "document",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Reader(_) => "reader",
            Self::Record(_) => "record",
            Self::Value(_) => "value",
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Self::Document(document) => f.debug_tuple("Document").field(document).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
            Self::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Element> for Source {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Document> for Source {
    fn from(document: Document) -> Self {
        Self::Document(document)
    }
}

impl From<Record> for Source {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Box<dyn Read>> for Source {
    fn from(reader: Box<dyn Read>) -> Self {
        Self::Reader(reader)
    }
}

impl<T: Into<Source>> From<Option<T>> for Source {
    fn from(source: Option<T>) -> Self {
        source.map_or(Self::None, Into::into)
    }
}

/// Resolve a source into its root element
pub fn resolve(source: impl Into<Source>) -> Result<Option<Element>> {
    resolve_with_config(source, Config::default())
}

/// Resolve a source, then follow `path` from its root (first match)
pub fn resolve_path(source: impl Into<Source>, path: &str) -> Result<Option<Element>> {
    let Some(mut root) = resolve(source)? else {
        return Ok(None);
    };
    if path.is_empty() {
        return Ok(Some(root));
    }

    let segments = path::ElementPath::parse(path);
    let found = take_first(&mut root, segments.segments());
    trace!(path, found = found.is_some(), "path resolved");
    Ok(found)
}

/// Resolve a source with explicit parser limits
pub fn resolve_with_config(source: impl Into<Source>, config: Config) -> Result<Option<Element>> {
    let source = source.into();
    debug!(kind = source.kind(), "resolving source");

    match source {
        Source::None => Ok(None),
        Source::Element(element) => Ok(Some(element)),
        Source::Document(document) => Ok(document.into_root()),
        Source::Text(text) => parse_text(&text, config),
        Source::Bytes(bytes) => {
            config.check_size(bytes.len())?;
            parse_text(std::str::from_utf8(&bytes)?, config)
        }
        Source::Reader(mut reader) => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            parse_text(std::str::from_utf8(&bytes)?, config)
        }
        Source::Record(record) => record.into_element().map(Some),
        Source::Value(Value::Null) => Ok(None),
        Source::Value(Value::String(text)) => parse_text(&text, config),
        Source::Value(value @ Value::Object(_)) => {
            Record::from_value(&value)?
                .map(Record::into_element)
                .transpose()
        }
        Source::Value(other) => Err(Error::invalid_type(other.type_name())),
    }
}

/// Parse markup text the way every text-shaped source is parsed
///
/// The text is trimmed and its declaration dropped; blank input is `None`.
pub fn parse_text(text: &str, config: Config) -> Result<Option<Element>> {
    config.check_size(text.len())?;

    let body = strip_xml_declaration(text.trim()).trim();
    if body.is_empty() {
        return Ok(None);
    }

    let element = match config.keep_namespaces {
        true => Parser::with_config(body.as_bytes(), config).parse()?,
        false => {
            let stripped = strip_namespaces(body);
            Parser::with_config(stripped.as_bytes(), config).parse()?
        }
    };
    Ok(Some(element))
}

/// Detach the first element along `segments` from an owned tree
fn take_first(root: &mut Element, segments: &[&str]) -> Option<Element> {
    path::find_segments_mut(root, segments).map(std::mem::take)
}
