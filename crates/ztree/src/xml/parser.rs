//! XML parser: maps `quick-xml` events onto the text/tail element model

use std::io::BufRead;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, ErrorKind, Result};
use crate::xml::model::Element;

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
    /// Parse prefixed names as they are instead of stripping namespaces first
    pub keep_namespaces: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_size: 64 * 1024 * 1024, // 64 MB default
            keep_namespaces: false,
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
            keep_namespaces: false,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
            keep_namespaces: false,
        }
    }

    pub const fn keep_namespaces(mut self, keep: bool) -> Self {
        self.keep_namespaces = keep;
        self
    }

    pub(crate) fn check_size(&self, size: usize) -> Result<()> {
        if self.max_size > 0 && size > self.max_size {
            return Err(Error::new(ErrorKind::MaxSizeExceeded {
                max: self.max_size,
            }));
        }
        Ok(())
    }
}

/// XML parser building a single element tree from a complete buffer
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a [u8],
    config: Config,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new XML parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self { input, config }
    }

    /// Parse the input into its root element
    pub fn parse(&mut self) -> Result<Element> {
        self.config.check_size(self.input.len())?;

        let mut reader = Reader::from_reader(self.input);
        let mut buf = Vec::new();
        let mut builder = TreeBuilder::new(self.config);

        loop {
            match read_step(&mut reader, &mut buf)? {
                Step::Open(element) => builder.open(element, position(&reader))?,
                Step::Leaf(element) => {
                    builder.open(element, position(&reader))?;
                    builder.close_and_attach();
                }
                Step::Close => builder.close_and_attach(),
                Step::Text(text) => builder.text(&text, position(&reader))?,
                Step::Skip => {}
                Step::Eof => return builder.finish(position(&reader)),
            }
        }
    }
}

/// Owned view of a tokenizer event
#[derive(Debug)]
pub(crate) enum Step {
    Open(Element),
    Leaf(Element),
    Close,
    Text(String),
    Skip,
    Eof,
}

pub(crate) fn position<R>(reader: &Reader<R>) -> u64 {
    u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX)
}

/// Read the next event and detach it from the reader's buffer
pub(crate) fn read_step<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> Result<Step> {
    buf.clear();
    let event = match reader.read_event_into(buf) {
        Ok(event) => event,
        Err(quick_xml::Error::Io(err)) => {
            return Err(Error::with_message(
                ErrorKind::Io,
                format!("i/o failure: {err}"),
            ))
        }
        Err(err) => {
            let offset = u64::try_from(reader.error_position()).unwrap_or(u64::MAX);
            return Err(Error::parse_at(offset, err));
        }
    };

    let step = match event {
        Event::Start(start) => Step::Open(element_from_start(&start)?),
        Event::Empty(start) => Step::Leaf(element_from_start(&start)?),
        Event::End(_) => Step::Close,
        Event::Text(text) => Step::Text(text.decode()?.into_owned()),
        Event::CData(data) => Step::Text(data.decode()?.into_owned()),
        Event::GeneralRef(reference) => Step::Text(resolve_reference(&reference)?),
        Event::Eof => Step::Eof,
        _ => Step::Skip,
    };
    Ok(step)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let tag = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut element = Element::new(tag);

    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.insert(key, value);
    }

    Ok(element)
}

fn resolve_reference(reference: &BytesRef<'_>) -> Result<String> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }

    let name = reference.decode()?;
    match resolve_predefined_entity(&name) {
        Some(resolved) => Ok(resolved.to_string()),
        None => Err(Error::with_message(
            ErrorKind::ParseFailure { offset: 0 },
            format!("undefined entity: &{name};"),
        )),
    }
}

/// Incremental tree assembly shared by the buffer parser and the streaming driver
#[derive(Debug)]
pub(crate) struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
    config: Config,
    /// Set once the outermost element has shed a finished child
    root_children_cleared: bool,
}

impl TreeBuilder {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            stack: Vec::new(),
            root: None,
            config,
            root_children_cleared: false,
        }
    }

    pub(crate) fn open(&mut self, element: Element, offset: u64) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(Error::parse_at(offset, "junk after document element"));
        }
        let max = self.config.max_depth;
        if max > 0 && self.stack.len() >= usize::from(max) {
            return Err(Error::new(ErrorKind::MaxDepthExceeded { max }));
        }
        self.stack.push(element);
        Ok(())
    }

    /// Pop the innermost open element without attaching it anywhere
    pub(crate) fn close(&mut self) -> Option<Element> {
        self.stack.pop()
    }

    /// Hand a closed element to its parent, or keep it as the root
    pub(crate) fn attach(&mut self, element: Element) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => self.root = Some(element),
        }
    }

    pub(crate) fn close_and_attach(&mut self) {
        if let Some(element) = self.close() {
            self.attach(element);
        }
    }

    /// Text belongs to the open element, or to the tail of its last child
    pub(crate) fn text(&mut self, text: &str, offset: u64) -> Result<()> {
        let detached_tail = self.root_children_cleared && self.stack.len() == 1;
        match self.stack.last_mut() {
            // Tail of a top-level child that has already been dropped
            Some(_) if detached_tail => {}
            Some(open) => match open.children.last_mut() {
                Some(previous) => previous.tail.push_str(text),
                None => open.text.push_str(text),
            },
            None if text.trim().is_empty() => {}
            None => return Err(Error::parse_at(offset, "text outside of the root element")),
        }
        Ok(())
    }

    /// Drop the children collected under the outermost open element
    pub(crate) fn clear_root_children(&mut self) {
        if let Some(root) = self.stack.first_mut() {
            root.children.clear();
            self.root_children_cleared = true;
        }
    }

    pub(crate) fn finish(self, offset: u64) -> Result<Element> {
        if let Some(open) = self.stack.last() {
            return Err(Error::parse_at(
                offset,
                format!("unclosed element <{}>", open.tag),
            ));
        }
        self.root
            .ok_or_else(|| Error::parse_at(offset, "no element found"))
    }
}
