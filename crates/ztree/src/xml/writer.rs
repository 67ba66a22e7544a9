//! XML serialization through the `quick-xml` writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::xml::model::Element;

/// Encoding used for every byte <-> text conversion
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Render an element (and its tail) as markup text
///
/// The null element renders as the empty string.
pub fn element_to_string(element: &Element, include_declaration: bool) -> Result<String> {
    if element.is_null() {
        return Ok(String::new());
    }

    let mut writer = Writer::new(Vec::new());
    if include_declaration {
        write_declaration(&mut writer)?;
    }
    write_node(&mut writer, element)?;

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Write the declaration line followed by the element
pub fn write_element<W: Write>(element: &Element, out: W) -> Result<()> {
    let mut writer = Writer::new(out);
    write_declaration(&mut writer)?;
    if !element.is_null() {
        write_node(&mut writer, element)?;
    }
    writer.get_mut().flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write the element to it
#[instrument(skip(element), fields(tag = %element.tag))]
pub fn write_element_to_path(element: &Element, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_element(element, BufWriter::new(file))?;
    debug!("element written");
    Ok(())
}

fn write_declaration<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some(DEFAULT_ENCODING), None)))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.text.is_empty() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        if !element.text.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&element.text)))?;
        }
        for child in &element.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    }

    if !element.tail.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.tail)))?;
    }
    Ok(())
}
