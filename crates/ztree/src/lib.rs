//! ztree - Path-addressable XML element trees
//!
//! Parse markup into a mutable tree of elements (text/tail content model),
//! address nodes with slash-delimited tag paths, edit the tree in place, and
//! convert it to a lossless record or a lossy generic value.
//!
//! # Quick Start
//!
//! ```
//! use ztree::{edit, path, Attributes};
//! # fn main() -> Result<(), ztree::Error> {
//! let mut root = ztree::from_xml_str("<a><b>one</b><b>two</b></a>")?;
//!
//! edit::insert_element(&mut root, 0, "c/d", "deep", Attributes::new());
//! assert_eq!(path::find(&root, "c/d").map(|d| d.text.as_str()), Some("deep"));
//!
//! let removed = edit::remove_element(&mut root, "b", false);
//! assert_eq!(removed.len(), 2);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Result};

pub mod value;
pub use value::{Array, Object, Value};

pub mod xml;
pub use xml::{
    element_to_string, write_element, write_element_to_path, Attributes, Config, Document,
    Element, Parser,
};

pub mod path;
pub use path::{find, find_all, find_mut, ElementPath};

pub mod namespace;
pub use namespace::{
    strip_namespaces, strip_namespaces_bytes, strip_namespaces_reader, strip_source_namespaces,
    strip_xml_declaration,
};

pub mod input;
pub use input::{resolve, resolve_path, resolve_with_config, Source};

pub mod record;
pub use record::{element_to_record, record_to_element, Record};

pub mod convert;
pub use convert::{element_to_object, to_object};

pub mod edit;
pub use edit::{
    element_is_empty, insert_element, remove_element, remove_elements, remove_empty_element,
};

pub mod stream;
pub use stream::{for_each_streamed, for_each_streamed_path};

pub mod fetch;
pub use fetch::{get_remote_element, is_file_location, Fetch, FileFetcher};

/// Parse XML from a string, stripping namespaces
///
/// Unlike [`resolve`], blank input is an error here.
pub fn from_xml_str(s: &str) -> Result<Element> {
    from_xml_str_with_config(s, Config::default())
}

/// Parse XML from UTF-8 bytes, stripping namespaces
pub fn from_xml_bytes(bytes: &[u8]) -> Result<Element> {
    from_xml_str(std::str::from_utf8(bytes)?)
}

/// Parse XML with custom configuration
pub fn from_xml_str_with_config(s: &str, config: Config) -> Result<Element> {
    input::parse_text(s, config)?.ok_or_else(|| Error::parse_at(0, "no element found"))
}

/// Render an element without a declaration line
pub fn to_xml_string(element: &Element) -> Result<String> {
    element_to_string(element, false)
}
