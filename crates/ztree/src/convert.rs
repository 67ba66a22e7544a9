//! Lossy conversion from elements to generic values
//!
//! Repeated child tags collapse into lists, attributes merge with children,
//! and text/tail end up either as the bare value of a leaf or under the
//! `value` key of a structured node:
//!
//! ```text
//! <elem val="attribute"><val>nested text</val><val prop="attr">nested dict text</val>nested dict tail</elem>
//!
//! {"elem": {"val": ["nested text", {"prop": "attr", "value": ["nested dict text", "nested dict tail"]}, "attribute"]}}
//! ```

use tracing::debug;

use crate::error::Result;
use crate::input::{self, Source};
use crate::namespace::strip_source_namespaces;
use crate::value::{Object, Value};
use crate::xml::Element;

/// Key holding the type of an object in consumers of the converted form
pub const TYPE_KEY: &str = "type";
/// Key holding the text/tail of a structured node
pub const VALUE_KEY: &str = "value";

const RESERVED_KEYS: [&str; 2] = [TYPE_KEY, VALUE_KEY];

/// Convert an element and its subtree into a generic value
pub fn element_to_object(element: &Element) -> Value {
    let mut object = Object::new();

    for child in &element.children {
        object.accumulate(child.tag.as_str(), element_to_object(child));
    }

    for (name, value) in &element.attributes {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let key = match RESERVED_KEYS.contains(&name.as_str()) {
            true => format!("{}_{name}", element.tag),
            false => name.clone(),
        };
        object.accumulate(key, value);
    }

    let text = reduce_text_values(&element.text, &element.tail);
    if object.is_empty() {
        return text;
    }
    if !is_blank(&text) {
        object.insert(VALUE_KEY, text);
    }
    Value::Object(object)
}

/// Resolve `source` (and optionally `path`) and convert the result
///
/// Returns the root tag alongside `{root_tag: object}`. Text-shaped sources
/// always have their namespaces stripped; a missing element yields
/// `("", {"": {}})`.
pub fn to_object(source: impl Into<Source>, path: Option<&str>) -> Result<(String, Value)> {
    let source = strip_source_namespaces(source.into())?;
    let root = match path {
        Some(path) => input::resolve_path(source, path)?,
        None => input::resolve(source)?,
    };

    let (tag, converted) = match &root {
        Some(root) => (root.tag.clone(), element_to_object(root)),
        None => (String::new(), Value::Object(Object::new())),
    };
    debug!(tag = %tag, "converted to object");

    let mut wrapped = Object::new();
    wrapped.insert(tag.as_str(), converted);
    Ok((tag, Value::Object(wrapped)))
}

/// Strip text and tail, drop blanks, then reduce to a scalar, a pair or `""`
fn reduce_text_values(text: &str, tail: &str) -> Value {
    let mut values: Vec<Value> = [text, tail]
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(Value::from)
        .collect();

    match values.len() {
        0 => Value::from(""),
        1 => values.pop().unwrap_or_default(),
        _ => Value::from(values),
    }
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(text) if text.is_empty())
}
