//! Lossless nested-record form of an element

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::value::{Array, Object, Value};
use crate::xml::Element;

const NAME: &str = "name";
const TEXT: &str = "text";
const TAIL: &str = "tail";
const ATTRIBUTES: &str = "attributes";
const CHILDREN: &str = "children";

/// An element as plain data: `name`, `text`, `tail`, `attributes`, `children`
///
/// Text and tail are stored verbatim, so converting an element to a record
/// and back yields an equal element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub text: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tail: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: IndexMap<String, String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<Record>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Capture `element`; children are only included when `recurse` is set
    pub fn from_element(element: &Element, recurse: bool) -> Self {
        let children = match recurse {
            true => element
                .children
                .iter()
                .map(|child| Self::from_element(child, true))
                .collect(),
            false => Vec::new(),
        };

        Self {
            name: element.tag.clone(),
            text: element.text.clone(),
            tail: element.tail.clone(),
            attributes: element.attributes.clone(),
            children,
        }
    }

    /// Check that every record in the tree carries a non-empty name
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::malformed_record("empty name"));
        }
        self.children.iter().try_for_each(Self::validate)
    }

    /// Build the element after [`validate`](Self::validate) succeeds
    pub fn to_element(&self) -> Result<Element> {
        self.validate()?;
        Ok(self.build_element())
    }

    pub fn into_element(self) -> Result<Element> {
        self.validate()?;
        Ok(self.build_into_element())
    }

    fn build_element(&self) -> Element {
        Element {
            tag: self.name.clone(),
            text: self.text.clone(),
            tail: self.tail.clone(),
            attributes: self.attributes.clone(),
            children: self.children.iter().map(Self::build_element).collect(),
        }
    }

    fn build_into_element(self) -> Element {
        Element {
            tag: self.name,
            text: self.text,
            tail: self.tail,
            attributes: self.attributes,
            children: self
                .children
                .into_iter()
                .map(Self::build_into_element)
                .collect(),
        }
    }

    /// Decode a record from a generic map
    ///
    /// `Null` and `{}` decode to `None`. Only `name` is required; `text` and
    /// `tail` may be strings or null, `attributes` a map of strings and
    /// `children` a list of records.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            Value::Object(map) => Self::from_object(map).map(Some),
            other => Err(Error::invalid_type(other.type_name())),
        }
    }

    fn from_object(map: &Object) -> Result<Self> {
        let name = match map.get(NAME) {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(Value::String(_)) => return Err(Error::malformed_record("empty name")),
            Some(other) => {
                return Err(Error::malformed_record(format!(
                    "name must be a string, found {}",
                    other.type_name()
                )))
            }
            None => return Err(Error::malformed_record("missing name")),
        };

        let mut record = Self::new(name);
        record.text = string_field(map, TEXT)?;
        record.tail = string_field(map, TAIL)?;

        match map.get(ATTRIBUTES) {
            None | Some(Value::Null) => {}
            Some(Value::Object(attributes)) => {
                for (key, value) in attributes {
                    let value = value.as_string().ok_or_else(|| {
                        Error::malformed_record(format!("attribute {key} must be a string"))
                    })?;
                    record.attributes.insert(key.clone(), value.to_string());
                }
            }
            Some(other) => {
                return Err(Error::malformed_record(format!(
                    "attributes must be a map, found {}",
                    other.type_name()
                )))
            }
        }

        match map.get(CHILDREN) {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                for child in children {
                    let child = match child {
                        Value::Object(child) if !child.is_empty() => Self::from_object(child)?,
                        other => {
                            return Err(Error::malformed_record(format!(
                                "child must be a record, found {}",
                                other.type_name()
                            )))
                        }
                    };
                    record.children.push(child);
                }
            }
            Some(other) => {
                return Err(Error::malformed_record(format!(
                    "children must be a list, found {}",
                    other.type_name()
                )))
            }
        }

        Ok(record)
    }

    /// Encode as a generic map with exactly the five record keys
    pub fn to_value(&self) -> Value {
        let attributes: Object = self
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
            .collect();
        let children: Array = self.children.iter().map(Self::to_value).collect();

        let mut object = Object::new();
        object.insert(NAME, self.name.as_str());
        object.insert(TEXT, self.text.as_str());
        object.insert(TAIL, self.tail.as_str());
        object.insert(ATTRIBUTES, attributes);
        object.insert(CHILDREN, children);
        Value::Object(object)
    }
}

fn string_field(map: &Object, key: &str) -> Result<String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(Error::malformed_record(format!(
            "{key} must be a string, found {}",
            other.type_name()
        ))),
    }
}

impl From<&Element> for Record {
    fn from(element: &Element) -> Self {
        Self::from_element(element, true)
    }
}

impl TryFrom<Record> for Element {
    type Error = Error;

    fn try_from(record: Record) -> Result<Self> {
        record.into_element()
    }
}

/// Lossless record of `element` and its whole subtree
pub fn element_to_record(element: &Element) -> Record {
    Record::from_element(element, true)
}

/// Rebuild an element from its record; an empty name anywhere is `MalformedRecord`
pub fn record_to_element(record: &Record) -> Result<Element> {
    record.to_element()
}
