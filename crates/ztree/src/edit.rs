//! Tree editing: path-creating insertion, removal and emptiness pruning,
//! plus accessors for text, tail and attributes addressed by path
//!
//! Every operation takes the root it works on by reference. An empty path
//! addresses the root itself for the accessors, and nothing at all for
//! insertion and removal.

use std::mem;

use tracing::{debug, trace};

use crate::path::{self, ElementPath, PATH_DELIMITER};
use crate::xml::{Attributes, Document, Element};

/// Build a single-element document
///
/// An empty `name` gives the permanently empty document.
pub fn create_element_tree(name: &str, text: Option<&str>, attributes: Attributes) -> Document {
    if name.is_empty() {
        return Document::empty();
    }
    let mut root = Element::new(name).with_attributes(attributes);
    if let Some(text) = text {
        root.text = text.to_string();
    }
    Document::new(root)
}

/// Insert a new element at `path`, creating missing ancestors on the way
///
/// A single-segment path splices the element into `root`'s children at
/// `index` (clamped). When the full path already exists, the new element
/// becomes a sibling of the existing match under the first match of the
/// parent path. Otherwise each missing intermediate is created empty at
/// index 0 and only the leaf gets `index`, `text` and `attributes`.
pub fn insert_element<'a>(
    root: &'a mut Element,
    index: usize,
    path: &str,
    text: &str,
    attributes: Attributes,
) -> Option<&'a mut Element> {
    let path = ElementPath::parse(path);
    let (leaf_tag, parents) = path.segments().split_last()?;
    let leaf = Element::new(*leaf_tag)
        .with_text(text)
        .with_attributes(attributes);

    if parents.is_empty() {
        return Some(root.insert_child(index, leaf));
    }

    if path::find_segments(root, path.segments()).is_some() {
        let parent = path::find_segments_mut(root, parents)?;
        return Some(parent.insert_child(index, leaf));
    }

    let mut current = root;
    let mut leaf = Some(leaf);
    for (depth, tag) in path.segments().iter().enumerate() {
        let is_leaf = depth + 1 == path.len();
        let existing = current.children.iter().position(|child| child.tag == *tag);
        current = match (existing, is_leaf) {
            (Some(position), _) => current.children.get_mut(position)?,
            (None, true) => current.insert_child(index, leaf.take()?),
            (None, false) => {
                trace!(tag, "creating missing intermediate element");
                current.insert_child(0, Element::new(*tag))
            }
        };
    }
    Some(current)
}

/// Detach every element matching `path`, returned in document order
///
/// With `clear_empty`, ancestors left empty by the removal are pruned too
/// (see [`remove_empty_element`]).
pub fn remove_element(root: &mut Element, path: &str, clear_empty: bool) -> Vec<Element> {
    let parsed = ElementPath::parse(path);
    let Some((leaf, parents)) = parsed.segments().split_last() else {
        return Vec::new();
    };
    if path::find_segments(root, parsed.segments()).is_none() {
        return Vec::new();
    }

    let mut removed = Vec::new();
    if parents.is_empty() {
        removed = detach_children(root, |child| child.tag == *leaf);
    } else {
        path::visit_matches_mut(root, parents, &mut |parent: &mut Element| {
            removed.extend(detach_children(parent, |child| child.tag == *leaf));
        });
        if clear_empty {
            removed.extend(prune_empty(root, parents));
        }
    }

    debug!(path, count = removed.len(), "elements removed");
    removed
}

/// Remove every path in turn, concatenating the results in path order
pub fn remove_elements<I>(root: &mut Element, paths: I, clear_empty: bool) -> Vec<Element>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    paths
        .into_iter()
        .flat_map(|path| remove_element(root, path.as_ref(), clear_empty))
        .collect()
}

/// `None`, or blank text and tail with no attributes and no children
pub fn element_is_empty(element: Option<&Element>) -> bool {
    element.is_none_or(Element::is_empty)
}

/// Remove the empty elements matching `path`, then any ancestors they leave empty
///
/// `target` is appended as a final segment unless `path` already ends with
/// it. The root itself is never removed. Calling this twice in a row removes
/// nothing the second time.
pub fn remove_empty_element(root: &mut Element, path: &str, target: Option<&str>) -> Vec<Element> {
    if path.is_empty() {
        return Vec::new();
    }

    let path = match target {
        Some(target) if !target.is_empty() && !path.ends_with(target) => {
            format!("{path}{PATH_DELIMITER}{target}")
        }
        _ => path.to_string(),
    };

    let parsed = ElementPath::parse(&path);
    let removed = prune_empty(root, parsed.segments());
    debug!(path = %path, count = removed.len(), "empty elements pruned");
    removed
}

fn prune_empty(root: &mut Element, segments: &[&str]) -> Vec<Element> {
    let Some((leaf, parents)) = segments.split_last() else {
        return Vec::new();
    };
    let is_empty_leaf = |child: &Element| child.tag == *leaf && child.is_empty();

    if parents.is_empty() {
        return detach_children(root, is_empty_leaf);
    }

    let mut removed = Vec::new();
    let mut emptied = false;
    path::visit_matches_mut(root, parents, &mut |parent: &mut Element| {
        removed.extend(detach_children(parent, is_empty_leaf));
        emptied |= parent.is_empty();
    });

    if emptied {
        removed.extend(prune_empty(root, parents));
    }
    removed
}

fn detach_children<F>(parent: &mut Element, mut detach: F) -> Vec<Element>
where
    F: FnMut(&Element) -> bool,
{
    let (detached, kept) = mem::take(&mut parent.children)
        .into_iter()
        .partition(|child| detach(child));
    parent.children = kept;
    detached
}

fn target<'a>(root: &'a Element, path: &str) -> Option<&'a Element> {
    match ElementPath::parse(path).is_empty() {
        true => Some(root),
        false => path::find(root, path),
    }
}

fn target_mut<'a>(root: &'a mut Element, path: &str) -> Option<&'a mut Element> {
    match ElementPath::parse(path).is_empty() {
        true => Some(root),
        false => path::find_mut(root, path),
    }
}

/// Drop the children (and tail) of the element at `path`, keeping its text
/// and attributes
pub fn clear_children<'a>(root: &'a mut Element, path: &str) -> Option<&'a mut Element> {
    let element = target_mut(root, path)?;
    element.children.clear();
    element.tail.clear();
    Some(element)
}

/// Reset the element at `path` to a bare tag
pub fn clear_element<'a>(root: &'a mut Element, path: &str) -> Option<&'a mut Element> {
    let element = target_mut(root, path)?;
    let tag = mem::take(&mut element.tag);
    *element = Element::new(tag);
    Some(element)
}

/// Copy the element at `path` in `from` onto the same location in `to`
///
/// The destination is created when missing. Its tag, text, tail and
/// attributes are overwritten, and deep copies of the source children are
/// placed ahead of any children it already had.
pub fn copy_element<'a>(
    from: &Element,
    to: &'a mut Element,
    path: &str,
) -> Option<&'a mut Element> {
    let source = target(from, path)?;

    let destination = match target(to, path).is_some() {
        true => target_mut(to, path)?,
        false => insert_element(to, 0, path, "", Attributes::new())?,
    };

    destination.tag = source.tag.clone();
    destination.text = source.text.clone();
    destination.tail = source.tail.clone();
    destination.attributes = source.attributes.clone();
    let existing = mem::take(&mut destination.children);
    destination.children = source.children.iter().cloned().chain(existing).collect();
    Some(destination)
}

/// True when `path` resolves; the empty path is the root and always exists
pub fn element_exists(root: &Element, path: &str) -> bool {
    target(root, path).is_some()
}

/// Whether any (or, with `all_exist`, every) path resolves
///
/// No paths at all behaves like the empty path.
pub fn elements_exist<I>(root: &Element, paths: I, all_exist: bool) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut paths = paths.into_iter().peekable();
    if paths.peek().is_none() {
        return element_exists(root, "");
    }
    match all_exist {
        true => paths.all(|path| element_exists(root, path.as_ref())),
        false => paths.any(|path| element_exists(root, path.as_ref())),
    }
}

#[derive(Clone, Copy)]
enum Property {
    Text,
    Tail,
}

impl Property {
    fn get(self, element: &Element) -> &str {
        match self {
            Self::Text => &element.text,
            Self::Tail => &element.tail,
        }
    }

    fn set(self, element: &mut Element, value: &str) {
        let slot = match self {
            Self::Text => &mut element.text,
            Self::Tail => &mut element.tail,
        };
        *slot = value.to_string();
    }
}

fn get_property(root: &Element, path: &str, property: Property, default: &str) -> String {
    match target(root, path).map(|element| property.get(element).trim()) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

fn get_properties(root: &Element, path: &str, property: Property) -> Vec<String> {
    let values: Vec<&str> = match ElementPath::parse(path).is_empty() {
        true => vec![property.get(root)],
        false => path::find_all(root, path)
            .into_iter()
            .map(|element| property.get(element))
            .collect(),
    };
    values
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn set_property<'a>(
    root: &'a mut Element,
    path: &str,
    property: Property,
    value: &str,
) -> Option<&'a mut Element> {
    let element = match target(root, path).is_some() {
        true => target_mut(root, path)?,
        false => insert_element(root, 0, path, "", Attributes::new())?,
    };
    property.set(element, value);
    Some(element)
}

fn set_properties<S: AsRef<str>>(
    root: &mut Element,
    path: &str,
    property: Property,
    values: &[S],
) -> usize {
    let Some(first) = values.first() else {
        return 0;
    };
    if ElementPath::parse(path).is_empty() {
        property.set(root, first.as_ref());
        return 1;
    }

    let segments = ElementPath::parse(path);
    let mut assigned = 0;
    path::visit_matches_mut(root, segments.segments(), &mut |element: &mut Element| {
        if let Some(value) = values.get(assigned) {
            property.set(element, value.as_ref());
            assigned += 1;
        }
    });

    for (index, value) in values.iter().enumerate().skip(assigned) {
        if let Some(inserted) = insert_element(root, index, path, "", Attributes::new()) {
            property.set(inserted, value.as_ref());
            assigned += 1;
        }
    }
    assigned
}

/// Stripped text of the element at `path`, or `default` when missing or blank
pub fn get_element_text(root: &Element, path: &str, default: &str) -> String {
    get_property(root, path, Property::Text, default)
}

/// Stripped tail of the element at `path`, or `default` when missing or blank
pub fn get_element_tail(root: &Element, path: &str, default: &str) -> String {
    get_property(root, path, Property::Tail, default)
}

/// Stripped, non-blank texts of every element matching `path`
pub fn get_elements_text(root: &Element, path: &str) -> Vec<String> {
    get_properties(root, path, Property::Text)
}

pub fn get_elements_tail(root: &Element, path: &str) -> Vec<String> {
    get_properties(root, path, Property::Tail)
}

/// Set the text at `path`, inserting the element at index 0 when missing
pub fn set_element_text<'a>(
    root: &'a mut Element,
    path: &str,
    text: &str,
) -> Option<&'a mut Element> {
    set_property(root, path, Property::Text, text)
}

pub fn set_element_tail<'a>(
    root: &'a mut Element,
    path: &str,
    tail: &str,
) -> Option<&'a mut Element> {
    set_property(root, path, Property::Tail, tail)
}

/// Assign `texts` to the elements matching `path`, in order
///
/// Surplus elements are left alone; surplus values get new elements, each
/// inserted at the index of its value. Returns the number of elements set.
pub fn set_elements_text<S: AsRef<str>>(root: &mut Element, path: &str, texts: &[S]) -> usize {
    set_properties(root, path, Property::Text, texts)
}

pub fn set_elements_tail<S: AsRef<str>>(root: &mut Element, path: &str, tails: &[S]) -> usize {
    set_properties(root, path, Property::Tail, tails)
}

pub fn get_element_attribute(element: &Element, name: &str, default: &str) -> String {
    element
        .attributes
        .get(name)
        .map_or_else(|| default.to_string(), Clone::clone)
}

/// Attributes of the element at `path`, empty when it does not exist
pub fn get_element_attributes(root: &Element, path: &str) -> Attributes {
    target(root, path)
        .map(|element| element.attributes.clone())
        .unwrap_or_default()
}

/// Attribute maps of every element matching `path`
pub fn get_elements_attributes(root: &Element, path: &str) -> Vec<Attributes> {
    match ElementPath::parse(path).is_empty() {
        true => vec![root.attributes.clone()],
        false => path::find_all(root, path)
            .into_iter()
            .map(|element| element.attributes.clone())
            .collect(),
    }
}

/// Values of one attribute across every element matching `path`
pub fn get_elements_attribute(root: &Element, path: &str, name: &str) -> Vec<String> {
    get_elements_attributes(root, path)
        .into_iter()
        .filter_map(|mut attributes| attributes.shift_remove(name))
        .collect()
}

/// Add or overwrite attributes, returning the updated map
pub fn set_element_attributes<I, K, V>(element: &mut Element, attributes: I) -> &Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    element
        .attributes
        .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
    &element.attributes
}

/// Remove the named attributes, returning the pairs that were present
pub fn remove_element_attributes<I>(element: &mut Element, names: I) -> Attributes
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            element
                .attributes
                .shift_remove(name)
                .map(|value| (name.to_string(), value))
        })
        .collect()
}

pub fn get_element_name<'a>(root: &'a Element, path: &str) -> Option<&'a str> {
    target(root, path).map(|element| element.tag.as_str())
}

/// Apply `f` to every direct child of `root`
pub fn iter_elements<F>(root: &mut Element, f: F)
where
    F: FnMut(&mut Element),
{
    root.children.iter_mut().for_each(f);
}
