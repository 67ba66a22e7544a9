//! XML data model

use indexmap::IndexMap;

/// Attribute map of an element, kept in document order
pub type Attributes = IndexMap<String, String>;

/// XML element using the text/tail content model
///
/// `text` is the content before the first child, `tail` the content that
/// follows this element's closing tag inside its parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub text: String,
    pub tail: String,
    pub attributes: Attributes,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// The element standing in for "no tree"
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.tag.is_empty()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.tag == tag)
    }

    pub fn child_mut(&mut self, tag: &str) -> Option<&mut Self> {
        self.children.iter_mut().find(|child| child.tag == tag)
    }

    /// Splice `child` in at `index`, clamped to the current child count
    #[allow(clippy::indexing_slicing)]
    pub fn insert_child(&mut self, index: usize, child: Self) -> &mut Self {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        &mut self.children[index]
    }

    /// Number of elements in this subtree, self included
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.tail.trim().is_empty()
            && self.attributes.is_empty()
            && self.children.is_empty()
    }
}

/// XML document: at most one root element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub root: Option<Element>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root: Some(root) }
    }

    /// The permanently empty document
    pub fn empty() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.root.as_mut()
    }

    pub fn into_root(self) -> Option<Element> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

impl From<Element> for Document {
    fn from(root: Element) -> Self {
        Self::new(root)
    }
}

impl From<Option<Element>> for Document {
    fn from(root: Option<Element>) -> Self {
        Self { root }
    }
}
