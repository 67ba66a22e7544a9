//! Slash-delimited element paths
//!
//! A path is a plain list of tag names: `"c/d/e"` descends from the starting
//! element through a `c` child, then a `d` grandchild, then `e`. There are no
//! predicates, wildcards or axes, and a path never addresses the starting
//! element itself.

use crate::xml::Element;

/// Separator between path segments
pub const PATH_DELIMITER: char = '/';

/// A parsed element path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> ElementPath<'a> {
    /// Split `path` on `/`, dropping empty segments
    pub fn parse(path: &'a str) -> Self {
        Self {
            segments: path
                .split(PATH_DELIMITER)
                .filter(|segment| !segment.is_empty())
                .collect(),
        }
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final tag name
    pub fn last(&self) -> Option<&'a str> {
        self.segments.last().copied()
    }

    /// Everything but the final segment
    pub fn parent(&self) -> Self {
        let keep = self.segments.len().saturating_sub(1);
        Self {
            segments: self.segments.iter().take(keep).copied().collect(),
        }
    }

    /// Join the segments back into a path string
    pub fn to_path_string(&self) -> String {
        self.segments.join("/")
    }
}

/// First element reached by following `path` from `root`
pub fn find<'e>(root: &'e Element, path: &str) -> Option<&'e Element> {
    let path = ElementPath::parse(path);
    find_segments(root, path.segments())
}

pub fn find_mut<'e>(root: &'e mut Element, path: &str) -> Option<&'e mut Element> {
    let path = ElementPath::parse(path);
    find_segments_mut(root, path.segments())
}

/// Every element reachable along `path`, in document order
pub fn find_all<'e>(root: &'e Element, path: &str) -> Vec<&'e Element> {
    let path = ElementPath::parse(path);
    let mut found = Vec::new();
    if !path.is_empty() {
        collect_matches(root, path.segments(), &mut found);
    }
    found
}

/// True when `path` resolves to at least one element under `root`
pub fn exists(root: &Element, path: &str) -> bool {
    find(root, path).is_some()
}

pub(crate) fn find_segments<'e>(root: &'e Element, segments: &[&str]) -> Option<&'e Element> {
    let (first, rest) = segments.split_first()?;
    root.children
        .iter()
        .filter(|child| child.tag == *first)
        .find_map(|child| match rest.is_empty() {
            true => Some(child),
            false => find_segments(child, rest),
        })
}

pub(crate) fn find_segments_mut<'e>(
    root: &'e mut Element,
    segments: &[&str],
) -> Option<&'e mut Element> {
    let (first, rest) = segments.split_first()?;
    if rest.is_empty() {
        return root.child_mut(first);
    }
    // The first matching branch that resolves wins, like the shared-borrow search.
    let index = root
        .children
        .iter()
        .position(|child| child.tag == *first && find_segments(child, rest).is_some())?;
    root.children
        .get_mut(index)
        .and_then(|child| find_segments_mut(child, rest))
}

fn collect_matches<'e>(root: &'e Element, segments: &[&str], found: &mut Vec<&'e Element>) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    for child in root.children.iter().filter(|child| child.tag == *first) {
        if rest.is_empty() {
            found.push(child);
        } else {
            collect_matches(child, rest, found);
        }
    }
}

/// Call `visit` on every element matching `segments`, in document order
pub(crate) fn visit_matches_mut<F>(root: &mut Element, segments: &[&str], visit: &mut F)
where
    F: FnMut(&mut Element),
{
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    for child in root.children.iter_mut().filter(|child| child.tag == *first) {
        if rest.is_empty() {
            visit(child);
        } else {
            visit_matches_mut(child, rest, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("a")
            .with_child(
                Element::new("c")
                    .with_child(Element::new("d").with_text("d1"))
                    .with_child(Element::new("e")),
            )
            .with_child(
                Element::new("c")
                    .with_child(Element::new("d").with_text("d2"))
                    .with_child(Element::new("d").with_text("d3")),
            )
            .with_child(Element::new("f"))
    }

    #[test]
    fn test_parse_segments() {
        assert_eq!(ElementPath::parse("c/d/e").segments(), &["c", "d", "e"]);
        assert_eq!(ElementPath::parse("/c//d/").segments(), &["c", "d"]);
        assert!(ElementPath::parse("").is_empty());
        assert_eq!(ElementPath::parse("c/d/e").parent().to_path_string(), "c/d");
        assert_eq!(ElementPath::parse("c/d/e").last(), Some("e"));
        assert!(ElementPath::parse("c").parent().is_empty());
    }

    #[test]
    fn test_find_first_match() {
        let root = sample();
        assert_eq!(find(&root, "c/d").map(|d| d.text.as_str()), Some("d1"));
        assert_eq!(find(&root, "f").map(|f| f.tag.as_str()), Some("f"));
        assert!(find(&root, "c/x").is_none());
        assert!(find(&root, "").is_none());
        assert!(find(&root, "a").is_none());
    }

    #[test]
    fn test_find_first_match_searches_later_branches() {
        let root = sample();
        // Only the second `c` has no `e`; `c/e` must still come from the first.
        assert!(find(&root, "c/e").is_some());
        let root = Element::new("a")
            .with_child(Element::new("c"))
            .with_child(Element::new("c").with_child(Element::new("g")));
        assert!(find(&root, "c/g").is_some());
    }

    #[test]
    fn test_find_all_document_order() {
        let root = sample();
        let texts: Vec<_> = find_all(&root, "c/d").iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["d1", "d2", "d3"]);
        assert_eq!(find_all(&root, "c").len(), 2);
        assert!(find_all(&root, "").is_empty());
    }

    #[test]
    fn test_find_mut() {
        let mut root = sample();
        if let Some(e) = find_mut(&mut root, "c/e") {
            e.text = "changed".to_string();
        }
        assert_eq!(find(&root, "c/e").map(|e| e.text.as_str()), Some("changed"));
    }

    #[test]
    fn test_visit_matches_mut() {
        let mut root = sample();
        let mut count = 0;
        visit_matches_mut(&mut root, &["c", "d"], &mut |d: &mut Element| {
            count += 1;
            d.tail = "t".to_string();
        });
        assert_eq!(count, 3);
        assert!(find_all(&root, "c/d").iter().all(|d| d.tail == "t"));
    }
}
