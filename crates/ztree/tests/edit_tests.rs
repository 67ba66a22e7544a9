use ztree::edit::{
    copy_element, get_element_text, get_elements_text, set_element_attributes,
    set_elements_text,
};
use ztree::{
    find, find_all, insert_element, remove_element, remove_elements, remove_empty_element,
    resolve, Attributes, Element,
};

const ELEM_DATA: &str = include_str!("fixtures/elem_data.xml");

fn fixture() -> Result<Element, Box<dyn std::error::Error>> {
    resolve(ELEM_DATA)?.ok_or_else(|| "fixture resolved to nothing".into())
}

fn attributes(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_insert_at_indices() -> Result<(), Box<dyn std::error::Error>> {
    let mut root = fixture()?;
    let attrs = attributes(&[("q", "qqq"), ("r", "rrr"), ("s", "sss")]);

    insert_element(&mut root, 0, "p", "middle", attrs.clone()).ok_or("insert failed")?;
    insert_element(&mut root, 0, "p", "first", attrs.clone()).ok_or("insert failed")?;
    insert_element(&mut root, 2, "p", "last", attrs.clone()).ok_or("insert failed")?;

    let texts: Vec<_> = find_all(&root, "p").iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "middle", "last"]);
    assert!(find_all(&root, "p").iter().all(|p| p.attributes == attrs));
    assert_eq!(root.children.first().map(|p| p.text.as_str()), Some("first"));
    Ok(())
}

#[test]
fn test_insert_creates_path() -> Result<(), Box<dyn std::error::Error>> {
    let mut root = fixture()?;
    let attrs = attributes(&[("x", "xxx"), ("y", "yyy"), ("z", "zzz")]);

    let inserted = insert_element(&mut root, 0, "t/u/v", "www", attrs.clone())
        .cloned()
        .ok_or("insert failed")?;
    assert_eq!(inserted.tag, "v");
    assert_eq!(inserted.text, "www");
    assert_eq!(inserted.attributes, attrs);

    assert_eq!(find(&root, "t/u/v"), Some(&inserted));
    let t = find(&root, "t").ok_or("missing t")?;
    assert!(t.attributes.is_empty());
    assert_eq!(root.children.first().map(|t| t.tag.as_str()), Some("t"));
    Ok(())
}

#[test]
fn test_remove_matches_find_all() -> Result<(), Box<dyn std::error::Error>> {
    let base = fixture()?;
    for path in ["c", "k", "c/d", "c/g/h/i"] {
        let mut root = fixture()?;
        let expected: Vec<Element> = find_all(&base, path).into_iter().cloned().collect();
        let removed = remove_element(&mut root, path, false);
        assert_eq!(removed, expected, "mismatch for {path}");
        assert!(find(&root, path).is_none());
    }
    Ok(())
}

#[test]
fn test_remove_clear_empty() -> Result<(), Box<dyn std::error::Error>> {
    let mut root = fixture()?;
    let removed = remove_element(&mut root, "c/g/h/i", true);
    let tags: Vec<_> = removed.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["i", "h", "g"]);
    assert!(find(&root, "c/g").is_none());
    assert!(find(&root, "c").is_some());
    Ok(())
}

#[test]
fn test_remove_multiple_paths() -> Result<(), Box<dyn std::error::Error>> {
    let mut root = fixture()?;
    let paths = ["c/d", "c/e", "c/f", "c/g/h/i"];
    let removed = remove_elements(&mut root, paths, true);
    let tags: Vec<_> = removed.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["d", "e", "f", "i", "h", "g"]);
    for path in paths {
        assert!(find(&root, path).is_none(), "{path} still present");
    }
    // `c` keeps its own text and attributes
    assert!(find(&root, "c").is_some());
    Ok(())
}

#[test]
fn test_prune_twice_is_noop() -> Result<(), Box<dyn std::error::Error>> {
    let mut root = fixture()?;
    remove_element(&mut root, "c/g/h/i", false);
    let first = remove_empty_element(&mut root, "c/g", Some("h"));
    assert_eq!(first.len(), 2);
    assert!(remove_empty_element(&mut root, "c/g", Some("h")).is_empty());
    Ok(())
}

#[test]
fn test_text_accessors_over_fixture() -> Result<(), Box<dyn std::error::Error>> {
    let mut root = fixture()?;
    assert_eq!(get_element_text(&root, "c", ""), "c text");
    assert_eq!(get_elements_text(&root, "k"), vec!["k1", "k2", "k3"]);

    assert_eq!(set_elements_text(&mut root, "k", &["a", "b", "c", "d"]), 4);
    // The surplus value lands at its own index among the root's children
    assert_eq!(get_elements_text(&root, "k"), vec!["a", "d", "b", "c"]);
    Ok(())
}

#[test]
fn test_copy_into_new_tree() -> Result<(), Box<dyn std::error::Error>> {
    let from = fixture()?;
    let mut to = Element::new("copy");
    copy_element(&from, &mut to, "c/g").ok_or("copy failed")?;
    assert_eq!(find(&to, "c/g"), find(&from, "c/g"));

    let mut target = Element::new("x");
    set_element_attributes(&mut target, [("k", "v")]);
    assert_eq!(target.attributes.len(), 1);
    Ok(())
}
