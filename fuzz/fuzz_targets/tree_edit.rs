#![no_main]
use libfuzzer_sys::fuzz_target;
use ztree::{from_xml_str, insert_element, remove_element, remove_empty_element, Attributes};

fuzz_target!(|input: (&str, &str, u8)| {
    let (markup, path, index) = input;
    if let Ok(mut root) = from_xml_str(markup) {
        let _ = insert_element(&mut root, usize::from(index), path, "", Attributes::new());
        let _ = remove_element(&mut root, path, true);
        let _ = remove_empty_element(&mut root, path, None);
    }
});
