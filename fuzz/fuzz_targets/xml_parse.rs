#![no_main]
use libfuzzer_sys::fuzz_target;
use ztree::{element_to_object, element_to_record, from_xml_bytes, record_to_element, to_xml_string};

fuzz_target!(|data: &[u8]| {
    if let Ok(root) = from_xml_bytes(data) {
        let _ = element_to_object(&root);
        assert_eq!(record_to_element(&element_to_record(&root)).ok(), Some(root.clone()));
        let _ = to_xml_string(&root);
    }
});
