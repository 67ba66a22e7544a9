#![no_main]
use libfuzzer_sys::fuzz_target;
use ztree::{resolve, strip_namespaces};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let stripped = strip_namespaces(s);
        let _ = resolve(stripped);
    }
});
