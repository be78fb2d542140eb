#![no_main]

use libfuzzer_sys::fuzz_target;
use markup_sanitizer::{escape, strip_tags};

fuzz_target!(|data: &str| {
    let stripped = strip_tags(data);
    assert!(stripped.len() <= data.len());
    assert!(!escape(&stripped).contains('<'));
});
