#![no_main]

use libfuzzer_sys::fuzz_target;
use markup_sanitizer::{decode_path, escape_uri_path, try_decode_path};

fuzz_target!(|data: &[u8]| {
    for encoding in [encoding_rs::UTF_8, encoding_rs::SHIFT_JIS, encoding_rs::WINDOWS_1252] {
        let decoded = decode_path(data, encoding);
        if let Ok(strict) = try_decode_path(data, encoding) {
            assert_eq!(strict, decoded);
        }
        assert!(escape_uri_path(&decoded).is_ascii());
    }
});
