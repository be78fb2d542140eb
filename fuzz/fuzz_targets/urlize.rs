#![no_main]

use libfuzzer_sys::fuzz_target;
use markup_sanitizer::{UrlizeOptions, urlize, urlize_with};

fuzz_target!(|data: &str| {
    let plain = urlize(data);
    if !plain.contains("<a ") {
        assert_eq!(plain, data);
    }

    let options = UrlizeOptions {
        trim_url_limit: Some(12),
        nofollow: true,
        autoescape: true,
    };
    let _ = urlize_with(data, &options);
});
