//! Basic sanitizing example walking through each text transform

use markup_sanitizer::handler::{Handler, HandlerSettings, MiddlewareRegistry};
use markup_sanitizer::{
    UrlizeOptions, clean_html, escape, escapejs, fix_ampersands, linebreaks, strip_tags,
    urlize_with,
};

fn main() {
    println!("=== Markup Sanitizer - Basic Examples ===\n");

    show("escape", "<b>\"Tom\" & 'Jerry'</b>", escape);
    show("escapejs", "</script><script>alert('x')</script>", escapejs);
    show("fix_ampersands", "Fish & Chips &amp; &#;", fix_ampersands);
    show("strip_tags", "<p>Hello <b>World</b></p> X<<<<br>br>br>br>X", strip_tags);
    show("linebreaks", "first line\nsecond line\n\nnew paragraph", linebreaks);
    show(
        "clean_html",
        "<p>* one</p><p>* two</p><br clear=\"all\"><p>&nbsp;</p>",
        clean_html,
    );

    let options = UrlizeOptions {
        trim_url_limit: Some(20),
        nofollow: true,
        autoescape: true,
    };
    show(
        "urlize",
        "Docs at https://www.djangoproject.com/documentation/ or mail <help@example.org>",
        |text| urlize_with(text, &options),
    );

    println!("Request handling:");
    let handler = Handler::new(HandlerSettings::default(), MiddlewareRegistry::new());
    let paths: [&[u8]; 3] = [b"/", b"/~%A9helloworld", b"\xED"];
    for raw in paths {
        match handler.call(raw) {
            Ok(response) => println!(
                "  {:<20} -> {} {}",
                String::from_utf8_lossy(raw),
                response.status,
                response.request_path.unwrap_or_default()
            ),
            Err(err) => println!("  {:<20} -> error {}: {err}", String::from_utf8_lossy(raw), err.code()),
        }
    }
}

fn show(name: &str, input: &str, transform: impl Fn(&str) -> String) {
    println!("{name}:");
    println!("  in:  {input}");
    println!("  out: {}", transform(input));
    println!("---\n");
}
