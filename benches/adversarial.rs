use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use markup_sanitizer::{clean_html, decode_path, escape, strip_tags, urlize};
use std::hint::black_box;

fn bench_strip_tags(c: &mut Criterion) {
    let mut group = c.benchmark_group("strip_tags");
    let inputs = [
        ("page", include_str!("../tests/fixtures/strip_tags1.html").to_string()),
        ("malformed", include_str!("../tests/fixtures/strip_tags2.txt").to_string()),
        ("nested_openers", format!("X{}{}X", "<".repeat(10_000), "br>".repeat(10_000))),
        ("ampersands", format!("><!{}D", "&".repeat(16_000))),
    ];
    for (name, input) in &inputs {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| strip_tags(black_box(input)))
        });
    }
    group.finish();
}

fn bench_urlize(c: &mut Criterion) {
    let mut group = c.benchmark_group("urlize");
    let inputs = [
        ("emails", format!("a{}a", "@a".repeat(50_000))),
        ("dots", format!("a{}a", ".".repeat(100_000))),
        ("prose", "see www.example.com or mail me@example.org. ".repeat(500)),
    ];
    for (name, input) in &inputs {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| urlize(black_box(input)))
        });
    }
    group.finish();
}

fn bench_misc(c: &mut Criterion) {
    let html = include_str!("../tests/fixtures/strip_tags1.html");
    c.bench_function("clean_html/page", |b| b.iter(|| clean_html(black_box(html))));
    c.bench_function("escape/page", |b| b.iter(|| escape(black_box(html))));

    let path: Vec<u8> = b"/\xED\xA0".repeat(2_000);
    c.bench_function("decode_path/invalid_utf8", |b| {
        b.iter(|| decode_path(black_box(&path), encoding_rs::UTF_8))
    });
}

criterion_group!(benches, bench_strip_tags, bench_urlize, bench_misc);
criterion_main!(benches);
