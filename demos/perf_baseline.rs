use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use markup_sanitizer::{clean_html, decode_path, escape, linebreaks, strip_tags, urlize};
use serde_json::json;

#[derive(Clone, Copy)]
struct RunConfig {
    warmup: usize,
    iterations: usize,
}

#[derive(Clone)]
struct Sample {
    name: &'static str,
    text: String,
    target_label: &'static str,
}

#[derive(Default, Clone)]
struct Stats {
    avg_ms: f64,
    p50_ms: f64,
    p95_ms: f64,
    p99_ms: f64,
    input_mb_per_s: f64,
}

type Transform = fn(&str) -> String;

const TRANSFORMS: &[(&str, Transform)] = &[
    ("escape", escape),
    ("strip_tags", strip_tags),
    ("linebreaks", linebreaks),
    ("clean_html", clean_html),
    ("urlize", urlize),
    ("decode_path", decode_as_path),
];

fn decode_as_path(text: &str) -> String {
    decode_path(text.as_bytes(), encoding_rs::UTF_8)
}

fn percentile_ms(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx]
}

fn summarize(durations_s: &[f64], input_bytes: usize) -> Stats {
    let mut ms: Vec<f64> = durations_s.iter().map(|d| d * 1000.0).collect();
    ms.sort_by(f64::total_cmp);
    let total_s: f64 = durations_s.iter().sum();
    let avg_ms = if durations_s.is_empty() {
        0.0
    } else {
        total_s * 1000.0 / durations_s.len() as f64
    };
    let input_mb_per_s = if total_s > 0.0 {
        (input_bytes as f64 * durations_s.len() as f64) / (1024.0 * 1024.0) / total_s
    } else {
        0.0
    };

    Stats {
        avg_ms,
        p50_ms: percentile_ms(&ms, 0.50),
        p95_ms: percentile_ms(&ms, 0.95),
        p99_ms: percentile_ms(&ms, 0.99),
        input_mb_per_s,
    }
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

fn build_samples() -> Vec<Sample> {
    let dir = fixtures_dir();
    let page = read_file(&dir.join("strip_tags1.html"));
    let malformed = read_file(&dir.join("strip_tags2.txt"));

    vec![
        Sample {
            name: "page",
            target_label: "~46KB",
            text: page,
        },
        Sample {
            name: "malformed",
            target_label: "~25KB",
            text: malformed,
        },
        Sample {
            name: "nested",
            target_label: "~40KB",
            text: format!("X{}{}X", "<".repeat(10_000), "br>".repeat(10_000)),
        },
        Sample {
            name: "dots",
            target_label: "~1MB",
            text: format!("a{}a", ".".repeat(1024 * 1024)),
        },
    ]
}

fn config_for(sample: &Sample) -> RunConfig {
    match sample.name {
        "dots" => RunConfig {
            warmup: 2,
            iterations: 20,
        },
        _ => RunConfig {
            warmup: 20,
            iterations: 200,
        },
    }
}

fn run(sample: &Sample, transform: Transform, cfg: RunConfig) -> Stats {
    let mut durations = Vec::with_capacity(cfg.iterations);
    for i in 0..cfg.warmup + cfg.iterations {
        let start = Instant::now();
        let out = transform(&sample.text);
        let elapsed = start.elapsed().as_secs_f64();
        std::hint::black_box(out);
        if i >= cfg.warmup {
            durations.push(elapsed);
        }
    }
    summarize(&durations, sample.text.len())
}

fn print_table(results: &[(&Sample, &str, Stats)]) {
    println!("# Transform Baseline (local)");
    println!();
    println!("| Sample | Transform | Avg ms | P50 ms | P95 ms | P99 ms | Input MB/s |");
    println!("|--------|-----------|--------|--------|--------|--------|------------|");
    for (sample, transform, stats) in results {
        println!(
            "| {} ({}) | {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.2} |",
            sample.name,
            sample.target_label,
            transform,
            stats.avg_ms,
            stats.p50_ms,
            stats.p95_ms,
            stats.p99_ms,
            stats.input_mb_per_s
        );
    }
    println!();
}

fn print_json(results: &[(&Sample, &str, Stats)]) {
    let rows: Vec<_> = results
        .iter()
        .map(|(sample, transform, stats)| {
            json!({
                "sample": sample.name,
                "input_bytes": sample.text.len(),
                "transform": transform,
                "avg_ms": stats.avg_ms,
                "p50_ms": stats.p50_ms,
                "p95_ms": stats.p95_ms,
                "p99_ms": stats.p99_ms,
                "input_mb_per_s": stats.input_mb_per_s,
            })
        })
        .collect();
    println!("{}", json!({ "results": rows }));
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let as_json = args.iter().any(|a| a == "--json");
    let only = args
        .windows(2)
        .find(|pair| pair[0] == "--single")
        .map(|pair| pair[1].clone());

    let samples: Vec<Sample> = build_samples()
        .into_iter()
        .filter(|s| only.as_deref().is_none_or(|name| s.name == name))
        .collect();
    if samples.is_empty() {
        eprintln!("unknown sample: {}", only.unwrap_or_default());
        std::process::exit(2);
    }

    let mut results = Vec::new();
    for sample in &samples {
        let cfg = config_for(sample);
        for (name, transform) in TRANSFORMS {
            results.push((sample, *name, run(sample, *transform, cfg)));
        }
    }

    if as_json {
        print_json(&results);
    } else {
        print_table(&results);
    }
}
