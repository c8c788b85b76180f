//! Benchmarks for markup conversion.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use skiff_markdown::Converter;

/// Generate a post with the given number of sections.
fn generate_post(sections: usize, paragraphs_per_section: usize) -> String {
    let mut text = String::with_capacity(sections * (100 + paragraphs_per_section * 200));
    text.push_str("Post Title\n==========\n\n");

    for i in 0..sections {
        text.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            text.push_str(&format!(
                "Paragraph {j} of section {i} has **bold**, *italic* and `code` in it, \
                 plus a [link][ref{i}].\n\n"
            ));
        }
        text.push_str("* first item\n* second item\n\n");
        text.push_str("    let x = 42;\n    println!(\"{x}\");\n\n");
        text.push_str(&format!("[ref{i}]: http://example.com/{i} \"Ref {i}\"\n\n"));
    }
    text
}

fn bench_convert_simple(c: &mut Criterion) {
    let converter = Converter::new();

    c.bench_function("convert_simple", |b| {
        b.iter(|| converter.convert("# Hello\n\nSimple *content*."));
    });
}

fn bench_convert_html_blocks(c: &mut Criterion) {
    let converter = Converter::new();
    let text = "Intro\n\n<div class=\"note\">\n<p>Raw *html*</p>\n</div>\n\n\
                <table>\n<tr><td>1</td></tr>\n</table>\n\n<!-- comment -->\n\nOutro\n";

    c.bench_function("convert_html_blocks", |b| {
        b.iter(|| converter.convert(text));
    });
}

fn bench_convert_nested(c: &mut Criterion) {
    let converter = Converter::new();
    let text = "> quote\n>\n> * item one\n>   continued\n> * item two\n>\n> > nested quote\n";

    c.bench_function("convert_nested_blocks", |b| {
        b.iter(|| converter.convert(text));
    });
}

fn bench_convert_varying_sizes(c: &mut Criterion) {
    let converter = Converter::new();
    let mut group = c.benchmark_group("convert_by_size");

    for (sections, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let text = generate_post(sections, paragraphs);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("post", format!("{sections}s_{paragraphs}p")),
            &text,
            |b, text| b.iter(|| converter.convert(text)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_convert_simple,
    bench_convert_html_blocks,
    bench_convert_nested,
    bench_convert_varying_sizes,
);

criterion_main!(benches);
