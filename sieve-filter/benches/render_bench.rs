//! Benchmarks for filter parsing and SQL rendering.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sieve_filter::{FilterArgument, FilterMap, FilterParser, SqlRenderer, filter_map};

/// Create an `or` over `count` equality comparisons.
fn create_or_filter(count: usize) -> FilterMap {
    let children: Vec<FilterArgument> = (0..count)
        .map(|i| {
            filter_map! {
                format!("field_{}", i) => filter_map! { "equals" => format!("value_{}", i) },
            }
            .into()
        })
        .collect();
    filter_map! { "or" => children }
}

/// Create a filter nested `depth` levels deep with alternating `and`/`not`.
fn create_nested_filter(depth: usize) -> FilterMap {
    let mut filter = filter_map! { "leaf" => filter_map! { "gte" => 1 } };
    for level in 0..depth {
        filter = if level % 2 == 0 {
            filter_map! {
                "and" => vec![
                    FilterArgument::from(filter),
                    filter_map! { format!("f{}", level) => filter_map! { "contains" => "x'y" } }.into(),
                ],
            }
        } else {
            filter_map! { "not" => filter }
        };
    }
    filter
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let parser = FilterParser::new();

    for count in [1usize, 10, 100] {
        let filter = create_or_filter(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("or", count), &filter, |b, filter| {
            b.iter(|| parser.parse(black_box(filter)))
        });
    }

    let nested = create_nested_filter(16);
    group.bench_function("nested_16", |b| b.iter(|| parser.parse(black_box(&nested))));

    let json = r#"{"and": [{"firstName": {"contains": "Saurabh"}}, {"age": {"between": [32, 40]}}]}"#;
    group.bench_function("from_json", |b| {
        b.iter(|| {
            let filter = FilterArgument::map_from_json(black_box(json))?;
            parser.parse(&filter)
        })
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let parser = FilterParser::new();
    let renderer = SqlRenderer::new().rename_field("field_0", "col_0");

    for count in [1usize, 10, 100] {
        let Ok(Some(tree)) = parser.parse(&create_or_filter(count)) else {
            continue;
        };
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("or", count), &tree, |b, tree| {
            b.iter(|| renderer.render(black_box(tree)))
        });
    }

    if let Ok(Some(tree)) = parser.parse(&create_nested_filter(16)) {
        group.bench_function("nested_16", |b| b.iter(|| renderer.render(black_box(&tree))));
    }

    let in_filter = filter_map! {
        "lastName" => filter_map! { "in" => (0..50).map(|i| format!("O'Name{}", i)).collect::<Vec<_>>() },
    };
    if let Ok(Some(tree)) = parser.parse(&in_filter) {
        group.bench_function("in_50_escaped", |b| b.iter(|| renderer.render(black_box(&tree))));
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
