//! Benchmarks for column type inference
//!
//! Run with: cargo bench -p sheetsync-core

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::json;
use sheetsync_core::inference::{
    Row, TemporalKind, classify_str, detect_temporal, normalize_temporal, resolve_column_types,
    sanitize_rows,
};

/// Generate sheet-like rows with mixed cell shapes
fn generate_sample_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let value = json!({
                "Order #": (i + 1).to_string(),
                "Customer": format!("Customer {}", i % 37),
                "Amount": format!("{:.2}", 10.0 + i as f64 * 0.75),
                "Placed": format!("{:02}/{:02}/2024", (i % 28) + 1, (i % 12) + 1),
                "Shipped At": format!("2024-03-{:02} 08:{:02}:00", (i % 28) + 1, i % 60),
                "Notes": if i % 5 == 0 { String::new() } else { format!("note {i}") },
            });
            match value {
                serde_json::Value::Object(row) => row,
                _ => unreachable!(),
            }
        })
        .collect()
}

/// Benchmark single-value classification
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let test_cases = vec![
        ("integer", "12345"),
        ("float", "3.14159"),
        ("iso_date", "2024-01-15"),
        ("iso_timestamp", "2024-01-15T10:30:00Z"),
        ("slash_date", "15/01/2024"),
        ("slash_datetime", "01/15/2024 10:30"),
        ("text", "hello world"),
    ];

    for (name, value) in test_cases {
        group.bench_with_input(BenchmarkId::new("classify_str", name), &value, |b, value| {
            b.iter(|| black_box(classify_str(value)));
        });
    }

    group.finish();
}

/// Benchmark temporal detection and normalization
fn bench_temporal(c: &mut Criterion) {
    let mut group = c.benchmark_group("temporal");

    group.bench_function("detect_fallback_pattern", |b| {
        b.iter(|| black_box(detect_temporal("12/31/2024 23:59")));
    });

    group.bench_function("normalize_slash_date", |b| {
        b.iter(|| black_box(normalize_temporal("31/12/2024", TemporalKind::Date)));
    });

    group.finish();
}

/// Benchmark column type resolution with varying row counts
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_column_types");

    for count in [10, 100, 1000].iter() {
        let rows = generate_sample_rows(*count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::new("resolve", count), &rows, |b, rows| {
            b.iter(|| black_box(resolve_column_types(rows)));
        });

        group.bench_with_input(BenchmarkId::new("sanitize", count), &rows, |b, rows| {
            b.iter(|| black_box(sanitize_rows(rows)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_temporal, bench_resolve);
criterion_main!(benches);
