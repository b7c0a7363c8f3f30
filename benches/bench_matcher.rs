//! Micro benchmarks for the allow-list decision.
//! Pure CPU - no network, no IO.
//!
//! ```bash
//! cargo bench --bench bench_matcher
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ipgate_lib::security::check_access;
use ipgate_lib::matches;
use std::hint::black_box;

fn bench_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("matches");

    let cases = [
        ("exact_v4", "10.0.0.5", "10.0.0.5"),
        ("cidr_v4", "10.0.0.0/24", "10.0.0.200"),
        ("cidr_v6", "2001:db8::/32", "2001:db8:1234::1"),
        ("mapped", "10.0.0.0/24", "::ffff:10.0.0.7"),
        ("malformed_reference", "not-an-address", "10.0.0.5"),
    ];

    for (name, reference, candidate) in cases {
        group.bench_function(name, |b| {
            b.iter(|| matches(black_box(reference), black_box(candidate)))
        });
    }

    group.finish();
}

fn bench_check_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_access");

    for size in [1usize, 16, 256] {
        // The matching entry is last so every entry is visited
        let mut allowlist: Vec<String> = (0..size.saturating_sub(1))
            .map(|i| format!("10.{}.{}.0/24", (i / 256) % 256, i % 256))
            .collect();
        allowlist.push("192.168.1.0/24".to_string());

        group.bench_with_input(BenchmarkId::new("last_entry_matches", size), &allowlist, |b, list| {
            b.iter(|| check_access(black_box(list), black_box("192.168.1.77:51342")))
        });
        group.bench_with_input(BenchmarkId::new("no_match", size), &allowlist, |b, list| {
            b.iter(|| check_access(black_box(list), black_box("172.16.0.1:51342")))
        });
    }

    group.finish();
}

criterion_group!(matcher_benches, bench_matches, bench_check_access);
criterion_main!(matcher_benches);
