use criterion::{black_box, criterion_group, criterion_main, Criterion};

use procveil_protocol::{parse_command, render_roster};

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_add", |b| {
        b.iter(|| parse_command(black_box("add 123456\n")))
    });

    c.bench_function("parse_unknown", |b| {
        b.iter(|| parse_command(black_box("frobnicate 1")))
    });
}

fn bench_render(c: &mut Criterion) {
    let pids: Vec<i32> = (1..=1000).map(|n| n * 3).collect();
    c.bench_function("render_roster_1000", |b| {
        b.iter(|| render_roster(black_box(&pids)))
    });
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
