use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use procveil_policy::{HiddenSet, Pid, PidSuccessor, VisibilityFilter};

struct DenseSpace {
    max: Pid,
}

impl PidSuccessor for DenseSpace {
    fn find_next(&self, cursor: Pid) -> Option<Pid> {
        (cursor <= self.max).then_some(cursor.max(1))
    }
}

fn bench_find_next_visible(c: &mut Criterion) {
    let hidden = Arc::new(HiddenSet::new());
    // Hide every third pid in a 64k space.
    for pid in (3..65536).step_by(3) {
        hidden.insert(pid).unwrap();
    }
    let filter = VisibilityFilter::new(hidden, Arc::new(DenseSpace { max: 65536 }));

    c.bench_function("find_next_visible_dense", |b| {
        b.iter(|| filter.find_next_visible(black_box(3)).unwrap())
    });

    c.bench_function("find_next_visible_miss", |b| {
        b.iter(|| filter.find_next_visible(black_box(70000)).unwrap())
    });
}

fn bench_membership(c: &mut Criterion) {
    let hidden = HiddenSet::new();
    for pid in 0..10_000 {
        hidden.insert(pid).unwrap();
    }
    c.bench_function("hidden_contains", |b| {
        b.iter(|| hidden.contains(black_box(5000)))
    });
}

criterion_group!(benches, bench_find_next_visible, bench_membership);
criterion_main!(benches);
