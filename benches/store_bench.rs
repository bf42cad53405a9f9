use criterion::{Criterion, criterion_group, criterion_main};
use fieldstore::FieldStore;
use fieldstore::types::{TYPE_ANY, TYPE_INT32, TYPE_STRING};
use std::hint::black_box;

// ─── Test Data ──────────────────────────────────────────────────────────────

/// A body shaped like a realistic message: a handful of scalar fields, a
/// couple of strings, and one multi-item list.
fn make_bench_store() -> FieldStore {
    let mut store = FieldStore::new();
    store.add_str("id", "user:abc123").unwrap();
    store.add_str("name", "Alice").unwrap();
    store.add_str("email", "alice@example.com").unwrap();
    store.add_i32("age", 28).unwrap();
    store.add_i64("created_at", 1_705_315_800).unwrap();
    store.add_f64("score", 99.5).unwrap();
    store.add_bool("active", true).unwrap();
    for tag in ["developer", "rust", "database"] {
        store.add_str("tags", tag).unwrap();
    }
    for i in 0..16 {
        store.add_i32("history", i).unwrap();
    }
    store
}

// ─── Benchmarks ─────────────────────────────────────────────────────────────

fn bench_populate(c: &mut Criterion) {
    c.bench_function("populate", |b| {
        b.iter(|| black_box(make_bench_store()));
    });
}

fn bench_find_data(c: &mut Criterion) {
    let store = make_bench_store();
    c.bench_function("find_data", |b| {
        b.iter(|| {
            black_box(store.find_data(black_box("email"), TYPE_STRING, 0).unwrap());
            black_box(store.find_i32(black_box("age"), 0).unwrap());
            black_box(store.find_i32(black_box("history"), 7).unwrap());
        });
    });
}

fn bench_replace_in_place(c: &mut Criterion) {
    let mut store = make_bench_store();
    c.bench_function("replace_i32", |b| {
        let mut n = 0;
        b.iter(|| {
            store.replace_i32("age", 0, black_box(n)).unwrap();
            n = n.wrapping_add(1);
        });
    });
}

fn bench_enumerate(c: &mut Criterion) {
    let store = make_bench_store();
    c.bench_function("info_at_scan", |b| {
        b.iter(|| {
            for i in 0..store.count_names(TYPE_ANY) {
                black_box(store.info_at(TYPE_ANY, i).unwrap());
            }
        });
    });
}

fn bench_flatten(c: &mut Criterion) {
    let store = make_bench_store();
    let mut buf = Vec::with_capacity(store.flattened_size());
    c.bench_function("flatten", |b| {
        b.iter(|| {
            buf.clear();
            store.flatten(&mut buf).unwrap();
            black_box(buf.len());
        });
    });

    c.bench_function("flattened_size_cold", |b| {
        b.iter(|| {
            // Cloning resets the memo, so every call pays the full walk.
            let fresh = store.clone();
            black_box(fresh.flattened_size());
        });
    });
}

fn bench_unflatten(c: &mut Criterion) {
    let store = make_bench_store();
    let mut bytes = Vec::new();
    store.flatten(&mut bytes).unwrap();

    c.bench_function("unflatten", |b| {
        let mut target = FieldStore::new();
        b.iter(|| {
            target.unflatten(&mut black_box(&bytes[..])).unwrap();
            black_box(target.count_names(TYPE_INT32));
        });
    });
}

criterion_group!(
    benches,
    bench_populate,
    bench_find_data,
    bench_replace_in_place,
    bench_enumerate,
    bench_flatten,
    bench_unflatten
);
criterion_main!(benches);
