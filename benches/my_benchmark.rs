use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;
use tabula::{Database, EngineConfig, QuerySpec};

fn users_columns() -> serde_json::Value {
    json!([
        { "name": "id", "type": "integer", "size": 10 },
        { "name": "name", "type": "text", "size": 32 },
        { "name": "age", "type": "integer", "size": 3 },
        { "name": "active", "type": "boolean", "size": 5 },
    ])
}

fn setup_populated_db(n: usize) -> Database {
    let mut db = Database::new(EngineConfig::default()).unwrap();
    db.create_table("users", &users_columns()).unwrap();

    let table = db.get_table_mut("users").unwrap();
    for i in 0..n {
        table
            .insert(json!([i, format!("user{}", i), i % 100, i % 2 == 0]))
            .unwrap();
    }
    db
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert");
    group.bench_function("insert_positional", |b| {
        let mut db = Database::new(EngineConfig::default()).unwrap();
        db.create_table("users", &users_columns()).unwrap();
        b.iter(|| {
            db.insert("users", black_box(json!([42, "alice", 30, true])))
                .unwrap();
        });
    });
    group.bench_function("insert_keyed", |b| {
        let mut db = Database::new(EngineConfig::default()).unwrap();
        db.create_table("users", &users_columns()).unwrap();
        b.iter(|| {
            db.insert(
                "users",
                black_box(json!({ "id": "42", "name": "alice", "active": "false" })),
            )
            .unwrap();
        });
    });
    group.finish();
}

fn bench_filter_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filter_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let db = setup_populated_db(n);
            let spec = QuerySpec::new().filter(["age==42"]);
            b.iter(|| {
                let res = db.get("users", black_box(&spec)).unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_sorted_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sorted_Scan_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let db = setup_populated_db(n);
            let spec = QuerySpec::new()
                .keys(["name", "age"])
                .filter(["active==true", "OR", "age>90"])
                .order(["age:DESC", "name"]);
            b.iter(|| {
                let res = db.get("users", black_box(&spec)).unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_filter_scaling, bench_sorted_scan);
criterion_main!(benches);
