//! Notification benchmarks
//!
//! Measures the cost of one property write fanning out to bound subscribers,
//! and of compiling a template into bindings.
//!
//! Run with: cargo bench --bench notify

use std::hint::black_box;
use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use trellis_core::reactive::{Path, ReactiveContext, ReactiveObject, Subscriber, Value};
use trellis_core::{Document, Engine, ViewModel};

fn bench_write_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_fan_out");
    for fan_out in [1usize, 16, 256] {
        let ctx = Rc::new(ReactiveContext::default());
        let root = ReactiveObject::from_json(&json!({ "user": { "name": "a" } }));
        let subscribers: Vec<_> = (0..fan_out)
            .map(|_| {
                Subscriber::new(
                    Rc::clone(&ctx),
                    root.clone(),
                    Path::parse("user.name").unwrap(),
                    |value, _| {
                        black_box(value);
                        Ok(())
                    },
                )
                .unwrap()
            })
            .collect();
        let user = root.get("user").unwrap();
        let user = user.as_object().unwrap().clone();

        group.bench_with_input(BenchmarkId::from_parameter(fan_out), &fan_out, |b, _| {
            let mut n = 0i32;
            b.iter(|| {
                n += 1;
                user.set("name", Value::from(n)).unwrap()
            });
        });
        drop(subscribers);
    }
    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let items: Vec<_> = (0..64)
        .map(|i| json!({ "tag": "li", "attrs": { "v-text": format!("items.{i}") } }))
        .collect();
    let template = json!({ "tag": "ul", "attrs": { "id": "app" }, "children": items }).to_string();
    let data = json!({ "items": (0..64).map(|i| format!("item {i}")).collect::<Vec<_>>() });

    c.bench_function("compile_64_bindings", |b| {
        b.iter(|| {
            let doc = Document::from_json(&template).unwrap();
            let engine = Engine::new(&doc, "#app", ViewModel::from_json(&data)).unwrap();
            black_box(engine.binding_count())
        });
    });
}

criterion_group!(benches, bench_write_fan_out, bench_compile);
criterion_main!(benches);
