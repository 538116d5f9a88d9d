//! Layout solving benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fluent_core::{Attribute, Color, ConstraintDescriptor, ElementId, Item, Rect, Relation, Scene};
use fluent_layout::LayoutEngine;

/// A container with `count` boxes laid out left to right, 10 apart.
fn row_of_boxes(count: usize) -> (Scene, ElementId, Vec<ConstraintDescriptor>) {
    let mut scene = Scene::new();
    let container = scene.insert(Color::WHITE, Rect::new(0, 2000, 0, 100));

    let mut descriptors = Vec::new();
    let mut previous = container;
    for i in 0..count {
        let id = scene.insert(Color::BLUE, Rect::default());
        let anchor = if i == 0 { Attribute::Left } else { Attribute::Right };
        descriptors.push(ConstraintDescriptor::relative(
            Item::new(id, Attribute::Left),
            Relation::Equal,
            Item::new(previous, anchor),
            1.0,
            10.0,
        ));
        descriptors.push(ConstraintDescriptor::constant(
            Item::new(id, Attribute::Width),
            Relation::Equal,
            40.0,
        ));
        descriptors.push(ConstraintDescriptor::relative(
            Item::new(id, Attribute::Top),
            Relation::Equal,
            Item::new(container, Attribute::Top),
            1.0,
            10.0,
        ));
        descriptors.push(ConstraintDescriptor::relative(
            Item::new(id, Attribute::Bottom),
            Relation::LessOrEqual,
            Item::new(container, Attribute::Bottom),
            1.0,
            -10.0,
        ));
        previous = id;
    }
    (scene, container, descriptors)
}

fn solve_small_row(c: &mut Criterion) {
    let (scene, container, descriptors) = row_of_boxes(5);
    c.bench_function("solve_small_row", |b| {
        b.iter(|| {
            let mut scene = scene.clone();
            let mut engine = LayoutEngine::new();
            engine.apply_constraints(&mut scene, container, black_box(&descriptors))
        })
    });
}

fn solve_large_row(c: &mut Criterion) {
    let (scene, container, descriptors) = row_of_boxes(40);
    c.bench_function("solve_large_row", |b| {
        b.iter(|| {
            let mut scene = scene.clone();
            let mut engine = LayoutEngine::new();
            engine.apply_constraints(&mut scene, container, black_box(&descriptors))
        })
    });
}

fn resolve_empty(c: &mut Criterion) {
    let (mut scene, container, descriptors) = row_of_boxes(40);
    let mut engine = LayoutEngine::new();
    engine
        .apply_constraints(&mut scene, container, &descriptors)
        .expect("setup layout solves");
    c.bench_function("resolve_empty", |b| {
        b.iter(|| engine.apply_constraints(&mut scene, container, black_box(&[])))
    });
}

criterion_group!(benches, solve_small_row, solve_large_row, resolve_empty);
criterion_main!(benches);
