// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for reveal candidate selection, hover resolution and full frames.
//!
//! The page is a deterministic grid of cards, each with one nested child, so
//! hover resolution walks a short ancestor chain and candidate ordering sees
//! two depths.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Size};
use understory_reveal::{
    Document, MemoryDocument, NodeId, RecordingFactory, Registry, Session, SessionOptions,
    resolve_hover, select_candidates,
};

struct Page {
    doc: MemoryDocument,
    targets: Vec<NodeId>,
    leaves: Vec<NodeId>,
}

/// `cards` cards of 48×32 on a 56×40 pitch, 16 per row, each with an unregistered label.
fn build_page(cards: u32) -> Page {
    let rows = cards.div_ceil(16);
    let mut doc = MemoryDocument::new(Size::new(16.0 * 56.0, f64::from(rows) * 40.0));
    let root = doc.root();
    let mut targets = Vec::new();
    let mut leaves = Vec::new();
    for i in 0..cards {
        let x = f64::from(i % 16) * 56.0;
        let y = f64::from(i / 16) * 40.0;
        let card = doc.insert(root, Rect::new(x, y, x + 48.0, y + 32.0));
        let label = doc.insert(card, Rect::new(x + 4.0, y + 4.0, x + 44.0, y + 16.0));
        targets.push(card);
        leaves.push(label);
    }
    Page {
        doc,
        targets,
        leaves,
    }
}

fn registry_for(page: &mut Page) -> Registry<NodeId> {
    let mut registry = Registry::new();
    for &target in &page.targets {
        registry.register(&mut page.doc, target, None);
    }
    registry
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("reveal/select_candidates");
    for cards in [128_u32, 512] {
        let mut page = build_page(cards);
        let registry = registry_for(&mut page);
        let cursor = Point::new(300.0, 100.0);
        for radius in [60.0, 240.0] {
            group.bench_with_input(
                BenchmarkId::new(format!("r{radius}"), cards),
                &radius,
                |b, &radius| {
                    b.iter(|| black_box(select_candidates(&registry, &page.doc, cursor, radius)));
                },
            );
        }
    }
    group.finish();
}

fn bench_hover(c: &mut Criterion) {
    let mut group = c.benchmark_group("reveal/resolve_hover");
    for cards in [128_u32, 512] {
        let mut page = build_page(cards);
        let registry = registry_for(&mut page);
        let leaf = page.leaves[page.leaves.len() / 2];
        group.bench_function(BenchmarkId::new("from_label", cards), |b| {
            b.iter(|| black_box(resolve_hover(&registry, &page.doc, Some(leaf))));
        });
    }
    group.finish();
}

fn bench_pointer_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("reveal/pointer_move");
    for cards in [128_u32, 512] {
        let mut page = build_page(cards);
        let mut session = Session::new(RecordingFactory::new(), SessionOptions::default());
        let targets: Vec<_> = page.targets.iter().map(|&t| (t, None)).collect();
        if session.register_targets(&mut page.doc, targets).is_err() {
            continue;
        }
        let leaf = page.leaves[0];
        let mut step = 0_u32;
        group.bench_function(BenchmarkId::from_parameter(cards), |b| {
            b.iter(|| {
                step = (step + 1) % 40;
                let point = Point::new(8.0 + f64::from(step), 8.0);
                // Keep the recorded op log from growing across iterations.
                if let Some(layers) = session.layers_mut() {
                    layers.hover.reset_log();
                    layers.border.reset_log();
                }
                black_box(session.pointer_move(&page.doc, Some(leaf), point))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_select, bench_hover, bench_pointer_move);
criterion_main!(benches);
