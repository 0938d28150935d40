// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sweep the cursor across a small page and write each frame as a PNG.
//!
//! Run with:
//! - `cargo run -p understory_reveal_demos --example reveal_basics`
//!
//! Set `RUST_LOG=understory_reveal=trace` to see per-frame summaries.

use kurbo::{Point, Size, Vec2};
use peniko::Color;
use understory_reveal::{
    BorderPlacement, MemoryDocument, NodeId, RevealEffect, Session, SessionOptions, TargetConfig,
};
use understory_reveal_demos::{DemoPage, composite_over, init_logging, write_png};
use understory_reveal_vello_cpu::VelloCpuFactory;

const BACKGROUND: [u8; 3] = [24, 26, 32];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut doc = MemoryDocument::new(Size::new(640.0, 480.0));
    let page = DemoPage::build(&mut doc);

    let mut session = Session::new(VelloCpuFactory::default(), SessionOptions::default());
    session.set_global_config(
        &doc,
        &TargetConfig::new()
            .with_hover_radius(90.0)
            .with_hover_color(Color::from_rgba8(140, 190, 255, 64)),
    )?;
    session.register_targets(&mut doc, page.cards.iter().map(|&card| (card, None)))?;
    session.register_target(
        &mut doc,
        page.accent,
        Some(
            TargetConfig::new()
                .with_border_placement(BorderPlacement::Outside)
                .with_hover_radius(140.0),
        ),
    )?;
    let border_only = TargetConfig::new().with_effect(RevealEffect::Border);
    session.register_targets(
        &mut doc,
        page.items.iter().map(|&item| (item, Some(border_only.clone()))),
    )?;
    session.mark_occluder(&doc, page.scroller);

    let sweep = [
        Point::new(60.0, 60.0),
        Point::new(150.0, 70.0),
        Point::new(152.0, 130.0),
        Point::new(200.0, 360.0),
        Point::new(520.0, 120.0),
        Point::new(600.0, 420.0),
    ];
    let mut frame = 0;
    for point in sweep {
        let raw = page.hit(&doc, point);
        if let Some(summary) = session.pointer_move(&doc, raw, point) {
            tracing::info!(frame, ?point, ?summary, "pointer moved");
        }
        save(&mut session, frame)?;
        frame += 1;
    }

    doc.scroll_by(Vec2::new(0.0, 48.0));
    session.scroll(&doc);
    save(&mut session, frame)?;
    frame += 1;

    // Removing the accent card fires the root watcher, which evicts it.
    doc.remove(page.accent);
    for subscription in doc.take_notifications() {
        session.handle_mutation(&mut doc, subscription);
    }
    tracing::info!(targets = session.registry().len(), "after removing the accent card");
    save(&mut session, frame)?;

    session.destroy(&mut doc);
    Ok(())
}

fn save(
    session: &mut Session<NodeId, VelloCpuFactory>,
    frame: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(layers) = session.layers_mut() else {
        return Ok(());
    };
    let (width, height) = (layers.border.width(), layers.border.height());
    let border = layers.border.render();
    let hover = layers.hover.render();
    let pixels = composite_over(BACKGROUND, &[&border, &hover]);
    write_png(format!("reveal_basics_{frame}.png"), width, height, &pixels)
}
