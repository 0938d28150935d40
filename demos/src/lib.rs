// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the reveal demos.
//!
//! The demos run headless: the page is a [`MemoryDocument`], layers are
//! rasterized with `vello_cpu`, and frames are written as PNG files.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use kurbo::{Point, Rect};
use png::{BitDepth, ColorType, Encoder};
use tracing_subscriber::filter::EnvFilter;
use understory_reveal::{Document, MemoryDocument, NodeId};
use vello_cpu::Pixmap;

/// Install a `tracing` subscriber on stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// A small page: a grid of cards, one rounded accent card, and a clipped
/// scroller with items that overflow it.
#[derive(Clone, Debug)]
pub struct DemoPage {
    /// Grid cards.
    pub cards: Vec<NodeId>,
    /// A card with rounded corners and a thick computed border.
    pub accent: NodeId,
    /// A container that clips its children.
    pub scroller: NodeId,
    /// Children of the scroller, partly outside it.
    pub items: Vec<NodeId>,
}

impl DemoPage {
    /// Lay the page out in `doc`.
    pub fn build(doc: &mut MemoryDocument) -> Self {
        let root = doc.root();
        let mut cards = Vec::new();
        for row in 0..2_u8 {
            for col in 0..3_u8 {
                let x = 24.0 + f64::from(col) * 136.0;
                let y = 24.0 + f64::from(row) * 112.0;
                cards.push(doc.insert(root, Rect::new(x, y, x + 120.0, y + 96.0)));
            }
        }
        let accent = doc.insert(root, Rect::new(24.0, 272.0, 392.0, 456.0));
        doc.set_border(
            accent,
            understory_reveal::BorderStyle {
                width: 3.0,
                radii: kurbo::RoundedRectRadii::new(24.0, 24.0, 8.0, 8.0),
            },
        );
        let scroller = doc.insert(root, Rect::new(432.0, 24.0, 616.0, 456.0));
        let items = (0..5_u8)
            .map(|i| {
                let y = 40.0 + f64::from(i) * 96.0;
                doc.insert(scroller, Rect::new(448.0, y, 640.0, y + 80.0))
            })
            .collect();
        Self {
            cards,
            accent,
            scroller,
            items,
        }
    }

    /// Every node of the page.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.cards
            .iter()
            .copied()
            .chain([self.accent, self.scroller])
            .chain(self.items.iter().copied())
    }

    /// The deepest attached page node under `point`, like a browser event target.
    pub fn hit(&self, doc: &MemoryDocument, point: Point) -> Option<NodeId> {
        self.nodes()
            .filter(|&n| doc.is_attached(n))
            .filter(|&n| doc.bounding_rect(n).is_some_and(|r| r.contains(point)))
            .max_by_key(|&n| doc.depth(n))
            .or(Some(doc.root()))
    }
}

/// Composite premultiplied `layers` (bottom first) over an opaque `background`.
///
/// Returns straight RGBA8 pixels.
pub fn composite_over(background: [u8; 3], layers: &[&Pixmap]) -> Vec<u8> {
    let Some(first) = layers.first() else {
        return Vec::new();
    };
    let len = first.data().len();
    let mut out = Vec::with_capacity(len * 4);
    for idx in 0..len {
        let mut px = [background[0], background[1], background[2]];
        for layer in layers {
            let Some(src) = layer.data().get(idx) else {
                continue;
            };
            let inv = u16::from(255 - src.a);
            for (dst, s) in px.iter_mut().zip([src.r, src.g, src.b]) {
                let v = u16::from(s) + u16::from(*dst) * inv / 255;
                *dst = u8::try_from(v).unwrap_or(u8::MAX);
            }
        }
        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    out
}

/// Write straight RGBA8 `data` as a PNG file.
pub fn write_png(
    path: impl AsRef<Path>,
    width: u16,
    height: u16,
    data: &[u8],
) -> Result<(), Box<dyn Error>> {
    let file = BufWriter::new(File::create(path.as_ref())?);
    let mut encoder = Encoder::new(file, u32::from(width), u32::from(height));
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;
    tracing::info!(path = %path.as_ref().display(), "wrote frame");
    Ok(())
}
