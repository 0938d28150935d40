// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Candidate selection: targets near enough to the cursor to get a border.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::geometry::{influence_square, rects_overlap};
use crate::host::Document;
use crate::registry::Registry;

/// A target whose box overlaps the cursor's influence square.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate<E> {
    /// The target element.
    pub element: E,
    /// Its bounding box at selection time.
    pub rect: Rect,
    /// Containment depth in the document.
    pub depth: usize,
}

/// Every attached target overlapping the influence square around `cursor`.
///
/// Boxes are queried fresh from `doc`. Stale handles and non-finite boxes
/// are skipped. The result is sorted shallow to deep, then by document
/// order, so nested targets are drawn over their ancestors.
pub fn select_candidates<D: Document>(
    registry: &Registry<D::Element>,
    doc: &D,
    cursor: Point,
    radius: f64,
) -> Vec<Candidate<D::Element>> {
    let square = influence_square(cursor, radius);
    let mut out: Vec<_> = registry
        .iter()
        .map(|t| t.element())
        .filter(|&e| doc.is_attached(e))
        .filter_map(|element| {
            let rect = doc.bounding_rect(element)?;
            rects_overlap(rect, square).then(|| Candidate {
                element,
                rect,
                depth: doc.depth(element),
            })
        })
        .collect();
    out.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| doc.document_order(a.element, b.element))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDocument, NodeId};
    use kurbo::Size;

    fn setup() -> (MemoryDocument, Registry<NodeId>, NodeId) {
        let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
        let root = doc.root();
        let target = doc.insert(root, Rect::new(100.0, 100.0, 300.0, 250.0));
        let mut reg = Registry::new();
        reg.register(&mut doc, target, None);
        (doc, reg, target)
    }

    #[test]
    fn far_cursor_selects_nothing() {
        let (doc, reg, _) = setup();
        assert!(select_candidates(&reg, &doc, Point::new(500.0, 500.0), 60.0).is_empty());
    }

    #[test]
    fn near_cursor_selects_target() {
        let (doc, reg, target) = setup();
        let c = select_candidates(&reg, &doc, Point::new(150.0, 150.0), 60.0);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].element, target);
        assert_eq!(c[0].rect, Rect::new(100.0, 100.0, 300.0, 250.0));
    }

    #[test]
    fn selection_is_complete_and_exact() {
        let mut doc = MemoryDocument::new(Size::new(2000.0, 2000.0));
        let root = doc.root();
        let mut reg = Registry::new();
        let mut ids = Vec::new();
        for row in 0..10 {
            for col in 0..10 {
                let x = f64::from(col) * 50.0;
                let y = f64::from(row) * 50.0;
                let e = doc.insert(root, Rect::new(x, y, x + 40.0, y + 40.0));
                reg.register(&mut doc, e, None);
                ids.push(e);
            }
        }
        let cursor = Point::new(245.0, 245.0);
        let radius = 70.0;
        let square = influence_square(cursor, radius);
        let selected = select_candidates(&reg, &doc, cursor, radius);

        for &e in &ids {
            let Some(rect) = doc.bounding_rect(e) else {
                panic!("every inserted node is live");
            };
            let hits = selected.iter().filter(|c| c.element == e).count();
            let expected = usize::from(rects_overlap(rect, square));
            assert_eq!(hits, expected, "{e:?} at {rect:?} selected {hits} times");
        }
    }

    #[test]
    fn deeper_targets_sort_after_shallower_ones() {
        let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
        let root = doc.root();
        let outer = doc.insert(root, Rect::new(0.0, 0.0, 400.0, 400.0));
        let inner = doc.insert(outer, Rect::new(50.0, 50.0, 100.0, 100.0));
        let other = doc.insert(root, Rect::new(100.0, 0.0, 150.0, 40.0));
        let mut reg = Registry::new();
        reg.register_many(&mut doc, [(inner, None), (other, None), (outer, None)]);
        let order: Vec<_> = select_candidates(&reg, &doc, Point::new(90.0, 60.0), 60.0)
            .into_iter()
            .map(|c| c.element)
            .collect();
        assert_eq!(order, [outer, other, inner]);
    }

    #[test]
    fn stale_and_degenerate_geometry_is_skipped() {
        let (mut doc, mut reg, target) = setup();
        let root = doc.root();
        let nan = doc.insert(root, Rect::new(f64::NAN, 100.0, 200.0, 200.0));
        let flat = doc.insert(root, Rect::new(120.0, 120.0, 120.0, 200.0));
        reg.register_many(&mut doc, [(nan, None), (flat, None)]);
        doc.remove(target);
        assert!(select_candidates(&reg, &doc, Point::new(150.0, 150.0), 60.0).is_empty());
    }
}
