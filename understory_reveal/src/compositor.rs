// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The effect compositor.
//!
//! One call to [`Compositor::paint`] renders a whole frame into the two
//! layers, from live geometry, and returns to idle. Nothing is cached between
//! frames.
//!
//! ## Border pass
//!
//! Every candidate near the cursor gets its outline stroked in its own border
//! color, inset or outset by half the stroke width. Afterwards the whole
//! border layer is intersected (`DestIn`) with a radial gradient centered on
//! the cursor, so borders fade out with distance.
//!
//! ## Hover pass
//!
//! The hover layer is filled with a radial gradient from the hover color to
//! the fade color, then intersected with the hovered target's shape.
//!
//! The border pass runs first. Candidates whose parent is an occluder are
//! clipped to the parent's box.

use kurbo::{Point, Stroke};
use peniko::{
    Brush, Color, ColorStop, ColorStops, Compose, Extend, Gradient, GradientKind,
    RadialGradientPosition,
};

use crate::candidates::select_candidates;
use crate::config::{BorderPlacement, OccluderClip, TargetConfig, resolve};
use crate::geometry::{Shape, clamp_radii};
use crate::host::Document;
use crate::hover::HoverTarget;
use crate::registry::Registry;
use crate::surface::{RevealLayers, RevealSurface};

/// Which layers a redraw clears.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ClearMode {
    /// Clear and repaint both layers.
    #[default]
    Full,
    /// Clear and repaint only the border layer; the hover layer keeps its contents.
    BorderOnly,
}

/// Input of one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame<E> {
    /// Cursor position in viewport coordinates.
    pub cursor: Point,
    /// Resolved hover target.
    pub hovered: HoverTarget<E>,
    /// Which layers to clear and repaint.
    pub clear: ClearMode,
}

/// What a frame painted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Targets overlapping the influence square.
    pub candidates: usize,
    /// Borders actually stroked.
    pub borders: usize,
    /// Whether the hover layer received paint.
    pub hover_painted: bool,
}

/// Paints frames into a pair of [`RevealLayers`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Compositor {
    occluder_clip: OccluderClip,
}

impl Compositor {
    /// A compositor applying `occluder_clip` to occluded targets.
    pub fn new(occluder_clip: OccluderClip) -> Self {
        Self { occluder_clip }
    }

    /// The occluder masking policy.
    pub fn occluder_clip(&self) -> OccluderClip {
        self.occluder_clip
    }

    /// Render one frame.
    ///
    /// Targets with missing, non-finite or zero-area geometry are skipped.
    pub fn paint<D, S>(
        &self,
        layers: &mut RevealLayers<S>,
        doc: &D,
        registry: &Registry<D::Element>,
        defaults: &TargetConfig,
        frame: &Frame<D::Element>,
    ) -> FrameSummary
    where
        D: Document,
        S: RevealSurface,
    {
        layers.border.clear();
        if frame.clear == ClearMode::Full {
            layers.hover.clear();
        }

        let hovered = frame.hovered.target();
        let active = resolve(override_of(registry, hovered), defaults);
        let mut summary = FrameSummary::default();

        if active.effect.paints_border() {
            let candidates = select_candidates(registry, doc, frame.cursor, active.hover_radius);
            summary.candidates = candidates.len();
            for candidate in &candidates {
                let config = resolve(override_of(registry, Some(candidate.element)), defaults);
                if !config.effect.paints_border() {
                    continue;
                }
                let style = doc.border_style(candidate.element);
                let width = style
                    .map(|s| s.width)
                    .filter(|w| w.is_finite() && *w > 0.0)
                    .unwrap_or(config.border_width);
                let shape = element_shape(doc, candidate.element, candidate.rect);
                if !shape.is_drawable() {
                    continue;
                }
                let line = match config.border_placement {
                    BorderPlacement::Inside => shape.inflate(-0.5 * width),
                    BorderPlacement::Outside => shape.inflate(0.5 * width),
                };
                let brush = Brush::Solid(config.border_colors().border);
                let clip = occluding_parent(doc, registry, candidate.element);
                if let Some(clip) = &clip {
                    layers.border.push_clip(clip);
                }
                layers
                    .border
                    .stroke(&line, &Stroke::new(width), &brush, Compose::SrcOver);
                if clip.is_some() {
                    layers.border.pop_clip();
                }
                summary.borders += 1;
            }
            if summary.borders > 0 {
                let mask = radial_brush(
                    frame.cursor,
                    active.hover_radius,
                    Color::WHITE,
                    Color::TRANSPARENT,
                );
                layers.border.fill_viewport(&mask, Compose::DestIn);
            }
        }

        if frame.clear == ClearMode::Full
            && active.effect.paints_hover()
            && active.hover_radius > 0.0
            && let Some(element) = hovered
            && let Some(rect) = doc.bounding_rect(element)
        {
            let shape = element_shape(doc, element, rect);
            if shape.is_drawable() {
                let colors = active.border_colors();
                let glow = radial_brush(
                    frame.cursor,
                    active.hover_radius,
                    active.hover_color,
                    colors.fade,
                );
                let opaque = Brush::Solid(Color::WHITE);
                layers.hover.fill_viewport(&glow, Compose::SrcOver);
                layers.hover.fill(&shape, &opaque, Compose::DestIn);
                if self.occluder_clip == OccluderClip::BothLayers
                    && let Some(clip) = occluding_parent(doc, registry, element)
                {
                    layers.hover.fill(&clip, &opaque, Compose::DestIn);
                }
                summary.hover_painted = true;
            }
        }

        tracing::trace!(
            cursor = ?frame.cursor,
            hovered = ?frame.hovered,
            clear = ?frame.clear,
            candidates = summary.candidates,
            borders = summary.borders,
            hover = summary.hover_painted,
            "painted reveal frame"
        );
        summary
    }
}

fn override_of<E>(registry: &Registry<E>, element: Option<E>) -> &TargetConfig
where
    E: Copy + Eq + core::hash::Hash + core::fmt::Debug,
{
    static EMPTY: TargetConfig = TargetConfig {
        hover_radius: None,
        border_width: None,
        effect: None,
        border_placement: None,
        hover_color: None,
        layer_order: None,
        color_transform: None,
    };
    element
        .and_then(|e| registry.get(e))
        .and_then(|t| t.config())
        .unwrap_or(&EMPTY)
}

/// Shape of `element` at `rect`, rounded by its computed radii.
fn element_shape<D: Document>(doc: &D, element: D::Element, rect: kurbo::Rect) -> Shape {
    let radii = doc
        .border_style(element)
        .map(|s| clamp_radii(rect, s.radii));
    Shape::from_box(rect, radii)
}

/// The box of `element`'s parent when that parent is an occluder with drawable geometry.
fn occluding_parent<D: Document>(
    doc: &D,
    registry: &Registry<D::Element>,
    element: D::Element,
) -> Option<Shape> {
    let parent = doc.parent(element)?;
    if !registry.is_occluder(parent) {
        return None;
    }
    let rect = doc.bounding_rect(parent)?;
    Some(element_shape(doc, parent, rect)).filter(Shape::is_drawable)
}

/// Radial gradient centered on `center`, `inner` at the center and `outer` at `radius` and beyond.
#[expect(
    clippy::cast_possible_truncation,
    reason = "gradient radii are f32 in peniko; pixel radii fit comfortably"
)]
pub fn radial_brush(center: Point, radius: f64, inner: Color, outer: Color) -> Brush {
    let stops = [ColorStop::from((0.0, inner)), ColorStop::from((1.0, outer))];
    Brush::Gradient(Gradient {
        kind: GradientKind::Radial(RadialGradientPosition::new(center, radius as f32)),
        extend: Extend::Pad,
        stops: ColorStops::from(&stops[..]),
        ..Gradient::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BorderPlacement, RevealEffect};
    use crate::host::BorderStyle;
    use crate::hover::resolve_hover;
    use crate::memory::{MemoryDocument, NodeId};
    use crate::surface::{RecordingFactory, RecordingSurface, SurfaceOp};
    use kurbo::{Rect, RoundedRectRadii, Size};

    struct Fixture {
        doc: MemoryDocument,
        registry: Registry<NodeId>,
        layers: RevealLayers<RecordingSurface>,
        target: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
        let root = doc.root();
        // x = 100, y = 100, width = 200, height = 150
        let target = doc.insert(root, Rect::new(100.0, 100.0, 300.0, 250.0));
        let mut registry = Registry::new();
        registry.register(&mut doc, target, None);
        let mut layers = RevealLayers::create(&mut RecordingFactory::new());
        layers.configure(Size::new(800.0, 600.0), 9999);
        Fixture {
            doc,
            registry,
            layers,
            target,
        }
    }

    fn paint_at(f: &mut Fixture, cursor: Point, defaults: &TargetConfig) -> FrameSummary {
        let hovered = resolve_hover(&f.registry, &f.doc, Some(f.target))
            .target()
            .filter(|&t| f.doc.bounding_rect(t).is_some_and(|r| r.contains(cursor)))
            .map_or(HoverTarget::Root, HoverTarget::Target);
        Compositor::default().paint(
            &mut f.layers,
            &f.doc,
            &f.registry,
            defaults,
            &Frame {
                cursor,
                hovered,
                clear: ClearMode::Full,
            },
        )
    }

    fn strokes(s: &RecordingSurface) -> impl Iterator<Item = (&Shape, f64)> {
        s.frame().iter().filter_map(|op| match op {
            SurfaceOp::Stroke { shape, width, .. } => Some((shape, *width)),
            _ => None,
        })
    }

    #[test]
    fn hovered_target_gets_masked_glow() {
        let mut f = fixture();
        let summary = paint_at(&mut f, Point::new(150.0, 150.0), &TargetConfig::new());
        assert!(summary.hover_painted, "target under the cursor is lit");
        assert_eq!(summary.candidates, 1);

        let hover = f.layers.hover.frame();
        assert!(
            matches!(
                hover,
                [
                    SurfaceOp::FillViewport { compose: Compose::SrcOver, .. },
                    SurfaceOp::Fill { shape: Shape::Rect(r), compose: Compose::DestIn, .. },
                ] if *r == Rect::new(100.0, 100.0, 300.0, 250.0)
            ),
            "glow then mask to the target box, got {hover:?}"
        );
    }

    #[test]
    fn border_pass_strokes_inset_and_masks_with_circle() {
        let mut f = fixture();
        paint_at(&mut f, Point::new(150.0, 150.0), &TargetConfig::new());
        let border = f.layers.border.frame();
        let collected: alloc::vec::Vec<_> = strokes(&f.layers.border).collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(*collected[0].0, Shape::Rect(Rect::new(101.0, 101.0, 299.0, 249.0)));
        assert_eq!(collected[0].1, 2.0);
        assert!(
            matches!(border.last(), Some(SurfaceOp::FillViewport { compose: Compose::DestIn, .. })),
            "border layer ends with the influence mask"
        );
    }

    #[test]
    fn far_cursor_paints_nothing() {
        let mut f = fixture();
        let summary = paint_at(&mut f, Point::new(500.0, 500.0), &TargetConfig::new());
        assert_eq!(summary, FrameSummary::default());
        assert!(f.layers.hover.is_blank());
        assert!(f.layers.border.is_blank());
    }

    #[test]
    fn computed_border_width_wins_and_outside_placement_outsets() {
        let mut f = fixture();
        f.doc.set_border(f.target, BorderStyle::square(4.0));
        let defaults = TargetConfig::new()
            .with_border_placement(BorderPlacement::Outside)
            .with_border_width(1.0);
        paint_at(&mut f, Point::new(150.0, 150.0), &defaults);
        let collected: alloc::vec::Vec<_> = strokes(&f.layers.border).collect();
        assert_eq!(*collected[0].0, Shape::Rect(Rect::new(98.0, 98.0, 302.0, 252.0)));
        assert_eq!(collected[0].1, 4.0);
    }

    #[test]
    fn zero_width_outside_border_sits_on_the_edge() {
        let mut f = fixture();
        let defaults = TargetConfig::new()
            .with_border_placement(BorderPlacement::Outside)
            .with_border_width(0.0);
        paint_at(&mut f, Point::new(150.0, 150.0), &defaults);
        let collected: alloc::vec::Vec<_> = strokes(&f.layers.border).collect();
        assert_eq!(*collected[0].0, Shape::Rect(Rect::new(100.0, 100.0, 300.0, 250.0)));
    }

    #[test]
    fn rounded_targets_use_host_radii() {
        let mut f = fixture();
        f.doc.set_border(
            f.target,
            BorderStyle {
                width: 0.0,
                radii: RoundedRectRadii::from_single_radius(12.0),
            },
        );
        paint_at(&mut f, Point::new(150.0, 150.0), &TargetConfig::new());
        assert!(
            matches!(
                f.layers.hover.frame().get(1),
                Some(SurfaceOp::Fill { shape: Shape::RoundedRect { .. }, .. })
            ),
            "hover mask follows the rounded box"
        );
        let collected: alloc::vec::Vec<_> = strokes(&f.layers.border).collect();
        let Shape::RoundedRect { radii, .. } = collected[0].0 else {
            panic!("border should be rounded");
        };
        assert_eq!(radii.top_left, 11.0, "inset stroke follows the inner curve");
    }

    #[test]
    fn occluded_candidates_are_clipped_on_both_layers() {
        let mut f = fixture();
        let root = f.doc.root();
        let scroller = f.doc.insert(root, Rect::new(400.0, 0.0, 600.0, 200.0));
        let inner = f.doc.insert(scroller, Rect::new(450.0, 50.0, 700.0, 150.0));
        f.registry.register(&mut f.doc, inner, None);
        f.registry.mark_occluder(scroller);
        let cursor = Point::new(500.0, 100.0);
        Compositor::new(OccluderClip::BothLayers).paint(
            &mut f.layers,
            &f.doc,
            &f.registry,
            &TargetConfig::new(),
            &Frame {
                cursor,
                hovered: HoverTarget::Target(inner),
                clear: ClearMode::Full,
            },
        );
        let clip = Shape::Rect(Rect::new(400.0, 0.0, 600.0, 200.0));
        assert!(f.layers.border.frame().contains(&SurfaceOp::PushClip(clip)));
        assert_eq!(f.layers.border.clip_depth(), 0, "clips are balanced");
        assert!(
            matches!(
                f.layers.hover.frame().last(),
                Some(SurfaceOp::Fill { shape, compose: Compose::DestIn, .. }) if *shape == clip
            ),
            "hover glow is masked to the occluder"
        );
    }

    #[test]
    fn occluder_with_nan_box_does_not_mask() {
        let mut f = fixture();
        let root = f.doc.root();
        let scroller = f.doc.insert(root, Rect::new(f64::NAN, 0.0, 600.0, 400.0));
        let card = f.doc.insert(scroller, Rect::new(400.0, 100.0, 550.0, 250.0));
        f.registry.register(&mut f.doc, card, None);
        f.registry.mark_occluder(scroller);
        let summary = Compositor::new(OccluderClip::BothLayers).paint(
            &mut f.layers,
            &f.doc,
            &f.registry,
            &TargetConfig::new(),
            &Frame {
                cursor: Point::new(450.0, 150.0),
                hovered: HoverTarget::Target(card),
                clear: ClearMode::Full,
            },
        );
        assert_eq!(summary.borders, 1);
        assert!(summary.hover_painted);
        assert!(
            !f.layers
                .border
                .frame()
                .iter()
                .any(|op| matches!(op, SurfaceOp::PushClip(_))),
            "no clip from a NaN occluder"
        );
        assert!(
            matches!(
                f.layers.hover.frame(),
                [
                    SurfaceOp::FillViewport { .. },
                    SurfaceOp::Fill { shape: Shape::Rect(r), compose: Compose::DestIn, .. },
                ] if *r == Rect::new(400.0, 100.0, 550.0, 250.0)
            ),
            "hover is masked to the card only, got {:?}",
            f.layers.hover.frame()
        );
    }

    #[test]
    fn border_only_frames_leave_hover_layer_alone() {
        let mut f = fixture();
        paint_at(&mut f, Point::new(150.0, 150.0), &TargetConfig::new());
        let hover_ops = f.layers.hover.ops().len();
        Compositor::default().paint(
            &mut f.layers,
            &f.doc,
            &f.registry,
            &TargetConfig::new(),
            &Frame {
                cursor: Point::new(160.0, 150.0),
                hovered: HoverTarget::Target(f.target),
                clear: ClearMode::BorderOnly,
            },
        );
        assert_eq!(f.layers.hover.ops().len(), hover_ops, "hover layer untouched");
        assert!(!f.layers.hover.is_blank(), "previous glow preserved");
        assert!(!f.layers.border.is_blank(), "border repainted");
    }

    #[test]
    fn effect_selection_controls_passes() {
        let mut f = fixture();
        let cursor = Point::new(150.0, 150.0);
        paint_at(&mut f, cursor, &TargetConfig::new().with_effect(RevealEffect::Hover));
        assert!(f.layers.border.is_blank());
        assert!(!f.layers.hover.is_blank());
        paint_at(&mut f, cursor, &TargetConfig::new().with_effect(RevealEffect::Border));
        assert!(!f.layers.border.is_blank());
        assert!(f.layers.hover.is_blank());
    }

    #[test]
    fn zero_area_targets_are_skipped() {
        let mut f = fixture();
        f.doc.set_rect(f.target, Rect::new(100.0, 100.0, 100.0, 250.0));
        let summary = paint_at(&mut f, Point::new(100.0, 150.0), &TargetConfig::new());
        assert_eq!(summary.borders, 0);
        assert!(!summary.hover_painted);
    }
}
