// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing surface seam and a recording implementation.
//!
//! The effect paints into two full-viewport overlay layers. Each layer is a
//! [`RevealSurface`]: a raster target that supports filling and stroking a
//! [`Shape`] (or the whole viewport) with a [`Brush`] under a Porter-Duff
//! [`Compose`] operator, plus a clip stack.
//!
//! Only three operators are used by the compositor:
//!
//! - [`Compose::SrcOver`] adds paint,
//! - [`Compose::DestIn`] keeps existing paint where the source is opaque,
//! - [`Compose::DestOut`] removes existing paint where the source is opaque.
//!
//! Implementations must treat the geometry outside of a [`Compose::DestIn`]
//! source as transparent, so that masking with a shape clears everything
//! outside the shape.
//!
//! [`RecordingSurface`] records every call as a [`SurfaceOp`] for tests.

use alloc::vec::Vec;

use kurbo::{Size, Stroke};
use peniko::{Brush, Compose};

use crate::geometry::Shape;

/// Which of the two overlay layers a surface backs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerRole {
    /// The glow under the cursor, masked to the hovered target.
    Hover,
    /// Target borders, masked by the influence circle.
    Border,
}

/// A raster overlay layer.
pub trait RevealSurface {
    /// Resize to `viewport` and apply the stacking order. Contents may be discarded.
    fn configure(&mut self, viewport: Size, stacking_order: i32);

    /// Make every pixel transparent and reset the clip stack.
    fn clear(&mut self);

    /// Fill `shape` with `brush`.
    fn fill(&mut self, shape: &Shape, brush: &Brush, compose: Compose);

    /// Fill the whole surface with `brush`.
    fn fill_viewport(&mut self, brush: &Brush, compose: Compose);

    /// Stroke the outline of `shape` with `brush`.
    fn stroke(&mut self, shape: &Shape, style: &Stroke, brush: &Brush, compose: Compose);

    /// Restrict subsequent drawing to `shape` until the matching [`pop_clip`](Self::pop_clip).
    fn push_clip(&mut self, shape: &Shape);

    /// Pop the innermost clip.
    fn pop_clip(&mut self);
}

/// Creates the overlay surfaces on demand.
pub trait SurfaceFactory {
    /// The surface type produced.
    type Surface: RevealSurface;

    /// Create a surface for `role`. It is configured before first use.
    fn create(&mut self, role: LayerRole) -> Self::Surface;
}

/// The hover and border layers of one session.
#[derive(Clone, Debug)]
pub struct RevealLayers<S> {
    /// The hover fill layer.
    pub hover: S,
    /// The border mask layer.
    pub border: S,
}

impl<S: RevealSurface> RevealLayers<S> {
    /// Create both layers from `factory`.
    pub fn create<F>(factory: &mut F) -> Self
    where
        F: SurfaceFactory<Surface = S>,
    {
        Self {
            hover: factory.create(LayerRole::Hover),
            border: factory.create(LayerRole::Border),
        }
    }

    /// Configure both layers.
    pub fn configure(&mut self, viewport: Size, stacking_order: i32) {
        self.hover.configure(viewport, stacking_order);
        self.border.configure(viewport, stacking_order);
    }

    /// Clear both layers.
    pub fn clear(&mut self) {
        self.hover.clear();
        self.border.clear();
    }

    /// The layer backing `role`.
    pub fn get(&self, role: LayerRole) -> &S {
        match role {
            LayerRole::Hover => &self.hover,
            LayerRole::Border => &self.border,
        }
    }
}

/// A call recorded by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    /// [`RevealSurface::configure`].
    Configure {
        /// New viewport size.
        viewport: Size,
        /// New stacking order.
        stacking_order: i32,
    },
    /// [`RevealSurface::clear`].
    Clear,
    /// [`RevealSurface::fill`].
    Fill {
        /// Filled shape.
        shape: Shape,
        /// Paint.
        brush: Brush,
        /// Operator.
        compose: Compose,
    },
    /// [`RevealSurface::fill_viewport`].
    FillViewport {
        /// Paint.
        brush: Brush,
        /// Operator.
        compose: Compose,
    },
    /// [`RevealSurface::stroke`].
    Stroke {
        /// Stroked shape.
        shape: Shape,
        /// Stroke width.
        width: f64,
        /// Paint.
        brush: Brush,
        /// Operator.
        compose: Compose,
    },
    /// [`RevealSurface::push_clip`].
    PushClip(Shape),
    /// [`RevealSurface::pop_clip`].
    PopClip,
}

impl SurfaceOp {
    /// Whether the op can add coverage to the surface.
    pub fn adds_paint(&self) -> bool {
        match self {
            Self::Fill { compose, .. }
            | Self::FillViewport { compose, .. }
            | Self::Stroke { compose, .. } => !matches!(compose, Compose::DestIn | Compose::DestOut),
            Self::Configure { .. } | Self::Clear | Self::PushClip(_) | Self::PopClip => false,
        }
    }
}

/// A [`RevealSurface`] that records calls instead of rasterizing.
///
/// Meant for tests: the op log keeps every call, across clears, until
/// [`reset_log`](Self::reset_log). Long-running sessions should use a
/// rasterizing backend.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    role: LayerRole,
    viewport: Size,
    stacking_order: i32,
    clip_depth: usize,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    /// A fresh, unconfigured surface.
    pub fn new(role: LayerRole) -> Self {
        Self {
            role,
            viewport: Size::ZERO,
            stacking_order: 0,
            clip_depth: 0,
            ops: Vec::new(),
        }
    }

    /// The role this surface was created for.
    pub fn role(&self) -> LayerRole {
        self.role
    }

    /// Size from the last `configure`.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Stacking order from the last `configure`.
    pub fn stacking_order(&self) -> i32 {
        self.stacking_order
    }

    /// Every recorded op.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Ops since the last clear or configure, i.e. what is currently on the surface.
    pub fn frame(&self) -> &[SurfaceOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, SurfaceOp::Clear | SurfaceOp::Configure { .. }))
            .map_or(0, |i| i + 1);
        &self.ops[start..]
    }

    /// Whether nothing has been painted since the surface was last cleared.
    pub fn is_blank(&self) -> bool {
        !self.frame().iter().any(SurfaceOp::adds_paint)
    }

    /// Number of `clear` calls recorded.
    pub fn clear_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Clear))
            .count()
    }

    /// Current clip stack depth.
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    /// Forget every recorded op.
    pub fn reset_log(&mut self) {
        self.ops.clear();
    }
}

impl RevealSurface for RecordingSurface {
    fn configure(&mut self, viewport: Size, stacking_order: i32) {
        self.viewport = viewport;
        self.stacking_order = stacking_order;
        self.clip_depth = 0;
        self.ops.push(SurfaceOp::Configure {
            viewport,
            stacking_order,
        });
    }

    fn clear(&mut self) {
        self.clip_depth = 0;
        self.ops.push(SurfaceOp::Clear);
    }

    fn fill(&mut self, shape: &Shape, brush: &Brush, compose: Compose) {
        self.ops.push(SurfaceOp::Fill {
            shape: *shape,
            brush: brush.clone(),
            compose,
        });
    }

    fn fill_viewport(&mut self, brush: &Brush, compose: Compose) {
        self.ops.push(SurfaceOp::FillViewport {
            brush: brush.clone(),
            compose,
        });
    }

    fn stroke(&mut self, shape: &Shape, style: &Stroke, brush: &Brush, compose: Compose) {
        self.ops.push(SurfaceOp::Stroke {
            shape: *shape,
            width: style.width,
            brush: brush.clone(),
            compose,
        });
    }

    fn push_clip(&mut self, shape: &Shape) {
        self.clip_depth += 1;
        self.ops.push(SurfaceOp::PushClip(*shape));
    }

    fn pop_clip(&mut self) {
        self.clip_depth = self.clip_depth.saturating_sub(1);
        self.ops.push(SurfaceOp::PopClip);
    }
}

/// Factory for [`RecordingSurface`]s. Counts how many surfaces it created.
#[derive(Clone, Debug, Default)]
pub struct RecordingFactory {
    created: usize,
}

impl RecordingFactory {
    /// A new factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surfaces created so far.
    pub fn created(&self) -> usize {
        self.created
    }
}

impl SurfaceFactory for RecordingFactory {
    type Surface = RecordingSurface;

    fn create(&mut self, role: LayerRole) -> RecordingSurface {
        self.created += 1;
        RecordingSurface::new(role)
    }
}
