// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_reveal_vello_cpu --heading-base-level=0

//! Vello CPU backed overlay surfaces for the reveal effect.
//!
//! [`VelloCpuSurface`] implements [`RevealSurface`] on top of the
//! sparse-strips [`vello_cpu::RenderContext`]. Porter-Duff operators other
//! than source-over are applied by pushing a layer with the matching
//! [`BlendMode`] and popping it after the draw, so a `DestIn` mask clears
//! everything its source does not cover.
//!
//! Rendered layers are read back with [`VelloCpuSurface::render`], which
//! returns a [`Pixmap`] of premultiplied RGBA8 pixels.

#![no_std]

use core::fmt;

use kurbo::{Rect, Size, Stroke};
use peniko::{BlendMode, Brush, Compose, Mix};
use understory_reveal::{LayerRole, RevealSurface, Shape, SurfaceFactory};
use vello_cpu::{
    Image as CpuImage, ImageSource, Pixmap, RenderContext, RenderMode, RenderSettings,
};

/// Convert a viewport length to a pixel count in `1..=u16::MAX`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "clamped to the u16 range first; fractional pixels are dropped"
)]
fn pixels(len: f64) -> u16 {
    if len.is_nan() {
        return 1;
    }
    len.clamp(1.0, f64::from(u16::MAX)) as u16
}

/// A [`RevealSurface`] rasterized by `vello_cpu`.
pub struct VelloCpuSurface {
    role: LayerRole,
    ctx: RenderContext,
    render_mode: RenderMode,
    width: u16,
    height: u16,
    stacking_order: i32,
    clip_depth: usize,
}

impl fmt::Debug for VelloCpuSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuSurface")
            .field("role", &self.role)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stacking_order", &self.stacking_order)
            .field("clip_depth", &self.clip_depth)
            .finish_non_exhaustive()
    }
}

impl VelloCpuSurface {
    /// A 1×1 surface; [`configure`](RevealSurface::configure) sizes it.
    pub fn new(role: LayerRole, render_mode: RenderMode) -> Self {
        Self {
            role,
            ctx: Self::context(1, 1, render_mode),
            render_mode,
            width: 1,
            height: 1,
            stacking_order: 0,
            clip_depth: 0,
        }
    }

    fn context(width: u16, height: u16, render_mode: RenderMode) -> RenderContext {
        let settings = RenderSettings {
            render_mode,
            ..RenderSettings::default()
        };
        RenderContext::new_with(width, height, settings)
    }

    /// The layer this surface backs.
    pub fn role(&self) -> LayerRole {
        self.role
    }

    /// Width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Stacking order from the last `configure`.
    pub fn stacking_order(&self) -> i32 {
        self.stacking_order
    }

    /// Rasterize the current contents.
    pub fn render(&mut self) -> Pixmap {
        let mut pixmap = Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        pixmap
    }

    fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    fn set_brush(&mut self, brush: &Brush) {
        match brush.clone() {
            Brush::Solid(color) => self.ctx.set_paint(color),
            Brush::Gradient(gradient) => self.ctx.set_paint(gradient),
            Brush::Image(image_brush) => {
                let source = ImageSource::from_peniko_image_data(&image_brush.image);
                self.ctx.set_paint(CpuImage {
                    image: source,
                    sampler: image_brush.sampler,
                });
            }
        }
    }

    /// Run `draw` with `brush`, composited with `compose`.
    fn composite(
        &mut self,
        brush: &Brush,
        compose: Compose,
        draw: impl FnOnce(&mut RenderContext),
    ) {
        let isolated = compose != Compose::SrcOver;
        if isolated {
            let blend = BlendMode::new(Mix::Normal, compose);
            self.ctx.push_layer(None, Some(blend), None, None, None);
        }
        self.set_brush(brush);
        draw(&mut self.ctx);
        if isolated {
            self.ctx.pop_layer();
        }
    }
}

impl RevealSurface for VelloCpuSurface {
    fn configure(&mut self, viewport: Size, stacking_order: i32) {
        let (width, height) = (pixels(viewport.width), pixels(viewport.height));
        if (width, height) == (self.width, self.height) {
            self.ctx.reset();
        } else {
            self.ctx = Self::context(width, height, self.render_mode);
            self.width = width;
            self.height = height;
        }
        self.stacking_order = stacking_order;
        self.clip_depth = 0;
        tracing::debug!(
            role = ?self.role,
            width,
            height,
            stacking_order,
            "configured vello_cpu surface"
        );
    }

    fn clear(&mut self) {
        self.ctx.reset();
        self.clip_depth = 0;
    }

    fn fill(&mut self, shape: &Shape, brush: &Brush, compose: Compose) {
        let path = shape.to_path();
        self.composite(brush, compose, |ctx| ctx.fill_path(&path));
    }

    fn fill_viewport(&mut self, brush: &Brush, compose: Compose) {
        let rect = self.viewport_rect();
        self.composite(brush, compose, |ctx| ctx.fill_rect(&rect));
    }

    fn stroke(&mut self, shape: &Shape, style: &Stroke, brush: &Brush, compose: Compose) {
        let path = shape.to_path();
        let style = style.clone();
        self.composite(brush, compose, |ctx| {
            ctx.set_stroke(style);
            ctx.stroke_path(&path);
        });
    }

    fn push_clip(&mut self, shape: &Shape) {
        self.ctx.push_clip_layer(&shape.to_path());
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        if self.clip_depth > 0 {
            self.ctx.pop_layer();
            self.clip_depth -= 1;
        }
    }
}

/// Creates [`VelloCpuSurface`]s.
#[derive(Clone)]
pub struct VelloCpuFactory {
    render_mode: RenderMode,
}

impl fmt::Debug for VelloCpuFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuFactory").finish_non_exhaustive()
    }
}

impl Default for VelloCpuFactory {
    fn default() -> Self {
        Self::new(RenderMode::OptimizeSpeed)
    }
}

impl VelloCpuFactory {
    /// A factory producing surfaces that render with `render_mode`.
    pub fn new(render_mode: RenderMode) -> Self {
        Self { render_mode }
    }
}

impl SurfaceFactory for VelloCpuFactory {
    type Surface = VelloCpuSurface;

    fn create(&mut self, role: LayerRole) -> VelloCpuSurface {
        VelloCpuSurface::new(role, self.render_mode)
    }
}

/// Alpha of the pixel at `(x, y)`, or `None` outside the pixmap.
pub fn alpha_at(pixmap: &Pixmap, x: u16, y: u16) -> Option<u8> {
    if x >= pixmap.width() || y >= pixmap.height() {
        return None;
    }
    let idx = usize::from(y) * usize::from(pixmap.width()) + usize::from(x);
    pixmap.data().get(idx).map(|p| p.a)
}
