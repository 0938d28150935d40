// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry helpers: overlap and containment tests, influence regions, and target shapes.
//!
//! All functions here are pure. Rectangles are normalized before testing, so
//! callers may pass boxes with swapped corners. Non-finite input never
//! overlaps or contains anything, which lets the compositor treat geometry
//! from a detached element as "skip" rather than as an error.

use kurbo::{BezPath, Point, Rect, RoundedRect, RoundedRectRadii, Shape as _};

/// Tolerance used when flattening rounded corners into paths.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Returns `true` if the interiors of `a` and `b` intersect.
///
/// Touching edges do not count as overlap, so the relation is symmetric and
/// `rects_overlap(a, a)` holds exactly when `a` has positive area.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let (a, b) = (a.abs(), b.abs());
    a.x0.max(b.x0) < a.x1.min(b.x1) && a.y0.max(b.y0) < a.y1.min(b.y1)
}

/// Returns `true` if `p` lies strictly inside `r` (the boundary is excluded).
pub fn point_in_rect(p: Point, r: Rect) -> bool {
    let r = r.abs();
    p.x > r.x0 && p.x < r.x1 && p.y > r.y0 && p.y < r.y1
}

/// The axis-aligned square `[x - r, x + r] × [y - r, y + r]` around `center`.
///
/// Negative or NaN radii collapse the square onto `center`.
pub fn influence_square(center: Point, radius: f64) -> Rect {
    let r = if radius > 0.0 { radius } else { 0.0 };
    Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
}

/// Clamp corner radii so that the rounded outline of `rect` never self-intersects.
///
/// Negative and non-finite radii become zero. If two adjacent corners would
/// overlap along a side, all radii are scaled down by the same factor. For a
/// uniform radius this reduces to `min(width, height) / 2`.
pub fn clamp_radii(rect: Rect, radii: RoundedRectRadii) -> RoundedRectRadii {
    let rect = rect.abs();
    let (w, h) = (rect.width(), rect.height());
    let sanitize = |r: f64| if r.is_finite() && r > 0.0 { r } else { 0.0 };
    let tl = sanitize(radii.top_left);
    let tr = sanitize(radii.top_right);
    let br = sanitize(radii.bottom_right);
    let bl = sanitize(radii.bottom_left);

    let mut scale = 1.0_f64;
    for (side, sum) in [(w, tl + tr), (h, tr + br), (w, br + bl), (h, bl + tl)] {
        if sum > side {
            scale = scale.min(side / sum);
        }
    }
    RoundedRectRadii::new(tl * scale, tr * scale, br * scale, bl * scale)
}

/// Build a closed path for `rect` with up to four independent corner radii.
///
/// Radii are clamped with [`clamp_radii`] first.
pub fn rounded_rect_path(rect: Rect, radii: RoundedRectRadii) -> BezPath {
    RoundedRect::from_rect(rect.abs(), clamp_radii(rect, radii)).to_path(PATH_TOLERANCE)
}

fn radii_are_zero(radii: &RoundedRectRadii) -> bool {
    !(radii.top_left > 0.0
        || radii.top_right > 0.0
        || radii.bottom_right > 0.0
        || radii.bottom_left > 0.0)
}

/// Outline of a target, as consumed by surfaces for filling, stroking and clipping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    /// A plain axis-aligned rectangle.
    Rect(Rect),
    /// A rectangle with per-corner radii.
    RoundedRect {
        /// The outer box.
        rect: Rect,
        /// Corner radii, clockwise from the top-left corner.
        radii: RoundedRectRadii,
    },
}

impl Shape {
    /// Shape of an element box with optional corner radii.
    ///
    /// Radii that are all zero produce [`Shape::Rect`].
    pub fn from_box(rect: Rect, radii: Option<RoundedRectRadii>) -> Self {
        match radii {
            Some(radii) if !radii_are_zero(&radii) => Self::RoundedRect { rect, radii },
            _ => Self::Rect(rect),
        }
    }

    /// The normalized bounding box of the shape.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(rect) | Self::RoundedRect { rect, .. } => rect.abs(),
        }
    }

    /// Returns `true` if the shape is finite and encloses a positive area.
    pub fn is_drawable(&self) -> bool {
        let bounds = self.bounds();
        bounds.is_finite() && bounds.width() > 0.0 && bounds.height() > 0.0
    }

    /// Grow (positive `amount`) or shrink (negative `amount`) the shape on every side.
    ///
    /// Shrinking stops at the center line, so the result never inverts. Corner
    /// radii follow the outline and never go below zero.
    pub fn inflate(&self, amount: f64) -> Self {
        let bounds = self.bounds();
        let max_inset = 0.5 * bounds.width().min(bounds.height());
        let amount = amount.max(-max_inset);
        let rect = bounds.inflate(amount, amount);
        match self {
            Self::Rect(_) => Self::Rect(rect),
            Self::RoundedRect { radii, .. } => {
                let grow = |r: f64| (r + amount).max(0.0);
                Self::RoundedRect {
                    rect,
                    radii: RoundedRectRadii::new(
                        grow(radii.top_left),
                        grow(radii.top_right),
                        grow(radii.bottom_right),
                        grow(radii.bottom_left),
                    ),
                }
            }
        }
    }

    /// Build the closed outline path of the shape.
    pub fn to_path(&self) -> BezPath {
        match self {
            Self::Rect(rect) => rect.abs().to_path(PATH_TOLERANCE),
            Self::RoundedRect { rect, radii } => rounded_rect_path(*rect, *radii),
        }
    }
}
