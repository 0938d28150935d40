// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effect options: per-target overrides, session defaults, and the resolver that merges them.
//!
//! Options come in two shapes:
//!
//! - [`TargetConfig`]: every field optional. Used both for per-target
//!   overrides and for the session-wide defaults set with
//!   [`Session::set_global_config`](crate::Session::set_global_config).
//! - [`EffectiveConfig`]: every field defined. Produced by [`resolve`] on
//!   every draw and never cached, so configuration changes show up on the
//!   next frame.
//!
//! Resolution goes override → defaults → hard-coded default for each field.

use alloc::sync::Arc;
use core::fmt;

use peniko::Color;

use crate::error::ConfigError;

/// Hover radius used when neither the target nor the session sets one.
pub const DEFAULT_HOVER_RADIUS: f64 = 60.0;

/// Border width used when neither the target nor the session sets one.
pub const DEFAULT_BORDER_WIDTH: f64 = 2.0;

/// Stacking order of the overlay surfaces when nothing else is configured.
pub const DEFAULT_LAYER_ORDER: i32 = 9999;

/// A faint white glow, `rgba(255, 255, 255, 0.2)`.
pub const DEFAULT_HOVER_COLOR: Color = Color::new([1.0, 1.0, 1.0, 0.2]);

/// Which parts of the effect are painted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RevealEffect {
    /// Only the hover fill under the cursor.
    Hover,
    /// Only the borders of nearby targets.
    Border,
    /// Both the hover fill and the borders.
    #[default]
    Both,
}

impl RevealEffect {
    /// Returns `true` if the hover fill is painted.
    pub const fn paints_hover(self) -> bool {
        matches!(self, Self::Hover | Self::Both)
    }

    /// Returns `true` if borders are painted.
    pub const fn paints_border(self) -> bool {
        matches!(self, Self::Border | Self::Both)
    }
}

/// Where the border stroke sits relative to the element box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BorderPlacement {
    /// Inset by half the border width, fully inside the box.
    #[default]
    Inside,
    /// Outset by half the border width, fully outside the box.
    Outside,
}

/// Colors derived from the hover color for the border pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BorderColors {
    /// Stroke color of the borders.
    pub border: Color,
    /// Outer stop of the radial gradients.
    pub fade: Color,
}

/// Maps a hover color to the colors used for borders and gradient fades.
#[derive(Clone, Default)]
pub enum ColorTransform {
    /// Border in the hover color, fading to the same color at zero alpha.
    #[default]
    Derived,
    /// A caller-supplied mapping.
    Custom(Arc<dyn Fn(Color) -> BorderColors + Send + Sync>),
}

impl ColorTransform {
    /// Wrap a closure as a custom transform.
    pub fn custom(f: impl Fn(Color) -> BorderColors + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Apply the transform to `hover`.
    pub fn apply(&self, hover: Color) -> BorderColors {
        match self {
            Self::Derived => BorderColors {
                border: hover,
                fade: hover.with_alpha(0.0),
            },
            Self::Custom(f) => f(hover),
        }
    }
}

impl fmt::Debug for ColorTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Derived => f.write_str("Derived"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for ColorTransform {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Derived, Self::Derived) => true,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Partial effect options.
///
/// Unset fields fall through to the session defaults and then to the
/// hard-coded defaults (see [`EffectiveConfig::default`]).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetConfig {
    /// Radius of the glow and of the border influence region, in pixels.
    pub hover_radius: Option<f64>,
    /// Border stroke width, used when the element has no computed border of its own.
    pub border_width: Option<f64>,
    /// Which parts of the effect are painted.
    pub effect: Option<RevealEffect>,
    /// Border stroke placement.
    pub border_placement: Option<BorderPlacement>,
    /// Center color of the glow.
    pub hover_color: Option<Color>,
    /// Stacking order of the overlay surfaces (z-index equivalent).
    ///
    /// Both layers are shared by every target, so only the session defaults
    /// ([`Session::set_global_config`](crate::Session::set_global_config))
    /// apply it. A per-target value is ignored.
    pub layer_order: Option<i32>,
    /// Mapping from hover color to border and fade colors.
    pub color_transform: Option<ColorTransform>,
}

impl TargetConfig {
    /// An empty configuration (everything inherited).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hover radius.
    pub fn with_hover_radius(mut self, radius: f64) -> Self {
        self.hover_radius = Some(radius);
        self
    }

    /// Set the border width.
    pub fn with_border_width(mut self, width: f64) -> Self {
        self.border_width = Some(width);
        self
    }

    /// Set the painted effect.
    pub fn with_effect(mut self, effect: RevealEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Set the border placement.
    pub fn with_border_placement(mut self, placement: BorderPlacement) -> Self {
        self.border_placement = Some(placement);
        self
    }

    /// Set the hover color.
    pub fn with_hover_color(mut self, color: Color) -> Self {
        self.hover_color = Some(color);
        self
    }

    /// Set the surface stacking order.
    pub fn with_layer_order(mut self, order: i32) -> Self {
        self.layer_order = Some(order);
        self
    }

    /// Set the color transform.
    pub fn with_color_transform(mut self, transform: ColorTransform) -> Self {
        self.color_transform = Some(transform);
        self
    }

    /// Overlay every field that `other` defines onto `self`.
    pub fn merge(&mut self, other: &Self) {
        if other.hover_radius.is_some() {
            self.hover_radius = other.hover_radius;
        }
        if other.border_width.is_some() {
            self.border_width = other.border_width;
        }
        if other.effect.is_some() {
            self.effect = other.effect;
        }
        if other.border_placement.is_some() {
            self.border_placement = other.border_placement;
        }
        if other.hover_color.is_some() {
            self.hover_color = other.hover_color;
        }
        if other.layer_order.is_some() {
            self.layer_order = other.layer_order;
        }
        if other.color_transform.is_some() {
            self.color_transform.clone_from(&other.color_transform);
        }
    }

    /// Check the numeric options for range errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(r) = self.hover_radius
            && !(r.is_finite() && r > 0.0)
        {
            return Err(ConfigError::InvalidHoverRadius(r));
        }
        if let Some(w) = self.border_width
            && !(w.is_finite() && w >= 0.0)
        {
            return Err(ConfigError::InvalidBorderWidth(w));
        }
        Ok(())
    }
}

/// Fully resolved effect options.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveConfig {
    /// Radius of the glow and of the border influence region, in pixels.
    pub hover_radius: f64,
    /// Border stroke width, used when the element has no computed border of its own.
    pub border_width: f64,
    /// Which parts of the effect are painted.
    pub effect: RevealEffect,
    /// Border stroke placement.
    pub border_placement: BorderPlacement,
    /// Center color of the glow.
    pub hover_color: Color,
    /// Stacking order of the overlay surfaces.
    pub layer_order: i32,
    /// Mapping from hover color to border and fade colors.
    pub color_transform: ColorTransform,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            hover_radius: DEFAULT_HOVER_RADIUS,
            border_width: DEFAULT_BORDER_WIDTH,
            effect: RevealEffect::Both,
            border_placement: BorderPlacement::Inside,
            hover_color: DEFAULT_HOVER_COLOR,
            layer_order: DEFAULT_LAYER_ORDER,
            color_transform: ColorTransform::Derived,
        }
    }
}

impl EffectiveConfig {
    /// Border and fade colors derived from the hover color.
    pub fn border_colors(&self) -> BorderColors {
        self.color_transform.apply(self.hover_color)
    }
}

impl From<EffectiveConfig> for TargetConfig {
    fn from(config: EffectiveConfig) -> Self {
        Self {
            hover_radius: Some(config.hover_radius),
            border_width: Some(config.border_width),
            effect: Some(config.effect),
            border_placement: Some(config.border_placement),
            hover_color: Some(config.hover_color),
            layer_order: Some(config.layer_order),
            color_transform: Some(config.color_transform),
        }
    }
}

fn sanitize_length(value: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        fallback
    } else if value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Merge `overrides` over `defaults` into a fully defined configuration.
///
/// Each option is taken from `overrides` if set, else from `defaults`, else
/// from [`EffectiveConfig::default`]. Lengths are clamped: negative values
/// become zero and non-finite values fall back to the hard-coded default.
///
/// The function is pure and idempotent:
/// `resolve(&resolve(o, d).into(), d) == resolve(o, d)`.
pub fn resolve(overrides: &TargetConfig, defaults: &TargetConfig) -> EffectiveConfig {
    let fallback = EffectiveConfig::default();
    let hover_radius = overrides
        .hover_radius
        .or(defaults.hover_radius)
        .map_or(fallback.hover_radius, |r| {
            sanitize_length(r, fallback.hover_radius)
        });
    let border_width = overrides
        .border_width
        .or(defaults.border_width)
        .map_or(fallback.border_width, |w| {
            sanitize_length(w, fallback.border_width)
        });
    EffectiveConfig {
        hover_radius,
        border_width,
        effect: overrides
            .effect
            .or(defaults.effect)
            .unwrap_or(fallback.effect),
        border_placement: overrides
            .border_placement
            .or(defaults.border_placement)
            .unwrap_or(fallback.border_placement),
        hover_color: overrides
            .hover_color
            .or(defaults.hover_color)
            .unwrap_or(fallback.hover_color),
        layer_order: overrides
            .layer_order
            .or(defaults.layer_order)
            .unwrap_or(fallback.layer_order),
        color_transform: overrides
            .color_transform
            .as_ref()
            .or(defaults.color_transform.as_ref())
            .cloned()
            .unwrap_or(fallback.color_transform),
    }
}

/// What a scroll-triggered redraw does to the hover layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScrollPolicy {
    /// Re-resolve the hover from the last cursor and repaint both layers.
    #[default]
    Redraw,
    /// Keep the previous hover fill and refresh only the border layer.
    BorderOnly,
}

/// Which layers are masked to the box of an occluding parent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OccluderClip {
    /// Clip both the border strokes and the hover fill.
    #[default]
    BothLayers,
    /// Clip only the border strokes.
    BorderOnly,
}

/// Session-level policies that are not per-target options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionOptions {
    /// Initial session defaults.
    pub defaults: TargetConfig,
    /// Scroll redraw policy.
    pub scroll: ScrollPolicy,
    /// Occluder masking policy.
    pub occluder_clip: OccluderClip,
}
