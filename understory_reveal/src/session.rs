// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reveal session: registration API and event entry points.
//!
//! A [`Session`] owns everything that lives for the duration of an effect:
//! the registry, the session defaults, the last cursor and hover state, and
//! the two overlay surfaces. Hosts drive it by forwarding events:
//!
//! - [`pointer_move`](Session::pointer_move) on every pointer move,
//! - [`scroll`](Session::scroll) on scroll (no pointer position of its own),
//! - [`resize`](Session::resize) when the viewport changes,
//! - [`handle_mutation`](Session::handle_mutation) for each structural
//!   notification delivered on a watcher subscription.
//!
//! Every handler runs to completion and repaints from live geometry.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use crate::compositor::{ClearMode, Compositor, Frame, FrameSummary};
use crate::config::{ScrollPolicy, SessionOptions, TargetConfig, resolve};
use crate::error::ConfigError;
use crate::geometry::point_in_rect;
use crate::host::{Document, MutationSource, SubscriptionId};
use crate::hover::{HoverTarget, resolve_hover};
use crate::registry::Registry;
use crate::surface::{RevealLayers, RevealSurface, SurfaceFactory};

/// Last known pointer state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorState<E> {
    /// Position in viewport coordinates.
    pub point: Point,
    /// Raw event target reported with the position.
    pub raw_target: Option<E>,
}

/// An effect session over elements of type `E`, drawing through `F`.
pub struct Session<E, F: SurfaceFactory> {
    factory: F,
    layers: Option<RevealLayers<F::Surface>>,
    registry: Registry<E>,
    defaults: TargetConfig,
    scroll: ScrollPolicy,
    compositor: Compositor,
    cursor: Option<CursorState<E>>,
    hovered: HoverTarget<E>,
}

impl<E, F> fmt::Debug for Session<E, F>
where
    E: Copy + Eq + core::hash::Hash + fmt::Debug,
    F: SurfaceFactory,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("targets", &self.registry.len())
            .field("surfaces", &self.layers.is_some())
            .field("defaults", &self.defaults)
            .field("scroll", &self.scroll)
            .field("compositor", &self.compositor)
            .field("cursor", &self.cursor)
            .field("hovered", &self.hovered)
            .finish_non_exhaustive()
    }
}

impl<E, F> Session<E, F>
where
    E: Copy + Eq + core::hash::Hash + fmt::Debug,
    F: SurfaceFactory,
{
    /// A session with no targets and no surfaces yet.
    ///
    /// `options.defaults` is not validated; out-of-range values are clamped when resolved.
    pub fn new(factory: F, options: SessionOptions) -> Self {
        Self {
            factory,
            layers: None,
            registry: Registry::new(),
            defaults: options.defaults,
            scroll: options.scroll,
            compositor: Compositor::new(options.occluder_clip),
            cursor: None,
            hovered: HoverTarget::Root,
        }
    }

    /// Provision the overlay surfaces, or refresh their size and stacking order.
    ///
    /// Safe to call any number of times.
    pub fn create_effect_surfaces<H>(&mut self, host: &H)
    where
        H: Document<Element = E>,
    {
        let viewport = host.viewport();
        let order = resolve(&TargetConfig::new(), &self.defaults).layer_order;
        let layers = self.layers.get_or_insert_with(|| {
            tracing::debug!("creating reveal surfaces");
            RevealLayers::create(&mut self.factory)
        });
        layers.configure(viewport, order);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            order,
            "configured reveal surfaces"
        );
    }

    fn ensure_surfaces<H>(&mut self, host: &H)
    where
        H: Document<Element = E>,
    {
        if self.layers.is_none() {
            self.create_effect_surfaces(host);
        }
    }

    /// Register `element`, replacing any previous override.
    ///
    /// Provisions surfaces on first use. Returns `Ok(true)` if the element was newly added.
    pub fn register_target<H>(
        &mut self,
        host: &mut H,
        element: E,
        config: Option<TargetConfig>,
    ) -> Result<bool, ConfigError>
    where
        H: MutationSource<Element = E>,
    {
        if let Some(config) = &config {
            config.validate().inspect_err(|error| {
                tracing::warn!(?element, %error, "rejected reveal target config");
            })?;
        }
        self.ensure_surfaces(host);
        Ok(self.registry.register(host, element, config))
    }

    /// Register several targets.
    ///
    /// All overrides are validated first; on error nothing is registered.
    /// Returns how many elements were newly added.
    pub fn register_targets<H, I>(&mut self, host: &mut H, targets: I) -> Result<usize, ConfigError>
    where
        H: MutationSource<Element = E>,
        I: IntoIterator<Item = (E, Option<TargetConfig>)>,
    {
        let targets: Vec<_> = targets.into_iter().collect();
        for (element, config) in &targets {
            if let Some(config) = config {
                config.validate().inspect_err(|error| {
                    tracing::warn!(?element, %error, "rejected reveal target config");
                })?;
            }
        }
        self.ensure_surfaces(host);
        Ok(self.registry.register_many(host, targets))
    }

    /// Unregister `element`. Returns `true` if it was registered.
    pub fn unregister_target<H>(&mut self, host: &mut H, element: E) -> bool
    where
        H: MutationSource<Element = E>,
    {
        if self.hovered == HoverTarget::Target(element) {
            self.hovered = HoverTarget::Root;
        }
        self.registry.unregister(host, element).is_some()
    }

    /// Unregister everything, forget occluders and clear both layers.
    pub fn unregister_all<H>(&mut self, host: &mut H)
    where
        H: MutationSource<Element = E>,
    {
        self.registry.unregister_all(host);
        self.hovered = HoverTarget::Root;
        self.clear_drawing();
    }

    /// Mark `element` as an occluder. Returns `true` if it was not one already.
    ///
    /// Provisions surfaces on first use.
    pub fn mark_occluder<H>(&mut self, host: &H, element: E) -> bool
    where
        H: Document<Element = E>,
    {
        self.ensure_surfaces(host);
        self.registry.mark_occluder(element)
    }

    /// Mark several occluders. Returns how many were new.
    pub fn mark_occluders<H>(&mut self, host: &H, elements: impl IntoIterator<Item = E>) -> usize
    where
        H: Document<Element = E>,
    {
        self.ensure_surfaces(host);
        elements
            .into_iter()
            .map(|e| usize::from(self.registry.mark_occluder(e)))
            .sum()
    }

    /// Merge `config` into the session defaults and refresh the surfaces.
    ///
    /// Per-target overrides are left as they are.
    pub fn set_global_config<H>(&mut self, host: &H, config: &TargetConfig) -> Result<(), ConfigError>
    where
        H: Document<Element = E>,
    {
        config.validate().inspect_err(|error| {
            tracing::warn!(%error, "rejected global reveal config");
        })?;
        self.defaults.merge(config);
        tracing::debug!(defaults = ?self.defaults, "updated global reveal config");
        if self.layers.is_some() {
            self.create_effect_surfaces(host);
        }
        Ok(())
    }

    /// Clear both layers, keeping registrations.
    pub fn clear_drawing(&mut self) {
        if let Some(layers) = &mut self.layers {
            layers.clear();
        }
    }

    /// Pointer moved to `point` over `raw_target`.
    ///
    /// Returns `None` while no surface exists (nothing registered yet).
    pub fn pointer_move<H>(
        &mut self,
        host: &H,
        raw_target: Option<E>,
        point: Point,
    ) -> Option<FrameSummary>
    where
        H: Document<Element = E>,
    {
        self.cursor = Some(CursorState { point, raw_target });
        self.hovered = resolve_hover(&self.registry, host, raw_target);
        self.paint(host, ClearMode::Full)
    }

    /// The page scrolled. Repaints from the last cursor according to the scroll policy.
    pub fn scroll<H>(&mut self, host: &H) -> Option<FrameSummary>
    where
        H: Document<Element = E>,
    {
        match self.scroll {
            ScrollPolicy::Redraw => self.redraw(host, ClearMode::Full),
            ScrollPolicy::BorderOnly => self.redraw(host, ClearMode::BorderOnly),
        }
    }

    /// The viewport changed size. Reconfigures the surfaces and repaints.
    pub fn resize<H>(&mut self, host: &H) -> Option<FrameSummary>
    where
        H: Document<Element = E>,
    {
        if self.layers.is_some() {
            self.create_effect_surfaces(host);
        }
        self.redraw(host, ClearMode::Full)
    }

    /// A watcher subscription fired.
    ///
    /// Evicts every detached target. If the watcher's own target was evicted
    /// nothing is repainted. Otherwise the frame is repainted from the last
    /// cursor: fully when the cursor lies inside the owner (or the hovered
    /// target was evicted), else only the border layer.
    ///
    /// Subscriptions the registry does not know are ignored.
    pub fn handle_mutation<H>(
        &mut self,
        host: &mut H,
        subscription: SubscriptionId,
    ) -> Option<FrameSummary>
    where
        H: MutationSource<Element = E>,
    {
        let Some(owner) = self.registry.owner_of(subscription) else {
            tracing::trace!(?subscription, "ignoring unknown reveal watcher");
            return None;
        };
        let evicted = self.registry.evict_detached(host);
        let hovered_evicted = self
            .hovered
            .target()
            .is_some_and(|t| evicted.contains(&t));
        if hovered_evicted {
            self.hovered = HoverTarget::Root;
        }
        if evicted.contains(&owner) {
            return None;
        }
        let cursor = self.cursor?;
        let inside = host
            .bounding_rect(owner)
            .is_some_and(|r| point_in_rect(cursor.point, r));
        let mode = if inside || hovered_evicted {
            ClearMode::Full
        } else {
            ClearMode::BorderOnly
        };
        self.redraw(host, mode)
    }

    /// Repaint from the last cursor.
    ///
    /// A full redraw re-resolves the hover target from the last raw target
    /// and drops it when its current box no longer contains the cursor.
    /// Without a cursor the layers are only cleared.
    pub fn redraw<H>(&mut self, host: &H, mode: ClearMode) -> Option<FrameSummary>
    where
        H: Document<Element = E>,
    {
        let Some(cursor) = self.cursor else {
            let layers = self.layers.as_mut()?;
            layers.border.clear();
            if mode == ClearMode::Full {
                layers.hover.clear();
            }
            return Some(FrameSummary::default());
        };
        if mode == ClearMode::Full {
            self.hovered = match resolve_hover(&self.registry, host, cursor.raw_target) {
                HoverTarget::Target(t)
                    if !host
                        .bounding_rect(t)
                        .is_some_and(|r| point_in_rect(cursor.point, r)) =>
                {
                    HoverTarget::Root
                }
                other => other,
            };
        }
        self.paint(host, mode)
    }

    fn paint<H>(&mut self, host: &H, clear: ClearMode) -> Option<FrameSummary>
    where
        H: Document<Element = E>,
    {
        let cursor = self.cursor?;
        let layers = self.layers.as_mut()?;
        let frame = Frame {
            cursor: cursor.point,
            hovered: self.hovered,
            clear,
        };
        Some(
            self.compositor
                .paint(layers, host, &self.registry, &self.defaults, &frame),
        )
    }

    /// Release every watcher and hand back the surfaces.
    pub fn destroy<H>(mut self, host: &mut H) -> Option<RevealLayers<F::Surface>>
    where
        H: MutationSource<Element = E>,
    {
        self.registry.unregister_all(host);
        tracing::debug!("destroyed reveal session");
        self.layers.take()
    }

    /// The target registry.
    pub fn registry(&self) -> &Registry<E> {
        &self.registry
    }

    /// The overlay surfaces, once provisioned.
    pub fn layers(&self) -> Option<&RevealLayers<F::Surface>> {
        self.layers.as_ref()
    }

    /// Mutable access to the overlay surfaces, e.g. to read back rendered pixels.
    pub fn layers_mut(&mut self) -> Option<&mut RevealLayers<F::Surface>> {
        self.layers.as_mut()
    }

    /// The last cursor state.
    pub fn cursor(&self) -> Option<&CursorState<E>> {
        self.cursor.as_ref()
    }

    /// The current hover target.
    pub fn hovered(&self) -> HoverTarget<E> {
        self.hovered
    }

    /// The session defaults.
    pub fn global_config(&self) -> &TargetConfig {
        &self.defaults
    }

    /// The surface factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }
}
