// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_reveal --heading-base-level=0

//! Understory Reveal: a spotlight reveal effect engine.
//!
//! A soft circular light follows the cursor. The registered element under it
//! is lit (the *hover fill*) and nearby registered elements get a border that
//! fades with distance from the cursor (the *border mask*). This crate holds
//! the engine behind that effect:
//!
//! - [`resolve_hover`] finds the effective hovered target: the raw event
//!   target if it is registered, else its innermost registered ancestor.
//! - [`select_candidates`] finds every target overlapping the cursor's
//!   influence square, ordered shallow to deep.
//! - [`resolve`] merges per-target overrides with session defaults.
//! - [`Compositor`] paints both layers with source-over, destination-in and
//!   destination-out operations.
//! - [`Session`] ties it together behind event entry points, and evicts
//!   targets that leave the document when a watcher fires.
//!
//! The host environment is abstracted by [`Document`] and [`MutationSource`]
//! (geometry and structural notifications) and by [`SurfaceFactory`] /
//! [`RevealSurface`] (the two overlay layers). [`MemoryDocument`] and
//! [`RecordingSurface`] implement those seams in memory.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size};
//! use understory_reveal::{
//!     Document, HoverTarget, MemoryDocument, RecordingFactory, Session, SessionOptions,
//! };
//!
//! let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
//! let card = doc.insert(doc.root(), Rect::new(100.0, 100.0, 300.0, 250.0));
//!
//! let mut session = Session::new(RecordingFactory::new(), SessionOptions::default());
//! session.register_target(&mut doc, card, None).unwrap();
//!
//! session.pointer_move(&doc, Some(card), Point::new(150.0, 150.0));
//! assert_eq!(session.hovered(), HoverTarget::Target(card));
//! assert!(!session.layers().unwrap().hover.is_blank());
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std`, `peniko/std` and `tracing/std`.
//! - `libm`: use `libm` for floating point math in `no_std` builds.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod candidates;
mod compositor;
mod config;
mod error;
mod geometry;
mod host;
mod hover;
mod memory;
mod registry;
mod session;
mod surface;

pub use candidates::{Candidate, select_candidates};
pub use compositor::{ClearMode, Compositor, Frame, FrameSummary, radial_brush};
pub use config::{
    BorderColors, BorderPlacement, ColorTransform, DEFAULT_BORDER_WIDTH, DEFAULT_HOVER_COLOR,
    DEFAULT_HOVER_RADIUS, DEFAULT_LAYER_ORDER, EffectiveConfig, OccluderClip, RevealEffect,
    ScrollPolicy, SessionOptions, TargetConfig, resolve,
};
pub use error::ConfigError;
pub use geometry::{
    PATH_TOLERANCE, Shape, clamp_radii, influence_square, point_in_rect, rects_overlap,
    rounded_rect_path,
};
pub use host::{BorderStyle, Document, MutationSource, SubscriptionId};
pub use hover::{HoverTarget, resolve_hover};
pub use memory::{MemoryDocument, NodeId};
pub use registry::{Registry, Target};
pub use session::{CursorState, Session};
pub use surface::{
    LayerRole, RecordingFactory, RecordingSurface, RevealLayers, RevealSurface, SurfaceFactory,
    SurfaceOp,
};
