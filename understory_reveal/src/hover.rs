// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover resolution: from a raw event target to the effective hovered target.

use crate::host::Document;
use crate::registry::Registry;

/// Outcome of hover resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HoverTarget<E> {
    /// A registered target is hovered.
    Target(E),
    /// The raw target is an occluder with no registered ancestor.
    Occluder(E),
    /// Nothing registered is under the cursor.
    Root,
}

impl<E: Copy> HoverTarget<E> {
    /// The hovered registered target, if any.
    #[must_use]
    pub fn target(&self) -> Option<E> {
        match *self {
            Self::Target(e) => Some(e),
            Self::Occluder(_) | Self::Root => None,
        }
    }
}

/// Resolve the effective hovered target for `raw`.
///
/// 1. A registered, attached `raw` is hovered itself.
/// 2. Otherwise the innermost attached registered element containing `raw`
///    is hovered. It is found by scanning the registry and keeping each
///    match that lies inside the current best, progressively narrowing.
/// 3. Otherwise `raw` resolves to [`HoverTarget::Occluder`] when it is an
///    occluder, else to [`HoverTarget::Root`].
///
/// Pure with respect to the registry and the document: equal inputs give
/// equal outputs.
pub fn resolve_hover<D: Document>(
    registry: &Registry<D::Element>,
    doc: &D,
    raw: Option<D::Element>,
) -> HoverTarget<D::Element> {
    let Some(raw) = raw.filter(|&r| doc.is_attached(r)) else {
        return HoverTarget::Root;
    };
    if registry.has(raw) {
        return HoverTarget::Target(raw);
    }
    let mut best: Option<D::Element> = None;
    for target in registry.iter() {
        let e = target.element();
        if doc.is_attached(e)
            && doc.contains(e, raw)
            && best.is_none_or(|b| doc.contains(b, e))
        {
            best = Some(e);
        }
    }
    match best {
        Some(e) => HoverTarget::Target(e),
        None if registry.is_occluder(raw) => HoverTarget::Occluder(raw),
        None => HoverTarget::Root,
    }
}
