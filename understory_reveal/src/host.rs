// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host environment seams.
//!
//! The engine never owns page elements. It talks to the host through
//! [`Document`] (geometry and structure, queried fresh on every call) and
//! [`MutationSource`] (structural change subscriptions). Element handles are
//! opaque and validated lazily: a handle whose element was removed must
//! answer `false` from [`Document::is_attached`] and `None` from
//! [`Document::bounding_rect`] rather than panic.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Rect, RoundedRectRadii, Size};

/// Computed border style of an element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BorderStyle {
    /// Computed border width in pixels. Zero means "no border of its own".
    pub width: f64,
    /// Computed corner radii.
    pub radii: RoundedRectRadii,
}

impl BorderStyle {
    /// A border of `width` with square corners.
    pub fn square(width: f64) -> Self {
        Self {
            width,
            radii: RoundedRectRadii::from_single_radius(0.0),
        }
    }
}

/// Read-only view of the host document.
pub trait Document {
    /// Opaque, non-owning element handle.
    type Element: Copy + Eq + Hash + Debug;

    /// The root element, used as the fallback hover target.
    fn root(&self) -> Self::Element;

    /// Current viewport size.
    fn viewport(&self) -> Size;

    /// Whether `element` is still live and connected to the document.
    fn is_attached(&self, element: Self::Element) -> bool;

    /// Parent of `element`, or `None` for the root and for stale handles.
    fn parent(&self, element: Self::Element) -> Option<Self::Element>;

    /// Current bounding box in viewport coordinates, or `None` for stale handles.
    fn bounding_rect(&self, element: Self::Element) -> Option<Rect>;

    /// Computed border width and radii, or `None` if unknown.
    fn border_style(&self, element: Self::Element) -> Option<BorderStyle>;

    /// Total document order (preorder) between two elements.
    fn document_order(&self, a: Self::Element, b: Self::Element) -> Ordering;

    /// Inclusive containment: `true` when `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: Self::Element, node: Self::Element) -> bool {
        let mut cur = Some(node);
        while let Some(e) = cur {
            if e == ancestor {
                return true;
            }
            cur = self.parent(e);
        }
        false
    }

    /// Number of ancestors of `element`.
    fn depth(&self, element: Self::Element) -> usize {
        let mut depth = 0;
        let mut cur = self.parent(element);
        while let Some(e) = cur {
            depth += 1;
            cur = self.parent(e);
        }
        depth
    }
}

/// Handle to a structural-mutation subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Structural change notifications.
///
/// A subscription observes the subtree rooted at the element passed to
/// [`subscribe`](MutationSource::subscribe). The host delivers notifications
/// by calling [`Session::handle_mutation`](crate::Session::handle_mutation)
/// with the returned id.
pub trait MutationSource: Document {
    /// Start observing the subtree under `subtree_root`.
    fn subscribe(&mut self, subtree_root: Self::Element) -> SubscriptionId;

    /// Stop observing. Calling this more than once, or with an unknown id, is a no-op.
    fn unsubscribe(&mut self, id: SubscriptionId);
}
