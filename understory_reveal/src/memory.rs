// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory host document.
//!
//! [`MemoryDocument`] implements [`Document`] and [`MutationSource`] over a
//! plain node tree with absolute viewport-space boxes. It backs the tests,
//! the demos and the benchmarks, and is a reasonable starting point for
//! hosts that mirror their own layout into the engine.
//!
//! ## Identifiers
//!
//! Nodes are addressed by generational [`NodeId`]s. Removing a node frees
//! its slot; a later insert reusing the slot bumps its generation so the old
//! id stays stale forever and never aliases the new node.
//!
//! ## Notifications
//!
//! Every structural or attribute change records which subscriptions observe
//! the changed node. Collect them with
//! [`take_notifications`](MemoryDocument::take_notifications) and forward each
//! to [`Session::handle_mutation`](crate::Session::handle_mutation).
//! Scrolling and viewport changes are not mutations.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashMap;
use kurbo::{Rect, Size, Vec2};

use crate::host::{BorderStyle, Document, MutationSource, SubscriptionId};

/// Identifier of a node in a [`MemoryDocument`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    live: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Rect,
    border: Option<BorderStyle>,
}

/// In-memory [`Document`] with structural mutation notifications.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    free: Vec<u32>,
    root: NodeId,
    viewport: Size,
    subscriptions: HashMap<SubscriptionId, NodeId>,
    next_subscription: u64,
    pending: Vec<SubscriptionId>,
}

impl MemoryDocument {
    /// A document whose root covers a viewport of `viewport`.
    pub fn new(viewport: Size) -> Self {
        let root = Node {
            generation: 0,
            live: true,
            parent: None,
            children: Vec::new(),
            rect: viewport.to_rect(),
            border: None,
        };
        Self {
            nodes: vec![root],
            free: Vec::new(),
            root: NodeId::new(0, 0),
            viewport,
            subscriptions: HashMap::new(),
            next_subscription: 0,
            pending: Vec::new(),
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .filter(|n| n.live && n.generation == id.1)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())
            .filter(|n| n.live && n.generation == id.1)
    }

    /// Whether `id` refers to a live node (attached or not).
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Insert a new node with box `rect` as the last child of `parent`.
    ///
    /// If `parent` is stale the node is created detached.
    pub fn insert(&mut self, parent: NodeId, rect: Rect) -> NodeId {
        let parent = self.is_alive(parent).then_some(parent);
        let node = Node {
            generation: 0,
            live: true,
            parent,
            children: Vec::new(),
            rect,
            border: None,
        };
        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.nodes[idx as usize];
            let generation = slot.generation.wrapping_add(1);
            *slot = Node { generation, ..node };
            NodeId::new(idx, generation)
        } else {
            let idx = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
            self.nodes.push(node);
            NodeId::new(idx, 0)
        };
        if let Some(p) = parent {
            if let Some(pn) = self.node_mut(p) {
                pn.children.push(id);
            }
            self.notify(p);
        }
        id
    }

    /// Remove `id` and its whole subtree. Their ids become stale.
    ///
    /// The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || !self.is_alive(id) {
            return;
        }
        let parent = self.unlink(id);
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(n) = self.node_mut(cur) {
                n.live = false;
                n.parent = None;
                stack.append(&mut n.children);
                self.free.push(cur.0);
            }
        }
        if let Some(p) = parent {
            self.notify(p);
        }
    }

    /// Disconnect `id` from its parent. The subtree stays alive but detached.
    pub fn detach(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(p) = self.unlink(id) {
            self.notify(p);
        }
    }

    /// Append a detached node to `parent`.
    ///
    /// Nodes that already have a parent, stale ids, and moves that would make
    /// a node its own ancestor are ignored.
    pub fn reattach(&mut self, id: NodeId, parent: NodeId) {
        if id == self.root
            || !self.is_alive(parent)
            || self.node(id).is_none_or(|n| n.parent.is_some())
            || self.contains(id, parent)
        {
            return;
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = Some(parent);
        }
        if let Some(pn) = self.node_mut(parent) {
            pn.children.push(id);
        }
        self.notify(parent);
    }

    /// Replace the box of `id`.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(n) = self.node_mut(id) {
            n.rect = rect;
            self.notify(id);
        }
    }

    /// Replace the computed border style of `id`.
    pub fn set_border(&mut self, id: NodeId, border: BorderStyle) {
        if let Some(n) = self.node_mut(id) {
            n.border = Some(border);
            self.notify(id);
        }
    }

    /// Scroll the page content: every box except the root moves by `-delta`.
    pub fn scroll_by(&mut self, delta: Vec2) {
        let root = self.root.idx();
        for (idx, n) in self.nodes.iter_mut().enumerate() {
            if n.live && idx != root {
                n.rect = n.rect - delta;
            }
        }
    }

    /// Resize the viewport (and the root box).
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let root = self.root;
        if let Some(n) = self.node_mut(root) {
            n.rect = viewport.to_rect();
        }
    }

    /// Drain the subscriptions that observed a change since the last call.
    ///
    /// Each subscription appears at most once per drain, in the order of the first change it saw.
    pub fn take_notifications(&mut self) -> Vec<SubscriptionId> {
        core::mem::take(&mut self.pending)
    }

    /// Number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn unlink(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.node_mut(id)?.parent.take()?;
        if let Some(pn) = self.node_mut(parent) {
            pn.children.retain(|&c| c != id);
        }
        Some(parent)
    }

    fn notify(&mut self, changed: NodeId) {
        let mut hits: Vec<SubscriptionId> = self
            .subscriptions
            .iter()
            .filter(|&(id, &observed)| !self.pending.contains(id) && self.contains(observed, changed))
            .map(|(&id, _)| id)
            .collect();
        hits.sort_unstable();
        self.pending.extend(hits);
    }

    /// Ancestor chain of `id`, outermost first, including `id`.
    fn chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.node(id).map(|_| id);
        while let Some(c) = cur {
            out.push(c);
            cur = self.node(c).and_then(|n| n.parent);
        }
        out.reverse();
        out
    }
}

impl Document for MemoryDocument {
    type Element = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn is_attached(&self, element: NodeId) -> bool {
        self.chain(element).first() == Some(&self.root)
    }

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.node(element)?.parent
    }

    fn bounding_rect(&self, element: NodeId) -> Option<Rect> {
        self.node(element).map(|n| n.rect)
    }

    fn border_style(&self, element: NodeId) -> Option<BorderStyle> {
        self.node(element)?.border
    }

    fn document_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let ca = self.chain(a);
        let cb = self.chain(b);
        match (ca.first(), cb.first()) {
            (Some(ra), Some(rb)) if ra == rb => {}
            // Different trees (or stale ids): fall back to slot order.
            _ => return (ca.first().unwrap_or(&a).0, a.0).cmp(&(cb.first().unwrap_or(&b).0, b.0)),
        }
        let shared = ca.iter().zip(&cb).take_while(|(x, y)| x == y).count();
        match (ca.get(shared), cb.get(shared)) {
            // One is an ancestor of the other; ancestors come first in preorder.
            (None, _) => Ordering::Less,
            (_, None) => Ordering::Greater,
            (Some(&xa), Some(&xb)) => {
                let siblings = self
                    .node(ca[shared - 1])
                    .map(|n| n.children.as_slice())
                    .unwrap_or_default();
                let pa = siblings.iter().position(|&c| c == xa);
                let pb = siblings.iter().position(|&c| c == xb);
                pa.cmp(&pb)
            }
        }
    }
}

impl MutationSource for MemoryDocument {
    fn subscribe(&mut self, subtree_root: NodeId) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, subtree_root);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(&id);
        self.pending.retain(|&p| p != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> MemoryDocument {
        MemoryDocument::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn removed_ids_go_stale_and_slots_are_reused() {
        let mut d = doc();
        let root = d.root();
        let a = d.insert(root, Rect::new(0.0, 0.0, 10.0, 10.0));
        d.remove(a);
        assert!(!d.is_alive(a));
        assert_eq!(d.bounding_rect(a), None);
        let b = d.insert(root, Rect::new(5.0, 5.0, 20.0, 20.0));
        assert_eq!(a.0, b.0, "slot should be reused");
        assert_ne!(a, b, "generation should differ");
        assert!(!d.is_attached(a));
        assert!(d.is_attached(b));
    }

    #[test]
    fn remove_takes_the_subtree() {
        let mut d = doc();
        let root = d.root();
        let a = d.insert(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = d.insert(a, Rect::new(10.0, 10.0, 20.0, 20.0));
        d.remove(a);
        assert!(!d.is_alive(b));
    }

    #[test]
    fn detach_and_reattach() {
        let mut d = doc();
        let root = d.root();
        let a = d.insert(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = d.insert(a, Rect::new(10.0, 10.0, 20.0, 20.0));
        d.detach(a);
        assert!(d.is_alive(b));
        assert!(!d.is_attached(a));
        assert!(!d.is_attached(b));
        d.reattach(a, root);
        assert!(d.is_attached(b));
        // A node cannot become its own ancestor.
        d.detach(a);
        d.reattach(a, b);
        assert_eq!(d.parent(a), None);
    }

    #[test]
    fn containment_and_depth() {
        let mut d = doc();
        let root = d.root();
        let a = d.insert(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = d.insert(a, Rect::new(10.0, 10.0, 20.0, 20.0));
        assert!(d.contains(a, b));
        assert!(d.contains(b, b));
        assert!(!d.contains(b, a));
        assert_eq!(d.depth(root), 0);
        assert_eq!(d.depth(b), 2);
    }

    #[test]
    fn document_order_is_preorder() {
        let mut d = doc();
        let root = d.root();
        let a = d.insert(root, Rect::ZERO);
        let a1 = d.insert(a, Rect::ZERO);
        let b = d.insert(root, Rect::ZERO);
        assert_eq!(d.document_order(a, a1), Ordering::Less);
        assert_eq!(d.document_order(a1, b), Ordering::Less);
        assert_eq!(d.document_order(b, a), Ordering::Greater);
        assert_eq!(d.document_order(root, a1), Ordering::Less);
        assert_eq!(d.document_order(b, b), Ordering::Equal);
    }

    #[test]
    fn notifications_reach_subscribers_of_enclosing_subtrees() {
        let mut d = doc();
        let root = d.root();
        let a = d.insert(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = d.insert(root, Rect::new(200.0, 0.0, 300.0, 100.0));
        let sa = d.subscribe(a);
        let sb = d.subscribe(b);
        let a1 = d.insert(a, Rect::new(10.0, 10.0, 20.0, 20.0));
        d.set_rect(a1, Rect::new(10.0, 10.0, 30.0, 30.0));
        assert_eq!(d.take_notifications(), vec![sa]);
        d.set_border(b, BorderStyle::square(1.0));
        assert_eq!(d.take_notifications(), vec![sb]);
        assert!(d.take_notifications().is_empty());
    }

    #[test]
    fn unsubscribe_is_idempotent_and_drops_pending() {
        let mut d = doc();
        let root = d.root();
        let s = d.subscribe(root);
        d.insert(root, Rect::ZERO);
        d.unsubscribe(s);
        d.unsubscribe(s);
        assert_eq!(d.subscription_count(), 0);
        assert!(d.take_notifications().is_empty());
    }

    #[test]
    fn scroll_moves_content_but_not_root() {
        let mut d = doc();
        let root = d.root();
        let a = d.insert(root, Rect::new(0.0, 100.0, 50.0, 150.0));
        d.scroll_by(Vec2::new(0.0, 40.0));
        assert_eq!(d.bounding_rect(a), Some(Rect::new(0.0, 60.0, 50.0, 110.0)));
        assert_eq!(d.bounding_rect(root), Some(Rect::new(0.0, 0.0, 800.0, 600.0)));
    }
}
