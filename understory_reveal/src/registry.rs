// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target registry.
//!
//! [`Registry`] tracks which elements take part in the reveal effect, their
//! per-target option overrides, which elements occlude their descendants, and
//! the structural watcher that belongs to each target.
//!
//! Every target owns exactly one watcher, subscribed on the target's parent
//! subtree (or on the target itself when it has no parent). The watcher lives
//! exactly as long as the registry entry. The reverse map from subscription
//! to owner routes notifications back to their target.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::config::TargetConfig;
use crate::host::{MutationSource, SubscriptionId};

/// A registered element plus its optional option override.
#[derive(Clone, Debug, PartialEq)]
pub struct Target<E> {
    element: E,
    config: Option<TargetConfig>,
}

impl<E: Copy> Target<E> {
    /// The element handle.
    #[must_use]
    #[inline]
    pub fn element(&self) -> E {
        self.element
    }

    /// The per-target override, if any.
    #[must_use]
    #[inline]
    pub fn config(&self) -> Option<&TargetConfig> {
        self.config.as_ref()
    }
}

/// Registered targets, occluders and their watchers.
#[derive(Clone, Debug)]
pub struct Registry<E> {
    targets: HashMap<E, Target<E>>,
    occluders: HashSet<E>,
    watchers: HashMap<E, SubscriptionId>,
    owners: HashMap<SubscriptionId, E>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            targets: HashMap::new(),
            occluders: HashSet::new(),
            watchers: HashMap::new(),
            owners: HashMap::new(),
        }
    }
}

impl<E: Copy + Eq + Hash + Debug> Registry<E> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `element` with an optional override.
    ///
    /// Re-registering replaces the override (last write wins) and keeps the
    /// existing watcher. Returns `true` if the element was newly added.
    pub fn register<M>(
        &mut self,
        source: &mut M,
        element: E,
        config: Option<TargetConfig>,
    ) -> bool
    where
        M: MutationSource<Element = E>,
    {
        if let Some(existing) = self.targets.get_mut(&element) {
            existing.config = config;
            tracing::debug!(?element, "updated reveal target");
            return false;
        }
        let watched = source.parent(element).unwrap_or(element);
        let watcher = source.subscribe(watched);
        self.targets.insert(element, Target { element, config });
        self.watchers.insert(element, watcher);
        self.owners.insert(watcher, element);
        tracing::debug!(?element, ?watcher, "registered reveal target");
        true
    }

    /// Register every `(element, override)` pair. Returns how many were new.
    pub fn register_many<M, I>(&mut self, source: &mut M, targets: I) -> usize
    where
        M: MutationSource<Element = E>,
        I: IntoIterator<Item = (E, Option<TargetConfig>)>,
    {
        let mut added = 0;
        for (element, config) in targets {
            if self.register(source, element, config) {
                added += 1;
            }
        }
        added
    }

    /// Remove `element` and release its watcher.
    pub fn unregister<M>(&mut self, source: &mut M, element: E) -> Option<Target<E>>
    where
        M: MutationSource<Element = E>,
    {
        let target = self.targets.remove(&element)?;
        if let Some(watcher) = self.watchers.remove(&element) {
            self.owners.remove(&watcher);
            source.unsubscribe(watcher);
        }
        tracing::debug!(?element, "unregistered reveal target");
        Some(target)
    }

    /// Remove every target and occluder and release every watcher.
    pub fn unregister_all<M>(&mut self, source: &mut M)
    where
        M: MutationSource<Element = E>,
    {
        for (_, watcher) in self.watchers.drain() {
            source.unsubscribe(watcher);
        }
        let count = self.targets.len();
        self.targets.clear();
        self.occluders.clear();
        self.owners.clear();
        tracing::debug!(count, "unregistered all reveal targets");
    }

    /// Mark `element` as clipping the effect of its descendants.
    ///
    /// Returns `true` if it was not already an occluder.
    pub fn mark_occluder(&mut self, element: E) -> bool {
        self.occluders.insert(element)
    }

    /// Whether `element` is a known occluder.
    #[must_use]
    #[inline]
    pub fn is_occluder(&self, element: E) -> bool {
        self.occluders.contains(&element)
    }

    /// Whether `element` is registered.
    #[must_use]
    #[inline]
    pub fn has(&self, element: E) -> bool {
        self.targets.contains_key(&element)
    }

    /// The registry entry for `element`.
    #[must_use]
    pub fn get(&self, element: E) -> Option<&Target<E>> {
        self.targets.get(&element)
    }

    /// Number of registered targets.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no target is registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterate over registered targets in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Target<E>> + '_ {
        self.targets.values()
    }

    /// The target that owns `subscription`.
    #[must_use]
    pub fn owner_of(&self, subscription: SubscriptionId) -> Option<E> {
        self.owners.get(&subscription).copied()
    }

    /// The watcher belonging to `element`.
    #[must_use]
    pub fn watcher_of(&self, element: E) -> Option<SubscriptionId> {
        self.watchers.get(&element).copied()
    }

    /// Number of live watchers; always equal to [`len`](Self::len).
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Evict every target (and occluder) that is no longer attached.
    ///
    /// Returns the evicted targets.
    pub fn evict_detached<M>(&mut self, source: &mut M) -> Vec<E>
    where
        M: MutationSource<Element = E>,
    {
        let stale: Vec<E> = self
            .targets
            .keys()
            .copied()
            .filter(|&e| !source.is_attached(e))
            .collect();
        for &element in &stale {
            self.unregister(source, element);
        }
        self.occluders.retain(|&e| source.is_attached(e));
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "evicted detached reveal targets");
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Document;
    use crate::memory::{MemoryDocument, NodeId};
    use kurbo::{Rect, Size};

    fn doc_with_two() -> (MemoryDocument, NodeId, NodeId) {
        let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
        let root = doc.root();
        let a = doc.insert(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = doc.insert(a, Rect::new(10.0, 10.0, 50.0, 50.0));
        (doc, a, b)
    }

    #[test]
    fn register_then_unregister_round_trips() {
        let (mut doc, a, b) = doc_with_two();
        let mut reg = Registry::new();
        reg.register(&mut doc, a, None);
        let before_len = reg.len();
        let before_subs = doc.subscription_count();

        assert!(reg.register(&mut doc, b, Some(TargetConfig::new().with_hover_radius(10.0))));
        assert!(reg.unregister(&mut doc, b).is_some());

        assert_eq!(reg.len(), before_len, "target count should round-trip");
        assert!(!reg.has(b), "b should be gone");
        assert!(reg.get(b).is_none(), "b should have no entry");
        assert_eq!(doc.subscription_count(), before_subs, "watcher should be released");
        assert_eq!(reg.watcher_count(), reg.len(), "one watcher per target");
    }

    #[test]
    fn reregistering_replaces_config_without_second_watcher() {
        let (mut doc, a, _) = doc_with_two();
        let mut reg = Registry::new();
        assert!(reg.register(&mut doc, a, None));
        let watcher = reg.watcher_of(a);
        let cfg = TargetConfig::new().with_border_width(5.0);
        assert!(!reg.register(&mut doc, a, Some(cfg.clone())));
        assert_eq!(reg.len(), 1, "exactly one entry per element");
        assert_eq!(doc.subscription_count(), 1, "no duplicated watcher");
        assert_eq!(reg.watcher_of(a), watcher, "watcher kept");
        assert_eq!(reg.get(a).and_then(Target::config), Some(&cfg), "last write wins");
    }

    #[test]
    fn watcher_observes_parent_subtree() {
        let (mut doc, a, b) = doc_with_two();
        let mut reg = Registry::new();
        reg.register(&mut doc, b, None);
        let Some(watcher) = reg.watcher_of(b) else {
            panic!("b should have a watcher");
        };
        assert_eq!(reg.owner_of(watcher), Some(b));
        // A sibling insertion under `a` is a change in b's parent subtree.
        doc.insert(a, Rect::new(60.0, 60.0, 70.0, 70.0));
        assert_eq!(doc.take_notifications(), [watcher]);
    }

    #[test]
    fn unregister_all_releases_everything() {
        let (mut doc, a, b) = doc_with_two();
        let mut reg = Registry::new();
        reg.register_many(&mut doc, [(a, None), (b, None)]);
        reg.mark_occluder(a);
        reg.unregister_all(&mut doc);
        assert!(reg.is_empty(), "targets cleared");
        assert!(!reg.is_occluder(a), "occluders cleared");
        assert_eq!(doc.subscription_count(), 0, "watchers released");
    }

    #[test]
    fn evict_detached_drops_only_detached_targets() {
        let (mut doc, a, b) = doc_with_two();
        let root = doc.root();
        let c = doc.insert(root, Rect::new(200.0, 0.0, 300.0, 100.0));
        let mut reg = Registry::new();
        assert_eq!(reg.register_many(&mut doc, [(a, None), (b, None), (c, None)]), 3);
        reg.mark_occluder(a);
        doc.remove(a);
        let evicted = reg.evict_detached(&mut doc);
        assert_eq!(evicted.len(), 2, "a and its descendant b are gone");
        assert!(evicted.contains(&a) && evicted.contains(&b), "evicted set is a and b");
        assert!(reg.has(c), "c is still attached");
        assert!(!reg.is_occluder(a), "stale occluder dropped");
        assert_eq!(doc.subscription_count(), 1, "only c's watcher remains");
    }
}
