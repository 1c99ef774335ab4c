//! Side table of live iterators, bucketed by symbol.
//!
//! Every iterator the lazy path builds is recorded here under the symbol of
//! the node it expands, from creation until its consumer observes
//! exhaustion. A rule update looks its key up in this table to find exactly
//! the in-flight iterators whose pending frontier the change governs.
//!
//! Buckets hold [`Weak`] handles: the registry never keeps an abandoned
//! iterator alive, and entries whose owner dropped the iterator
//! mid-traversal are swept the next time their bucket is touched.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::lazy::{ExpandIter, IterHandle};
use crate::node::{Node, Symbol};

/// A live `(node, iterator)` pairing.
struct Registration<K, D, V> {
    node: Node<K, D, V>,
    iter: Weak<RefCell<ExpandIter<K, D, V>>>,
}

impl<K, D, V> Registration<K, D, V> {
    fn matches(&self, iter: &IterHandle<K, D, V>) -> bool {
        self.iter.as_ptr() == Rc::as_ptr(iter)
    }
}

/// Registry of all currently live iterators, keyed by node symbol.
pub(crate) struct Registry<K, D, V> {
    buckets: FxHashMap<K, Vec<Registration<K, D, V>>>,
}

impl<K: Symbol, D: Clone, V: Clone> Registry<K, D, V> {
    pub(crate) fn new() -> Self {
        Registry { buckets: FxHashMap::default() }
    }

    /// Record `iter` as the live expansion of `node`.
    pub(crate) fn register(&mut self, node: &Node<K, D, V>, iter: &IterHandle<K, D, V>) {
        let bucket = self.buckets.entry(node.key.clone()).or_default();
        bucket.retain(|reg| reg.iter.strong_count() > 0);
        bucket.push(Registration { node: node.clone(), iter: Rc::downgrade(iter) });
    }

    /// Remove the registration pairing `key` with this exact iterator
    /// handle. Matching is by iterator identity, never by node value.
    pub(crate) fn unregister(&mut self, key: &K, iter: &IterHandle<K, D, V>) {
        if let Some(bucket) = self.buckets.get_mut(key) {
            if let Some(position) = bucket.iter().rposition(|reg| reg.matches(iter)) {
                bucket.remove(position);
            }
            if bucket.is_empty() {
                self.buckets.remove(key);
            }
        }
    }

    /// Upgrade and return the live registrations under `key`, dropping any
    /// whose iterator has been released by its owner.
    pub(crate) fn collect_live(&mut self, key: &K) -> Vec<(Node<K, D, V>, IterHandle<K, D, V>)> {
        let mut live = Vec::new();
        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.retain(|reg| match reg.iter.upgrade() {
                Some(iter) => {
                    live.push((reg.node.clone(), iter));
                    true
                }
                None => false,
            });
            if bucket.is_empty() {
                self.buckets.remove(key);
            }
        }
        live
    }

    /// Upgrade and return every live registration in the table.
    pub(crate) fn collect_all_live(&mut self) -> Vec<(Node<K, D, V>, IterHandle<K, D, V>)> {
        let mut live = Vec::new();
        self.buckets.retain(|_, bucket| {
            bucket.retain(|reg| match reg.iter.upgrade() {
                Some(iter) => {
                    live.push((reg.node.clone(), iter));
                    true
                }
                None => false,
            });
            !bucket.is_empty()
        });
        live
    }

    /// Number of live registrations under `key`.
    pub(crate) fn live_count(&self, key: &K) -> usize {
        self.buckets
            .get(key)
            .map_or(0, |bucket| bucket.iter().filter(|reg| reg.iter.strong_count() > 0).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lazy::SeriesIter;

    fn handle(nodes: Vec<Node<i32, (), i32>>) -> IterHandle<i32, (), i32> {
        Rc::new(RefCell::new(ExpandIter::Series(SeriesIter::new(nodes))))
    }

    #[test]
    fn test_unregister_matches_on_identity() {
        let mut registry = Registry::new();
        let node = Node::plain(1, 10);
        let first = handle(vec![node.clone()]);
        let second = handle(vec![node.clone()]);
        registry.register(&node, &first);
        registry.register(&node, &second);
        assert_eq!(registry.live_count(&1), 2);

        registry.unregister(&1, &second);
        let live = registry.collect_live(&1);
        assert_eq!(live.len(), 1);
        assert!(Rc::ptr_eq(&live[0].1, &first));
    }

    #[test]
    fn test_dropped_iterators_are_swept() {
        let mut registry = Registry::new();
        let node = Node::plain(1, 10);
        let iter = handle(vec![node.clone()]);
        registry.register(&node, &iter);
        drop(iter);
        assert_eq!(registry.live_count(&1), 0);
        assert!(registry.collect_live(&1).is_empty());
    }

    #[test]
    fn test_register_prunes_dead_entries_in_bucket() {
        let mut registry = Registry::new();
        let node = Node::plain(1, 10);
        for _ in 0..8 {
            let iter = handle(vec![node.clone()]);
            registry.register(&node, &iter);
        }
        let survivor = handle(vec![node.clone()]);
        registry.register(&node, &survivor);
        assert_eq!(registry.collect_live(&1).len(), 1);
    }

    #[test]
    fn test_registrations_bucket_by_key_not_value() {
        let mut registry = Registry::new();
        let one = Node::plain(7, 1);
        let other = Node::plain(7, 2);
        let first = handle(vec![one.clone()]);
        let second = handle(vec![other.clone()]);
        registry.register(&one, &first);
        registry.register(&other, &second);
        assert_eq!(registry.live_count(&7), 2);
    }
}
