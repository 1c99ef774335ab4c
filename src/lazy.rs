//! Lazy iterator composition for the expansion tree.
//!
//! The lazy path streams a generation without materialising it. Two shapes
//! compose:
//! - `SeriesIter`: walks an already-computed sequence by index.
//! - `NestedIter`: flattens, depth-first and left-to-right, the lazy
//!   expansions of each element of a frontier sequence, instantiating each
//!   sub-iterator only when the cursor reaches it.
//!
//! Memory held at any point is one spine of active sub-iterators (bounded
//! by the remaining iteration depth), never the whole output, which grows
//! multiplicatively with depth and branching factor.
//!
//! Both shapes support `update_series`, the hook a rule update uses to
//! re-seed an in-flight iterator: the backing series is replaced and the
//! read position reset to the start. On a nested iterator only the frontier
//! is re-seeded; an already-active sub-iterator keeps draining, and the new
//! frontier takes over once it is exhausted.

use std::cell::RefCell;
use std::rc::Rc;

use crate::node::{Node, Symbol};
use crate::system::Shared;

/// Shared handle to a live iterator; the unit of registry bookkeeping.
pub(crate) type IterHandle<K, D, V> = Rc<RefCell<ExpandIter<K, D, V>>>;

/// Iterator over an already-computed series of nodes.
pub(crate) struct SeriesIter<K, D, V> {
    series: Vec<Node<K, D, V>>,
    index: usize,
}

impl<K: Symbol, D: Clone, V: Clone> SeriesIter<K, D, V> {
    pub(crate) fn new(series: Vec<Node<K, D, V>>) -> Self {
        SeriesIter { series, index: 0 }
    }

    fn has_next(&self) -> bool {
        self.index < self.series.len()
    }

    fn next(&mut self) -> Node<K, D, V> {
        let node = self.series[self.index].clone();
        self.index += 1;
        node
    }

    fn update_series(&mut self, series: Vec<Node<K, D, V>>) {
        self.series = series;
        self.index = 0;
    }
}

/// Flattened, depth-first concatenation of the lazy expansions of each
/// frontier element.
pub(crate) struct NestedIter<K, D, V> {
    shared: Rc<RefCell<Shared<K, D, V>>>,
    /// One level of expansion of this iterator's node, awaiting descent.
    frontier: SeriesIter<K, D, V>,
    /// Iterations left below each frontier element.
    remaining: u32,
    /// Sub-iterator the cursor is currently draining, with the frontier
    /// node it expands (kept for registry removal on exhaustion).
    active: Option<(Node<K, D, V>, IterHandle<K, D, V>)>,
    /// Memoised "a value is ready" flag; cleared by `next`.
    pending: bool,
}

impl<K: Symbol, D: Clone, V: Clone> NestedIter<K, D, V> {
    fn has_next(&mut self) -> bool {
        self.check_next();
        self.pending
    }

    fn next(&mut self) -> Node<K, D, V> {
        self.check_next();
        assert!(self.pending, "next() called on an exhausted iterator");
        self.pending = false;
        let iter = self.active.as_ref().map(|(_, iter)| Rc::clone(iter)).unwrap();
        let node = iter.borrow_mut().next();
        node
    }

    /// Advance until a value is pending or the frontier is exhausted.
    fn check_next(&mut self) {
        if self.pending {
            return;
        }
        loop {
            if self.active.is_none() {
                if !self.frontier.has_next() {
                    return;
                }
                let child = self.frontier.next();
                let iter = ltree(&self.shared, &child, self.remaining);
                self.shared.borrow_mut().registry.register(&child, &iter);
                self.active = Some((child, iter));
            }

            let iter = self.active.as_ref().map(|(_, iter)| Rc::clone(iter)).unwrap();
            if iter.borrow_mut().has_next() {
                self.pending = true;
                return;
            }

            let (node, iter) = self.active.take().unwrap();
            self.shared.borrow_mut().registry.unregister(&node.key, &iter);
        }
    }
}

/// A live iterator: either a concrete series or a nested composition.
pub(crate) enum ExpandIter<K, D, V> {
    Series(SeriesIter<K, D, V>),
    Nested(NestedIter<K, D, V>),
}

impl<K: Symbol, D: Clone, V: Clone> ExpandIter<K, D, V> {
    pub(crate) fn has_next(&mut self) -> bool {
        match self {
            ExpandIter::Series(series) => series.has_next(),
            ExpandIter::Nested(nested) => nested.has_next(),
        }
    }

    pub(crate) fn next(&mut self) -> Node<K, D, V> {
        match self {
            ExpandIter::Series(series) => series.next(),
            ExpandIter::Nested(nested) => nested.next(),
        }
    }

    /// Re-seed this iterator's backing series and rewind it to the start.
    pub(crate) fn update_series(&mut self, series: Vec<Node<K, D, V>>) {
        match self {
            ExpandIter::Series(inner) => inner.update_series(series),
            ExpandIter::Nested(nested) => nested.frontier.update_series(series),
        }
    }
}

/// Build the lazy expansion tree for `node` with `iterations` levels left.
pub(crate) fn ltree<K: Symbol, D: Clone, V: Clone>(
    shared: &Rc<RefCell<Shared<K, D, V>>>,
    node: &Node<K, D, V>,
    iterations: u32,
) -> IterHandle<K, D, V> {
    if iterations == 0 {
        return Rc::new(RefCell::new(ExpandIter::Series(SeriesIter::new(vec![node.clone()]))));
    }

    let frontier = shared.borrow().expand_one(node);
    if iterations == 1 {
        Rc::new(RefCell::new(ExpandIter::Series(SeriesIter::new(frontier))))
    } else {
        Rc::new(RefCell::new(ExpandIter::Nested(NestedIter {
            shared: Rc::clone(shared),
            frontier: SeriesIter::new(frontier),
            remaining: iterations - 1,
            active: None,
            pending: false,
        })))
    }
}

/// Streaming handle over a lazy expansion, returned by
/// [`crate::System::lazy_expand`].
///
/// Yields exactly the sequence the eager path would, in the same order. The
/// handle stays registered under the root symbol while live; it unregisters
/// itself when exhaustion is first observed, and `None` is permanent from
/// then on.
pub struct LazyExpand<K, D, V> {
    shared: Rc<RefCell<Shared<K, D, V>>>,
    root_key: K,
    iter: IterHandle<K, D, V>,
    finished: bool,
}

impl<K: Symbol, D: Clone, V: Clone> LazyExpand<K, D, V> {
    pub(crate) fn new(
        shared: Rc<RefCell<Shared<K, D, V>>>,
        root_key: K,
        iter: IterHandle<K, D, V>,
    ) -> Self {
        LazyExpand { shared, root_key, iter, finished: false }
    }
}

impl<K: Symbol, D: Clone, V: Clone> Iterator for LazyExpand<K, D, V> {
    type Item = Node<K, D, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.iter.borrow_mut().has_next() {
            Some(self.iter.borrow_mut().next())
        } else {
            self.finished = true;
            self.shared.borrow_mut().registry.unregister(&self.root_key, &self.iter);
            None
        }
    }
}

impl<K: Symbol, D: Clone, V: Clone> std::iter::FusedIterator for LazyExpand<K, D, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(keys: &[i32]) -> Vec<Node<i32, (), i32>> {
        keys.iter().map(|&k| Node::plain(k, k)).collect()
    }

    #[test]
    fn test_series_walks_in_order() {
        let mut series = SeriesIter::new(nodes(&[1, 2, 3]));
        let mut seen = Vec::new();
        while series.has_next() {
            seen.push(series.next().key);
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(!series.has_next());
    }

    #[test]
    fn test_series_has_next_is_idempotent() {
        let mut series = SeriesIter::new(nodes(&[1]));
        assert!(series.has_next());
        assert!(series.has_next());
        series.next();
        assert!(!series.has_next());
        assert!(!series.has_next());
    }

    #[test]
    fn test_update_series_rewinds_to_start() {
        let mut series = SeriesIter::new(nodes(&[1, 2]));
        series.next();
        series.update_series(nodes(&[7, 8, 9]));
        let mut seen = Vec::new();
        while series.has_next() {
            seen.push(series.next().key);
        }
        assert_eq!(seen, vec![7, 8, 9]);
    }

    #[test]
    fn test_update_series_can_empty_a_pending_series() {
        let mut series = SeriesIter::new(nodes(&[1, 2]));
        series.update_series(Vec::new());
        assert!(!series.has_next());
    }
}
