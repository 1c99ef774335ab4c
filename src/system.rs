//! The expansion engine: owns the rule table, the materialiser, and the
//! registry of live iterators.
//!
//! [`System`] exposes both consumption modes over the same rewrite
//! semantics:
//! - [`System::expand`]: eager, recursive, depth-first materialisation of
//!   the whole generation — the ground truth the lazy path must match
//!   element for element.
//! - [`System::lazy_expand`]: a streaming handle that holds one spine of
//!   sub-iterators in memory and picks up rule updates for any node it has
//!   not yet expanded.
//!
//! Rule mutation goes through [`System::update_rule`] (one key, immediate
//! re-seed of affected live iterators) or [`System::replace_rules`] +
//! [`System::update_all`] (bulk swap, then refresh everything). The engine
//! is single-threaded; serialise access externally if it ever has to cross
//! threads.

use std::cell::RefCell;
use std::rc::Rc;

use crate::lazy::{ltree, IterHandle, LazyExpand};
use crate::materialise::Materialiser;
use crate::node::{Node, Symbol};
use crate::registry::Registry;
use crate::rules::{Production, RuleSet};

/// Engine state shared between the [`System`] and its live iterators.
pub(crate) struct Shared<K, D, V> {
    pub(crate) rules: RuleSet<K, D>,
    pub(crate) materialiser: Box<dyn Materialiser<K, D, V>>,
    pub(crate) registry: Registry<K, D, V>,
}

impl<K: Symbol, D: Clone, V: Clone> Shared<K, D, V> {
    /// Apply one level of rewriting to `node`.
    ///
    /// Terminal symbol: the node reproduces itself through the
    /// materialiser, with a sibling count of 1. Empty rule: the symbol
    /// vanishes. Otherwise one materialised child per entry, in entry
    /// order, each told the total sibling count.
    pub(crate) fn expand_one(&self, node: &Node<K, D, V>) -> Vec<Node<K, D, V>> {
        match self.rules.lookup(&node.key) {
            None => vec![self.materialiser.produce(&node.key, &node.data, node, 1)],
            Some(entries) => {
                let siblings = entries.len();
                entries
                    .iter()
                    .map(|entry| {
                        self.materialiser.produce(&entry.successor, &entry.data, node, siblings)
                    })
                    .collect()
            }
        }
    }

    fn expand_into(&self, node: &Node<K, D, V>, iterations: u32, out: &mut Vec<Node<K, D, V>>) {
        if iterations == 0 {
            out.push(node.clone());
            return;
        }
        let frontier = self.expand_one(node);
        if iterations == 1 {
            out.extend(frontier);
            return;
        }
        for child in &frontier {
            self.expand_into(child, iterations - 1, out);
        }
    }
}

/// A rewriting system: rule table + materialiser + live-iterator registry.
pub struct System<K, D, V> {
    shared: Rc<RefCell<Shared<K, D, V>>>,
}

impl<K: Symbol, D: Clone, V: Clone> System<K, D, V> {
    /// Create a system from a rule table and a materialiser.
    ///
    /// The materialiser is fixed for the system's lifetime; the rule table
    /// may be mutated at any point through [`System::update_rule`] or
    /// [`System::replace_rules`].
    pub fn new(rules: RuleSet<K, D>, materialiser: impl Materialiser<K, D, V> + 'static) -> Self {
        System {
            shared: Rc::new(RefCell::new(Shared {
                rules,
                materialiser: Box::new(materialiser),
                registry: Registry::new(),
            })),
        }
    }

    /// Apply one level of rewriting to `node`.
    pub fn expand_one(&self, node: &Node<K, D, V>) -> Vec<Node<K, D, V>> {
        self.shared.borrow().expand_one(node)
    }

    /// Eagerly materialise `iterations` rounds of rewriting below `node`.
    ///
    /// Zero iterations is the identity: the result is `[node]`.
    pub fn expand(&self, node: &Node<K, D, V>, iterations: u32) -> Vec<Node<K, D, V>> {
        let shared = self.shared.borrow();
        let mut out = Vec::new();
        shared.expand_into(node, iterations, &mut out);
        out
    }

    /// Stream `iterations` rounds of rewriting below `node` lazily.
    ///
    /// The returned handle yields the same sequence as [`System::expand`],
    /// in the same order, holding only one spine of pending sub-iterators
    /// in memory. It is registered under `node`'s symbol so rule updates
    /// reach it while it is live.
    pub fn lazy_expand(&self, node: &Node<K, D, V>, iterations: u32) -> LazyExpand<K, D, V> {
        let iter = ltree(&self.shared, node, iterations);
        self.shared.borrow_mut().registry.register(node, &iter);
        LazyExpand::new(Rc::clone(&self.shared), node.key.clone(), iter)
    }

    /// Replace the rule for `key` and re-seed every live iterator that is
    /// currently positioned on a node carrying `key`.
    ///
    /// Future expansions of `key` see the new entries immediately. For each
    /// affected live iterator the pending frontier is recomputed against
    /// the new table and rewound to its start; output already yielded is
    /// untouched, and a sub-iterator already descended into keeps draining
    /// before the re-seeded frontier takes over.
    pub fn update_rule(&mut self, key: K, entries: Vec<Production<K, D>>) {
        let live = {
            let mut shared = self.shared.borrow_mut();
            shared.rules.insert(key.clone(), entries);
            shared.registry.collect_live(&key)
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(key = ?key, live = live.len(), "rule updated");
        self.refresh(live);
    }

    /// Swap the whole rule table without touching live iterators.
    ///
    /// Call [`System::update_all`] afterwards to propagate the new table to
    /// everything in flight.
    pub fn replace_rules(&mut self, rules: RuleSet<K, D>) {
        self.shared.borrow_mut().rules = rules;
    }

    /// Re-seed every live iterator against the current rule table.
    pub fn update_all(&mut self) {
        let live = self.shared.borrow_mut().registry.collect_all_live();
        #[cfg(feature = "tracing")]
        tracing::debug!(live = live.len(), "refreshing all live iterators");
        self.refresh(live);
    }

    /// Number of live iterators currently registered under `key`.
    pub fn live_registrations(&self, key: &K) -> usize {
        self.shared.borrow().registry.live_count(key)
    }

    fn refresh(&self, live: Vec<(Node<K, D, V>, IterHandle<K, D, V>)>) {
        for (node, iter) in live {
            let series = self.shared.borrow().expand_one(&node);
            iter.borrow_mut().update_series(series);
        }
    }
}
