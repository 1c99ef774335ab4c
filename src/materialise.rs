//! Materialiser contract: turning production entries into concrete nodes.

use crate::node::Node;

/// Caller-supplied strategy that computes each produced child node.
///
/// The engine invokes `produce` once per child a rule emits, passing the
/// entry's successor symbol and rule data, the parent node being expanded,
/// and the total number of siblings produced alongside the child (so an
/// implementation can, e.g., divide a parent quantity evenly). For a
/// terminal symbol the engine calls `produce` with the node's own key and
/// data and `siblings == 1`.
///
/// Implementations must be deterministic in their inputs: the engine is
/// free to re-invoke `produce` for the same node, in particular when a rule
/// update re-seeds an in-flight iterator.
pub trait Materialiser<K, D, V> {
    fn produce(&self, successor: &K, data: &D, parent: &Node<K, D, V>, siblings: usize)
        -> Node<K, D, V>;
}
