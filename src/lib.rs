//! Parametric rewriting (L-system) engine with eager and lazy expansion.
//!
//! This crate provides:
//! - Symbol-keyed production rules, each entry carrying its own rule data
//! - A caller-supplied materialiser that computes every produced node
//! - Eager expansion (materialise a whole generation as a sequence)
//! - Lazy expansion (stream a generation node by node, holding only one
//!   spine of pending sub-iterators in memory)
//! - Live rule updates that re-seed exactly the in-flight iterators
//!   positioned on the changed symbol
//!
//! # Example
//!
//! ```
//! use lsystem::{Materialiser, Node, Production, RuleSet, System};
//!
//! // Carries the successor symbol through as the node value.
//! struct Echo;
//!
//! impl Materialiser<char, (), char> for Echo {
//!     fn produce(
//!         &self,
//!         successor: &char,
//!         _data: &(),
//!         _parent: &Node<char, (), char>,
//!         _siblings: usize,
//!     ) -> Node<char, (), char> {
//!         Node::plain(*successor, *successor)
//!     }
//! }
//!
//! // Lindenmayer's algae: a -> ab, b -> a.
//! let mut rules = RuleSet::new();
//! rules.insert('a', vec![Production::from('a'), Production::from('b')]);
//! rules.insert('b', vec![Production::from('a')]);
//!
//! let system = System::new(rules, Echo);
//! let root = Node::plain('a', 'a');
//!
//! let generation = system.expand(&root, 3);
//! let word: String = generation.iter().map(|node| node.value).collect();
//! assert_eq!(word, "abaab");
//!
//! // The lazy path yields the same sequence without materialising it.
//! assert_eq!(system.lazy_expand(&root, 3).collect::<Vec<_>>(), generation);
//! ```

pub mod lazy;
pub mod materialise;
pub mod modulo;
pub mod node;
mod registry;
pub mod rules;
pub mod system;

pub use lazy::LazyExpand;
pub use materialise::Materialiser;
pub use modulo::{
    Duration, ModuloDurationMaterialiser, ModuloError, ModuloIntMaterialiser, ModuloRange,
    ModuloValue,
};
pub use node::{Node, Symbol};
pub use rules::{Production, RuleSet};
pub use system::System;
