//! Production rules for the rewriting engine.
//!
//! A rule maps a symbol to an ordered sequence of [`Production`] entries,
//! each pairing a successor symbol with rule-specific data. The [`RuleSet`]
//! is the mutable table the engine expands against:
//! - absent key: the symbol is terminal (it reproduces itself),
//! - empty entry list: the symbol vanishes (produces nothing),
//! - N entries: the symbol rewrites to N materialised children, in order.

use rustc_hash::FxHashMap;

use crate::node::Symbol;

/// One entry on the right-hand side of a rewrite rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production<K, D> {
    /// Symbol of the child this entry produces.
    pub successor: K,
    /// Rule data handed to the materialiser for this entry.
    pub data: D,
}

impl<K, D> Production<K, D> {
    /// Create a new production entry.
    pub fn new(successor: K, data: D) -> Self {
        Production { successor, data }
    }
}

impl<K> From<K> for Production<K, ()> {
    /// A bare successor symbol for rules that carry no extra data.
    fn from(successor: K) -> Self {
        Production::new(successor, ())
    }
}

/// Mutable table mapping each symbol to its ordered production entries.
#[derive(Clone, Debug)]
pub struct RuleSet<K, D> {
    rules: FxHashMap<K, Vec<Production<K, D>>>,
}

impl<K: Symbol, D> RuleSet<K, D> {
    /// Create an empty rule set (every symbol is terminal).
    pub fn new() -> Self {
        RuleSet { rules: FxHashMap::default() }
    }

    /// Set the rule for `key`, replacing any previous entries.
    pub fn insert(&mut self, key: K, entries: Vec<Production<K, D>>) {
        self.rules.insert(key, entries);
    }

    /// Remove the rule for `key`, making the symbol terminal again.
    pub fn remove(&mut self, key: &K) -> Option<Vec<Production<K, D>>> {
        self.rules.remove(key)
    }

    /// Look up the production entries for `key`. `None` means terminal.
    pub fn lookup(&self, key: &K) -> Option<&[Production<K, D>]> {
        self.rules.get(key).map(Vec::as_slice)
    }

    /// Number of symbols with a rule.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<K: Symbol, D> Default for RuleSet<K, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Symbol, D> FromIterator<(K, Vec<Production<K, D>>)> for RuleSet<K, D> {
    fn from_iter<I: IntoIterator<Item = (K, Vec<Production<K, D>>)>>(iter: I) -> Self {
        RuleSet { rules: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_missing_key_is_none() {
        let rules: RuleSet<i32, ()> = RuleSet::new();
        assert!(rules.lookup(&1).is_none());
    }

    #[test]
    fn test_empty_entry_list_is_distinct_from_missing() {
        let mut rules: RuleSet<i32, ()> = RuleSet::new();
        rules.insert(2, vec![]);
        assert_eq!(rules.lookup(&2), Some(&[][..]));
        assert!(rules.lookup(&3).is_none());
    }

    #[test]
    fn test_insert_replaces_entries() {
        let mut rules: RuleSet<i32, ()> = RuleSet::new();
        rules.insert(1, vec![Production::from(2), Production::from(3)]);
        rules.insert(1, vec![Production::from(4)]);
        assert_eq!(rules.lookup(&1).unwrap().len(), 1);
        assert_eq!(rules.lookup(&1).unwrap()[0].successor, 4);
    }

    #[test]
    fn test_remove_makes_symbol_terminal() {
        let mut rules: RuleSet<i32, ()> = RuleSet::new();
        rules.insert(1, vec![Production::from(2)]);
        assert!(rules.remove(&1).is_some());
        assert!(rules.lookup(&1).is_none());
    }

    #[test]
    fn test_from_iterator_preserves_entry_order() {
        let rules: RuleSet<i32, ()> = [(1, vec![Production::from(1), Production::from(2)])]
            .into_iter()
            .collect();
        let entries = rules.lookup(&1).unwrap();
        assert_eq!(entries[0].successor, 1);
        assert_eq!(entries[1].successor, 2);
    }
}
