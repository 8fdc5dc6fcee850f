use crate::{Innovation, NodeId};

use ahash::RandomState;

use std::collections::HashMap;

/// The kind of structural mutation recorded in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modification {
    /// A connection was added between two nodes.
    Add,
    /// A connection was split by a new hidden node.
    Split,
}

/// A past structural mutation.
///
/// For [`Add`] entries, `innovation` is the new connection's.
/// For [`Split`] entries, `innovation` is that of the
/// connection entering the new node, and `new_node`
/// holds the node's id.
///
/// [`Add`]: Modification::Add
/// [`Split`]: Modification::Split
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoricEntry {
    pub modification: Modification,
    pub innovation: Innovation,
    pub in_node: NodeId,
    pub out_node: NodeId,
    pub new_node: Option<NodeId>,
}

/// A `HistoricLedger` keeps track of the structural mutations
/// of a run, in order to make sure identical mutations
/// in different genomes are assigned the same innovation
/// numbers and node ids.
///
/// Entries are keyed by the id of the node the mutated
/// connection starts at.
#[derive(Debug, Clone, Default)]
pub struct HistoricLedger {
    entries: HashMap<NodeId, Vec<HistoricEntry>, RandomState>,
    len: usize,
}

impl HistoricLedger {
    /// Creates an empty ledger.
    pub fn new() -> HistoricLedger {
        HistoricLedger::default()
    }

    /// Appends an entry to the ledger.
    pub fn record(&mut self, entry: HistoricEntry) {
        self.entries.entry(entry.in_node).or_default().push(entry);
        self.len += 1;
    }

    /// Returns the first recorded mutation of the given kind
    /// between `in_node` and `out_node`, if any.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::{HistoricEntry, HistoricLedger, Modification};
    ///
    /// let mut ledger = HistoricLedger::new();
    /// ledger.record(HistoricEntry {
    ///     modification: Modification::Add,
    ///     innovation: 7,
    ///     in_node: 0,
    ///     out_node: 3,
    ///     new_node: None,
    /// });
    ///
    /// assert_eq!(ledger.find(0, Modification::Add, 3).map(|e| e.innovation), Some(7));
    /// assert!(ledger.find(0, Modification::Split, 3).is_none());
    /// assert!(ledger.find(3, Modification::Add, 0).is_none());
    /// ```
    pub fn find(
        &self,
        in_node: NodeId,
        modification: Modification,
        out_node: NodeId,
    ) -> Option<&HistoricEntry> {
        self.find_all(in_node, modification, out_node).next()
    }

    /// Iterates over every recorded mutation of the given kind
    /// between `in_node` and `out_node`, oldest first.
    pub fn find_all(
        &self,
        in_node: NodeId,
        modification: Modification,
        out_node: NodeId,
    ) -> impl Iterator<Item = &HistoricEntry> {
        self.entries
            .get(&in_node)
            .into_iter()
            .flatten()
            .filter(move |e| e.modification == modification && e.out_node == out_node)
    }

    /// Iterates over the complete record of mutations.
    /// Entries sharing an origin node come out in the order
    /// they were recorded; no ordering is guaranteed otherwise.
    pub fn entries(&self) -> impl Iterator<Item = &HistoricEntry> {
        self.entries.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forgets every recorded mutation.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(innovation: Innovation, in_node: NodeId, out_node: NodeId, new_node: NodeId) -> HistoricEntry {
        HistoricEntry {
            modification: Modification::Split,
            innovation,
            in_node,
            out_node,
            new_node: Some(new_node),
        }
    }

    #[test]
    fn find_all_is_ordered() {
        let mut ledger = HistoricLedger::new();
        ledger.record(split(4, 0, 1, 5));
        ledger.record(split(6, 2, 1, 7));
        ledger.record(split(8, 0, 1, 9));

        let new_nodes: Vec<_> = ledger
            .find_all(0, Modification::Split, 1)
            .map(|e| e.new_node)
            .collect();
        assert_eq!(new_nodes, vec![Some(5), Some(9)]);
        assert_eq!(ledger.find(0, Modification::Split, 1).unwrap().innovation, 4);
    }

    #[test]
    fn clear() {
        let mut ledger = HistoricLedger::new();
        ledger.record(split(4, 0, 1, 5));
        ledger.record(split(6, 2, 1, 7));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries().count(), 2);

        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.find(0, Modification::Split, 1).is_none());
    }
}
