use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Cost, NodeId};

/// Destination → next-hop table produced by a routing engine.
///
/// A table is always built fresh for one computation cycle and swapped in
/// whole, so the forwarder never observes a half-updated table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingTable {
    entries: HashMap<NodeId, RouteEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// None for the local node itself.
    pub next_hop: Option<NodeId>,
    pub metric: Cost,
}

impl RoutingTable {
    /// An empty table seeded with the local node (next hop none, metric 0).
    pub fn for_node(node: NodeId) -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.insert(
            node,
            RouteEntry {
                next_hop: None,
                metric: 0,
            },
        );
        table
    }

    pub fn insert(&mut self, destination: NodeId, entry: RouteEntry) {
        self.entries.insert(destination, entry);
    }

    pub fn get(&self, destination: NodeId) -> Option<&RouteEntry> {
        self.entries.get(&destination)
    }

    /// Next hop toward a destination, if one is known.
    pub fn next_hop(&self, destination: NodeId) -> Option<NodeId> {
        self.entries.get(&destination).and_then(|e| e.next_hop)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &RouteEntry)> {
        self.entries.iter()
    }
}
