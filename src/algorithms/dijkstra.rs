use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use crate::{Cost, NodeId};

/// Shortest path to one destination: total cost and the first hop taken
/// away from the source (None for the source itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub cost: Cost,
    pub first_hop: Option<NodeId>,
}

#[derive(Debug)]
struct State {
    cost: Cost,
    node: NodeId,
    first_hop: Option<NodeId>,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; node id breaks cost ties so the
        // extraction order is deterministic.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest paths over an assembled link-state table.
///
/// `graph` maps each node to its advertised neighbor cost table. Returns
/// None when a node being finalized has no entry yet (the topology is not
/// fully learned); the caller keeps its previous routing table and retries
/// on a later cycle.
pub fn shortest_paths(
    graph: &HashMap<NodeId, BTreeMap<NodeId, Cost>>,
    source: NodeId,
) -> Option<HashMap<NodeId, ShortestPath>> {
    let mut finalized: HashMap<NodeId, ShortestPath> = HashMap::new();
    let mut best: HashMap<NodeId, Cost> = HashMap::new();
    let mut heap = BinaryHeap::new();

    best.insert(source, 0);
    heap.push(State {
        cost: 0,
        node: source,
        first_hop: None,
    });

    while let Some(State {
        cost,
        node,
        first_hop,
    }) = heap.pop()
    {
        if finalized.contains_key(&node) {
            continue;
        }
        let neighbors = graph.get(&node)?;
        finalized.insert(node, ShortestPath { cost, first_hop });

        for (&neighbor, &edge_cost) in neighbors {
            if finalized.contains_key(&neighbor) {
                continue;
            }
            let candidate = cost + edge_cost;
            // Strictly-less-than only: ties keep the incumbent path.
            if best
                .get(&neighbor)
                .map_or(true, |&current| candidate < current)
            {
                best.insert(neighbor, candidate);
                heap.push(State {
                    cost: candidate,
                    node: neighbor,
                    // The next hop for a multi-hop destination is the one
                    // already chosen for its predecessor on the path.
                    first_hop: Some(first_hop.unwrap_or(neighbor)),
                });
            }
        }
    }

    Some(finalized)
}
