use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::algorithms::dijkstra::shortest_paths;
use crate::packet::{LinkStateAdvertisement, Packet};
use crate::router::engine::RoutingEngine;
use crate::routing_table::{RouteEntry, RoutingTable};
use crate::{Cost, NodeId};

/// Link-state routing: every node floods its neighbor cost table to the
/// whole network, then independently runs Dijkstra over the assembled
/// topology.
///
/// The entry for this node is self-authoritative: it is rewritten from the
/// local cost snapshot every cycle and flooded data can never overwrite it.
pub struct LinkStateEngine {
    node: NodeId,
    sequence: u64,
    /// origin → that origin's advertised neighbor cost table.
    topology: HashMap<NodeId, BTreeMap<NodeId, Cost>>,
    /// Highest flood sequence absorbed per origin, so one flood instance is
    /// processed at most once even when copies arrive over several paths.
    seen: HashMap<NodeId, u64>,
    table: RoutingTable,
}

impl LinkStateEngine {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            sequence: 0,
            topology: HashMap::new(),
            seen: HashMap::new(),
            table: RoutingTable::for_node(node),
        }
    }

    /// Flood sequence last absorbed from an origin, if any.
    pub fn seen_sequence(&self, origin: NodeId) -> Option<u64> {
        self.seen.get(&origin).copied()
    }

    /// Re-send an advertisement on every link whose neighbor has not seen
    /// it yet. The visited set only grows, so every flood terminates.
    fn flood(adv: &LinkStateAdvertisement, links: &[NodeId]) -> Vec<(usize, Packet)> {
        links
            .iter()
            .enumerate()
            .filter(|(_, neighbor)| !adv.visited.contains(neighbor))
            .map(|(link, _)| (link, Packet::LinkState(adv.clone())))
            .collect()
    }

    /// Rebuild the routing table from the assembled topology. If some node
    /// on a shortest path has not advertised yet, keep the previous table
    /// and retry on a later cycle.
    fn recompute(&mut self) {
        match shortest_paths(&self.topology, self.node) {
            Some(paths) => {
                let mut table = RoutingTable::for_node(self.node);
                for (dest, path) in paths {
                    table.insert(
                        dest,
                        RouteEntry {
                            next_hop: path.first_hop,
                            metric: path.cost,
                        },
                    );
                }
                debug!(node = self.node, routes = table.len(), "link-state table recomputed");
                self.table = table;
            }
            None => {
                debug!(
                    node = self.node,
                    "topology not fully learned yet, keeping previous routing table"
                );
            }
        }
    }
}

impl RoutingEngine for LinkStateEngine {
    fn name(&self) -> &'static str {
        "link-state"
    }

    fn run_cycle(
        &mut self,
        costs: &HashMap<NodeId, Cost>,
        links: &[NodeId],
    ) -> Vec<(usize, Packet)> {
        let own: BTreeMap<NodeId, Cost> = costs.iter().map(|(&n, &c)| (n, c)).collect();
        self.topology.insert(self.node, own.clone());
        self.recompute();

        self.sequence += 1;
        let adv = LinkStateAdvertisement {
            origin: self.node,
            sequence: self.sequence,
            costs: own,
            visited: BTreeSet::from([self.node]),
        };
        Self::flood(&adv, links)
    }

    fn handle_control(&mut self, packet: Packet, links: &[NodeId]) -> Vec<(usize, Packet)> {
        match packet {
            Packet::LinkState(mut adv) => {
                if adv.origin == self.node {
                    debug!(node = self.node, "own advertisement came back, dropping");
                    return Vec::new();
                }
                if self
                    .seen
                    .get(&adv.origin)
                    .map_or(false, |&last| adv.sequence <= last)
                {
                    debug!(
                        node = self.node,
                        origin = adv.origin,
                        sequence = adv.sequence,
                        "flood instance already absorbed"
                    );
                    return Vec::new();
                }

                self.seen.insert(adv.origin, adv.sequence);
                self.topology.insert(adv.origin, adv.costs.clone());
                self.recompute();

                adv.visited.insert(self.node);
                Self::flood(&adv, links)
            }
            other => {
                warn!(
                    node = self.node,
                    kind = other.kind(),
                    "link-state engine dropping unrecognized packet"
                );
                Vec::new()
            }
        }
    }

    fn routing_table(&self) -> &RoutingTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive one flood instance across an arbitrary topology, delivering
    /// packets until none remain, and return how many times each node
    /// absorbed it.
    fn run_flood(adjacency: &HashMap<NodeId, Vec<NodeId>>, origin: NodeId) -> HashMap<NodeId, u32> {
        let mut engines: HashMap<NodeId, LinkStateEngine> = adjacency
            .keys()
            .map(|&n| (n, LinkStateEngine::new(n)))
            .collect();
        let mut absorbed: HashMap<NodeId, u32> = HashMap::new();

        let costs: HashMap<NodeId, Cost> =
            adjacency[&origin].iter().map(|&n| (n, 1)).collect();
        let links = adjacency[&origin].clone();
        let mut queue: Vec<(NodeId, Packet)> = engines
            .get_mut(&origin)
            .unwrap()
            .run_cycle(&costs, &links)
            .into_iter()
            .map(|(link, packet)| (links[link], packet))
            .collect();

        let mut deliveries = 0;
        while let Some((to, packet)) = queue.pop() {
            deliveries += 1;
            assert!(deliveries < 1000, "flood failed to terminate");

            let engine = engines.get_mut(&to).unwrap();
            let before = engine.seen_sequence(origin);
            let out_links = adjacency[&to].clone();
            let out = engine.handle_control(packet, &out_links);
            if engine.seen_sequence(origin) != before {
                *absorbed.entry(to).or_default() += 1;
            }
            for (link, packet) in out {
                queue.push((out_links[link], packet));
            }
        }
        absorbed
    }

    #[test]
    fn flood_reaches_every_node_exactly_once_on_a_ring() {
        // 1-2-3-4-1: copies race around both sides of the ring, but each
        // node absorbs the instance once.
        let adjacency = HashMap::from([
            (1, vec![2, 4]),
            (2, vec![1, 3]),
            (3, vec![2, 4]),
            (4, vec![3, 1]),
        ]);
        let absorbed = run_flood(&adjacency, 1);
        assert_eq!(absorbed, HashMap::from([(2, 1), (3, 1), (4, 1)]));
    }

    #[test]
    fn flood_covers_a_line_without_echoes() {
        let adjacency = HashMap::from([
            (1, vec![2]),
            (2, vec![1, 3]),
            (3, vec![2, 4]),
            (4, vec![3]),
        ]);
        let absorbed = run_flood(&adjacency, 1);
        assert_eq!(absorbed, HashMap::from([(2, 1), (3, 1), (4, 1)]));
    }

    #[test]
    fn own_entry_is_never_overwritten_by_flooding() {
        let mut engine = LinkStateEngine::new(1);
        engine.run_cycle(&HashMap::from([(2, 7)]), &[2]);

        // A forged advertisement claiming to be node 1 comes back around.
        let out = engine.handle_control(
            Packet::LinkState(LinkStateAdvertisement {
                origin: 1,
                sequence: 99,
                costs: BTreeMap::from([(2, 0)]),
                visited: BTreeSet::from([1, 2]),
            }),
            &[2],
        );
        assert!(out.is_empty());
        assert_eq!(engine.topology[&1], BTreeMap::from([(2, 7)]));
    }

    #[test]
    fn incomplete_topology_keeps_the_previous_table() {
        let mut engine = LinkStateEngine::new(1);
        engine.run_cycle(&HashMap::from([(2, 1)]), &[2]);
        // Node 2 has not advertised: Dijkstra bails, table still self-only.
        assert_eq!(engine.routing_table().len(), 1);

        // Node 2's advertisement arrives; the next receipt recomputes.
        engine.handle_control(
            Packet::LinkState(LinkStateAdvertisement {
                origin: 2,
                sequence: 1,
                costs: BTreeMap::from([(1, 1)]),
                visited: BTreeSet::from([2]),
            }),
            &[2],
        );
        let entry = engine.routing_table().get(2).unwrap();
        assert_eq!(entry.next_hop, Some(2));
        assert_eq!(entry.metric, 1);
    }

    #[test]
    fn routes_follow_the_cheaper_side_of_a_ring() {
        let mut engine = LinkStateEngine::new(1);
        let absorb = |engine: &mut LinkStateEngine, origin: NodeId, costs: &[(NodeId, Cost)]| {
            engine.handle_control(
                Packet::LinkState(LinkStateAdvertisement {
                    origin,
                    sequence: 1,
                    costs: costs.iter().copied().collect(),
                    visited: BTreeSet::from([origin]),
                }),
                &[2, 4],
            );
        };
        absorb(&mut engine, 2, &[(1, 1), (3, 1)]);
        absorb(&mut engine, 3, &[(2, 1), (4, 1)]);
        absorb(&mut engine, 4, &[(3, 1), (1, 10)]);
        engine.run_cycle(&HashMap::from([(2, 1), (4, 10)]), &[2, 4]);

        let entry = engine.routing_table().get(4).unwrap();
        assert_eq!(entry.next_hop, Some(2));
        assert_eq!(entry.metric, 3);
    }
}
