use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::packet::{DistanceTableAdvertisement, Packet};
use crate::router::engine::RoutingEngine;
use crate::routing_table::{RouteEntry, RoutingTable};
use crate::{Cost, NodeId};

/// Distance-vector routing: shortest paths derived purely from full
/// distance tables exchanged with immediate neighbors (Bellman-Ford).
///
/// Each cycle rebuilds the routing table from scratch out of the latest
/// advertisement stored per neighbor, then publishes the resulting
/// destination→distance map back to every neighbor. Convergence is
/// eventual: information moves one hop per cycle.
pub struct DistanceVectorEngine {
    node: NodeId,
    /// Latest advertisement per neighbor, replaced whole on receipt.
    advertised: HashMap<NodeId, BTreeMap<NodeId, Cost>>,
    table: RoutingTable,
}

impl DistanceVectorEngine {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            advertised: HashMap::new(),
            table: RoutingTable::for_node(node),
        }
    }

    /// Relax every neighbor advertisement against the cost snapshot.
    ///
    /// Neighbors are visited in link order and only strictly cheaper
    /// candidates replace an entry, so ties keep the incumbent route and a
    /// rerun over unchanged inputs reproduces the table exactly.
    fn relax(
        &self,
        costs: &HashMap<NodeId, Cost>,
        links: &[NodeId],
    ) -> (RoutingTable, BTreeMap<NodeId, Cost>) {
        let mut table = RoutingTable::for_node(self.node);
        let mut distances = BTreeMap::from([(self.node, 0)]);

        for &neighbor in links {
            // An unmeasured link is not routable; a neighbor that has not
            // advertised yet contributes no information.
            let Some(&link_cost) = costs.get(&neighbor) else {
                continue;
            };
            let Some(adv) = self.advertised.get(&neighbor) else {
                continue;
            };
            for (&dest, &dist) in adv {
                let candidate = link_cost + dist;
                if distances.get(&dest).map_or(true, |&current| candidate < current) {
                    distances.insert(dest, candidate);
                    table.insert(
                        dest,
                        RouteEntry {
                            next_hop: Some(neighbor),
                            metric: candidate,
                        },
                    );
                }
            }
        }

        (table, distances)
    }
}

impl RoutingEngine for DistanceVectorEngine {
    fn name(&self) -> &'static str {
        "distance-vector"
    }

    fn run_cycle(
        &mut self,
        costs: &HashMap<NodeId, Cost>,
        links: &[NodeId],
    ) -> Vec<(usize, Packet)> {
        let (table, distances) = self.relax(costs, links);
        debug!(
            node = self.node,
            routes = table.len(),
            "distance-vector table recomputed"
        );
        self.table = table;

        links
            .iter()
            .enumerate()
            .map(|(link, &neighbor)| {
                (
                    link,
                    Packet::DistanceTable(DistanceTableAdvertisement {
                        origin: self.node,
                        dest: neighbor,
                        distances: distances.clone(),
                    }),
                )
            })
            .collect()
    }

    fn handle_control(&mut self, packet: Packet, _links: &[NodeId]) -> Vec<(usize, Packet)> {
        match packet {
            Packet::DistanceTable(adv) => {
                if adv.origin == self.node {
                    debug!(node = self.node, "ignoring own distance table");
                } else {
                    self.advertised.insert(adv.origin, adv.distances);
                }
            }
            other => {
                warn!(
                    node = self.node,
                    kind = other.kind(),
                    "distance-vector engine dropping unrecognized packet"
                );
            }
        }
        Vec::new()
    }

    fn routing_table(&self) -> &RoutingTable {
        &self.table
    }
}
