use std::collections::HashMap;

use crate::config::EngineKind;
use crate::packet::Packet;
use crate::router::distance_vector::DistanceVectorEngine;
use crate::router::link_state::LinkStateEngine;
use crate::routing_table::RoutingTable;
use crate::{Cost, NodeId};

/// The seam between the router runtime and a route-computation algorithm.
///
/// Engines are pure state machines: they receive cost snapshots and
/// advertisements and return the control packets to transmit as
/// (link index, packet) pairs; the runtime owns all I/O. The forwarder only
/// ever sees [`routing_table`](RoutingEngine::routing_table), so it works
/// identically over either engine.
pub trait RoutingEngine: Send {
    fn name(&self) -> &'static str;

    /// One discovery cycle: recompute the routing table from the given
    /// neighbor-cost snapshot and return this cycle's advertisements.
    fn run_cycle(&mut self, costs: &HashMap<NodeId, Cost>, links: &[NodeId])
        -> Vec<(usize, Packet)>;

    /// Absorb an inbound control packet. Link-state re-flooding returns the
    /// copies to send on; anything this engine does not speak is dropped
    /// with a diagnostic and returns nothing.
    fn handle_control(&mut self, packet: Packet, links: &[NodeId]) -> Vec<(usize, Packet)>;

    fn routing_table(&self) -> &RoutingTable;
}

pub fn build_engine(kind: EngineKind, node: NodeId) -> Box<dyn RoutingEngine> {
    match kind {
        EngineKind::Dv => Box::new(DistanceVectorEngine::new(node)),
        EngineKind::Ls => Box::new(LinkStateEngine::new(node)),
    }
}
