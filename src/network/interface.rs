use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::warn;

use crate::network::link::InFlight;
use crate::packet::Packet;
use crate::routing_table::RoutingTable;
use crate::{Cost, NodeId};

/// Locally originated traffic waiting to be wrapped in a data packet.
#[derive(Debug, Clone)]
pub struct TrafficRequest {
    pub dest: NodeId,
    pub payload: String,
}

/// Snapshot of a router's state, answered over the status side channel.
#[derive(Debug, Clone, Serialize)]
pub struct RouterStatus {
    pub nsap: NodeId,
    pub neighbor_costs: HashMap<NodeId, Cost>,
    pub routing_table: RoutingTable,
}

pub(crate) type StatusQuery = oneshot::Sender<RouterStatus>;

/// A router's only window onto the rest of the simulation: its ordered
/// outgoing links, the shared inbound queue, locally originated traffic,
/// and the arrival report channel. All polls are non-blocking.
pub struct NetworkInterface {
    neighbors: Vec<NodeId>,
    link_txs: Vec<mpsc::UnboundedSender<InFlight>>,
    inbound: mpsc::UnboundedReceiver<(NodeId, Packet)>,
    traffic: mpsc::UnboundedReceiver<TrafficRequest>,
    arrivals: mpsc::UnboundedSender<String>,
    status: mpsc::UnboundedReceiver<StatusQuery>,
}

impl NetworkInterface {
    pub(crate) fn new(
        neighbors: Vec<NodeId>,
        link_txs: Vec<mpsc::UnboundedSender<InFlight>>,
        inbound: mpsc::UnboundedReceiver<(NodeId, Packet)>,
        traffic: mpsc::UnboundedReceiver<TrafficRequest>,
        arrivals: mpsc::UnboundedSender<String>,
        status: mpsc::UnboundedReceiver<StatusQuery>,
    ) -> Self {
        debug_assert_eq!(neighbors.len(), link_txs.len());
        Self {
            neighbors,
            link_txs,
            inbound,
            traffic,
            arrivals,
            status,
        }
    }

    /// Neighbor ids in link order, stable for the runtime's lifetime.
    pub fn outgoing_links(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// Link index for a directly connected neighbor, if any.
    pub fn link_to(&self, neighbor: NodeId) -> Option<usize> {
        self.neighbors.iter().position(|&n| n == neighbor)
    }

    /// Enqueue a packet for asynchronous delivery on one link. Never blocks.
    pub fn send_on_link(&self, link: usize, packet: Packet) {
        match self.link_txs.get(link) {
            Some(tx) => {
                if tx.send((Instant::now(), packet)).is_err() {
                    warn!(link, "link is down, packet lost");
                }
            }
            None => warn!(link, "no such outgoing link"),
        }
    }

    /// One locally originated (destination, payload) pair, or None.
    pub fn poll_outbound_traffic(&mut self) -> Option<TrafficRequest> {
        self.traffic.try_recv().ok()
    }

    /// One packet that arrived on some link, tagged with the originating
    /// neighbor's id, or None.
    pub fn poll_inbound_packet(&mut self) -> Option<(NodeId, Packet)> {
        self.inbound.try_recv().ok()
    }

    /// One pending status query, or None.
    pub(crate) fn poll_status_query(&mut self) -> Option<StatusQuery> {
        self.status.try_recv().ok()
    }

    /// Report that a data packet reached this node.
    pub fn report_arrival(&self, payload: String) {
        if self.arrivals.send(payload).is_err() {
            warn!("arrival collector is gone");
        }
    }
}
