pub mod interface;
pub(crate) mod link;

pub use interface::{NetworkInterface, RouterStatus, TrafficRequest};

use anyhow::{bail, Context};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::{RouterSettings, TopologyConfig};
use crate::network::interface::StatusQuery;
use crate::router::Router;
use crate::{NodeId, BROADCAST};

/// External handle onto one running router: inject traffic, collect
/// arrivals, query state.
pub struct NodeHandle {
    traffic: mpsc::UnboundedSender<TrafficRequest>,
    arrivals: mpsc::UnboundedReceiver<String>,
    status: mpsc::UnboundedSender<StatusQuery>,
}

impl NodeHandle {
    /// Originate a data packet from this node.
    pub fn inject(&self, dest: NodeId, payload: impl Into<String>) -> anyhow::Result<()> {
        self.traffic
            .send(TrafficRequest {
                dest,
                payload: payload.into(),
            })
            .map_err(|_| anyhow::anyhow!("router task is gone"))
    }

    /// Wait for the next data packet delivered to this node.
    pub async fn arrival(&mut self) -> Option<String> {
        self.arrivals.recv().await
    }

    /// A delivered payload if one is already waiting, or None.
    pub fn try_arrival(&mut self) -> Option<String> {
        self.arrivals.try_recv().ok()
    }

    /// Ask the router for its neighbor costs and routing table.
    pub async fn status(&self) -> anyhow::Result<RouterStatus> {
        let (tx, rx) = oneshot::channel();
        self.status
            .send(tx)
            .map_err(|_| anyhow::anyhow!("router task is gone"))?;
        rx.await.context("router task dropped the status query")
    }
}

/// A wired-up network: one router task per node, one pump task per
/// directed link. Runs until shutdown or process exit.
pub struct Simulation {
    nodes: HashMap<NodeId, NodeHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl Simulation {
    /// Validate the topology, wire every channel, and spawn all tasks.
    pub fn start(topology: &TopologyConfig, settings: RouterSettings) -> anyhow::Result<Self> {
        if topology.nodes.is_empty() {
            bail!("topology has no nodes");
        }
        let mut ids = HashSet::new();
        for &node in &topology.nodes {
            if node == BROADCAST {
                bail!("node id {BROADCAST} is reserved for broadcast");
            }
            if !ids.insert(node) {
                bail!("duplicate node id {node}");
            }
        }
        for link in &topology.links {
            if link.a == link.b {
                bail!("self-link on node {}", link.a);
            }
            if !ids.contains(&link.a) || !ids.contains(&link.b) {
                bail!("link {} - {} references an unknown node", link.a, link.b);
            }
        }

        let mut tasks = Vec::new();

        // Shared inbound queue per node, fed by every incoming link pump.
        let mut inbound_txs = HashMap::new();
        let mut inbound_rxs = HashMap::new();
        for &node in &topology.nodes {
            let (tx, rx) = mpsc::unbounded_channel();
            inbound_txs.insert(node, tx);
            inbound_rxs.insert(node, rx);
        }

        // Two directed pumps per configured link, collected per node in
        // link-declaration order.
        let mut links_of: HashMap<NodeId, Vec<(NodeId, mpsc::UnboundedSender<link::InFlight>)>> =
            topology.nodes.iter().map(|&n| (n, Vec::new())).collect();
        for spec in &topology.links {
            let delay = Duration::from_millis(spec.delay_ms);
            for (from, to) in [(spec.a, spec.b), (spec.b, spec.a)] {
                let (tx, rx) = mpsc::unbounded_channel();
                tasks.push(link::spawn_pump(
                    from,
                    delay,
                    rx,
                    inbound_txs[&to].clone(),
                ));
                links_of.get_mut(&from).expect("validated").push((to, tx));
            }
        }

        let mut nodes = HashMap::new();
        for &node in &topology.nodes {
            let (traffic_tx, traffic_rx) = mpsc::unbounded_channel();
            let (arrivals_tx, arrivals_rx) = mpsc::unbounded_channel();
            let (status_tx, status_rx) = mpsc::unbounded_channel();

            let (neighbors, link_txs): (Vec<_>, Vec<_>) =
                links_of.remove(&node).expect("validated").into_iter().unzip();
            let nic = NetworkInterface::new(
                neighbors,
                link_txs,
                inbound_rxs.remove(&node).expect("validated"),
                traffic_rx,
                arrivals_tx,
                status_rx,
            );

            let router = Router::new(node, nic, settings.clone());
            tasks.push(tokio::spawn(router.run()));

            nodes.insert(
                node,
                NodeHandle {
                    traffic: traffic_tx,
                    arrivals: arrivals_rx,
                    status: status_tx,
                },
            );
        }

        info!(
            nodes = topology.nodes.len(),
            links = topology.links.len(),
            engine = ?settings.engine,
            "simulation started"
        );
        Ok(Self { nodes, tasks })
    }

    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut NodeHandle> {
        self.nodes.get_mut(&node)
    }

    pub fn node(&self, node: NodeId) -> Option<&NodeHandle> {
        self.nodes.get(&node)
    }

    /// Abort every router and pump task.
    pub fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
