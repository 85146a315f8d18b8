pub mod distance_vector;
pub mod engine;
pub mod forwarder;
pub mod link_state;
pub mod probe;

pub use engine::{build_engine, RoutingEngine};
pub use forwarder::{forward, DropReason, Verdict};
pub use probe::LinkProbe;

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::RouterSettings;
use crate::network::{NetworkInterface, RouterStatus};
use crate::packet::{DataPacket, Packet};
use crate::NodeId;

/// How long the loop yields when an iteration found no work.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// One autonomous router: the per-node loop that periodically re-triggers
/// cost discovery and route computation, and drains the packet queues.
///
/// Per iteration, in order: the periodic discovery check, one outbound
/// traffic request, one inbound packet, one status query; then a short
/// sleep if nothing was done. No error ever terminates the loop.
pub struct Router {
    nsap: NodeId,
    nic: NetworkInterface,
    settings: RouterSettings,
    probe: LinkProbe,
    engine: Box<dyn RoutingEngine>,
}

impl Router {
    pub fn new(nsap: NodeId, nic: NetworkInterface, settings: RouterSettings) -> Self {
        let engine = build_engine(settings.engine, nsap);
        info!(nsap, engine = engine.name(), "router starting");
        Self {
            nsap,
            nic,
            settings,
            probe: LinkProbe::new(),
            engine,
        }
    }

    pub async fn run(mut self) {
        let mut next_cycle = Instant::now() + self.settings.initial_delay;

        loop {
            if Instant::now() >= next_cycle {
                next_cycle = Instant::now() + self.settings.cost_interval;
                self.discovery_cycle();
            }

            let mut worked = false;

            if let Some(request) = self.nic.poll_outbound_traffic() {
                worked = true;
                debug!(nsap = self.nsap, dest = request.dest, "originating data packet");
                self.handle_data(DataPacket {
                    source: self.nsap,
                    dest: request.dest,
                    hop_budget: self.settings.hop_budget,
                    payload: request.payload,
                });
            }

            if let Some((from, packet)) = self.nic.poll_inbound_packet() {
                worked = true;
                self.dispatch(from, packet);
            }

            if let Some(reply) = self.nic.poll_status_query() {
                let _ = reply.send(self.status());
            }

            if !worked {
                sleep(IDLE_POLL).await;
            }
        }
    }

    /// Probe every neighbor, then let the engine recompute its table from
    /// the current cost snapshot and emit this cycle's advertisements.
    fn discovery_cycle(&mut self) {
        let links = self.nic.outgoing_links().to_vec();
        for (link, &neighbor) in links.iter().enumerate() {
            let ping = self.probe.probe(self.nsap, neighbor);
            self.nic.send_on_link(link, Packet::Ping(ping));
        }

        let costs = self.probe.snapshot();
        for (link, packet) in self.engine.run_cycle(&costs, &links) {
            self.nic.send_on_link(link, packet);
        }
    }

    fn dispatch(&mut self, from: NodeId, packet: Packet) {
        match packet {
            Packet::Ping(ping) => {
                // Answer on the link the probe came in on.
                let pong = self.probe.answer(self.nsap, &ping);
                match self.nic.link_to(from) {
                    Some(link) => self.nic.send_on_link(link, Packet::Pong(pong)),
                    None => warn!(nsap = self.nsap, from, "probe from a non-neighbor"),
                }
            }
            Packet::Pong(pong) => {
                self.probe.record(&pong);
            }
            Packet::Data(data) => {
                self.handle_data(data);
            }
            control @ (Packet::LinkState(_) | Packet::DistanceTable(_)) => {
                let links = self.nic.outgoing_links().to_vec();
                for (link, packet) in self.engine.handle_control(control, &links) {
                    self.nic.send_on_link(link, packet);
                }
            }
        }
    }

    fn handle_data(&mut self, packet: DataPacket) {
        let source = packet.source;
        let dest = packet.dest;
        match forward(
            packet,
            self.nsap,
            self.engine.routing_table(),
            self.nic.outgoing_links(),
        ) {
            Verdict::Deliver(payload) => {
                info!(nsap = self.nsap, source, "data packet delivered");
                self.nic.report_arrival(payload);
            }
            Verdict::Forward(link, packet) => {
                debug!(
                    nsap = self.nsap,
                    dest,
                    next_hop = self.nic.outgoing_links()[link],
                    "forwarding data packet"
                );
                self.nic.send_on_link(link, Packet::Data(packet));
            }
            Verdict::Drop(reason) => {
                warn!(nsap = self.nsap, source, dest, %reason, "dropping data packet");
            }
        }
    }

    fn status(&self) -> RouterStatus {
        RouterStatus {
            nsap: self.nsap,
            neighbor_costs: self.probe.snapshot(),
            routing_table: self.engine.routing_table().clone(),
        }
    }
}
