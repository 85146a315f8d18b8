use std::collections::HashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::packet::{PingProbe, PongReply};
use crate::{Cost, NodeId};

/// Measures the cost of each directly connected link by round-trip probing.
///
/// Timestamps are milliseconds on this router's own clock; they travel out
/// in a ping, come back in the pong, and are never interpreted by anyone
/// else. A neighbor that never answers simply stays absent from the table:
/// absent means "unmeasured", never "free".
pub struct LinkProbe {
    started: Instant,
    costs: HashMap<NodeId, Cost>,
}

impl LinkProbe {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            costs: HashMap::new(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// A probe for one neighbor, stamped with the local send time.
    pub fn probe(&self, source: NodeId, neighbor: NodeId) -> PingProbe {
        PingProbe {
            source,
            dest: neighbor,
            sent_at_ms: self.now_ms(),
        }
    }

    /// The immediate answer to a received probe, echoing its timestamp.
    pub fn answer(&self, node: NodeId, ping: &PingProbe) -> PongReply {
        PongReply {
            source: node,
            dest: ping.source,
            ping_sent_at_ms: ping.sent_at_ms,
        }
    }

    /// Record the measured link cost from a returned probe. Half the round
    /// trip approximates the one-way cost; the latest measurement wins.
    pub fn record(&mut self, pong: &PongReply) {
        let elapsed = self.now_ms().saturating_sub(pong.ping_sent_at_ms);
        let cost = elapsed / 2;
        debug!(neighbor = pong.source, cost, "link cost measured");
        self.costs.insert(pong.source, cost);
    }

    pub fn costs(&self) -> &HashMap<NodeId, Cost> {
        &self.costs
    }

    /// Immutable copy taken at the start of a computation cycle, so a
    /// recomputation never observes a half-updated cost table.
    pub fn snapshot(&self) -> HashMap<NodeId, Cost> {
        self.costs.clone()
    }
}

impl Default for LinkProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn round_trip_is_halved_and_last_measurement_wins() {
        let mut probe = LinkProbe::new();

        let ping = probe.probe(1, 2);
        tokio::time::advance(Duration::from_millis(20)).await;
        let pong = probe.answer(2, &ping);
        probe.record(&pong);
        assert_eq!(probe.costs().get(&2), Some(&10));

        // A slower second round trip replaces the first outright.
        let ping = probe.probe(1, 2);
        tokio::time::advance(Duration::from_millis(60)).await;
        let pong = probe.answer(2, &ping);
        probe.record(&pong);
        assert_eq!(probe.costs().get(&2), Some(&30));
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_probe_leaves_neighbor_unmeasured() {
        let probe = LinkProbe::new();
        let _ping = probe.probe(1, 2);
        assert!(probe.costs().is_empty());
        assert!(probe.snapshot().get(&2).is_none());
    }
}
