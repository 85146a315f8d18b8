use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{Cost, NodeId, BROADCAST};

/// Every kind of traffic the simulation moves between adjacent routers.
///
/// Data packets carry user payloads; the remaining variants are control
/// traffic owned by the link probe and the two routing engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Packet {
    Data(DataPacket),
    Ping(PingProbe),
    Pong(PongReply),
    LinkState(LinkStateAdvertisement),
    DistanceTable(DistanceTableAdvertisement),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    pub source: NodeId,
    pub dest: NodeId,
    /// Remaining forwarding hops. Decremented per forward; the packet is
    /// dropped once it would go negative.
    pub hop_budget: i32,
    pub payload: String,
}

/// Round-trip probe. The timestamp is milliseconds on the sender's own
/// clock; nobody else interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingProbe {
    pub source: NodeId,
    pub dest: NodeId,
    pub sent_at_ms: u64,
}

/// Immediate answer to a [`PingProbe`], echoing its timestamp back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongReply {
    pub source: NodeId,
    pub dest: NodeId,
    pub ping_sent_at_ms: u64,
}

/// One flood instance of a node's neighbor cost table.
///
/// The visited set only ever grows, which is what terminates the flood:
/// a node re-sends the advertisement only on links whose neighbor is not
/// yet in the set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStateAdvertisement {
    pub origin: NodeId,
    pub sequence: u64,
    pub costs: BTreeMap<NodeId, Cost>,
    pub visited: BTreeSet<NodeId>,
}

/// A node's full destination→distance table, sent to one neighbor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceTableAdvertisement {
    pub origin: NodeId,
    pub dest: NodeId,
    pub distances: BTreeMap<NodeId, Cost>,
}

impl Packet {
    pub fn source(&self) -> NodeId {
        match self {
            Packet::Data(p) => p.source,
            Packet::Ping(p) => p.source,
            Packet::Pong(p) => p.source,
            Packet::LinkState(p) => p.origin,
            Packet::DistanceTable(p) => p.origin,
        }
    }

    pub fn dest(&self) -> NodeId {
        match self {
            Packet::Data(p) => p.dest,
            Packet::Ping(p) => p.dest,
            Packet::Pong(p) => p.dest,
            Packet::LinkState(_) => BROADCAST,
            Packet::DistanceTable(p) => p.dest,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Data(_) => "data",
            Packet::Ping(_) => "ping",
            Packet::Pong(_) => "pong",
            Packet::LinkState(_) => "link-state",
            Packet::DistanceTable(_) => "distance-table",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_state_destination_is_broadcast() {
        let lsa = Packet::LinkState(LinkStateAdvertisement {
            origin: 3,
            sequence: 1,
            costs: BTreeMap::new(),
            visited: BTreeSet::from([3]),
        });
        assert_eq!(lsa.dest(), BROADCAST);
        assert_eq!(lsa.source(), 3);
    }

    #[test]
    fn data_packet_keeps_addressing() {
        let p = Packet::Data(DataPacket {
            source: 1,
            dest: 4,
            hop_budget: 5,
            payload: "hello".into(),
        });
        assert_eq!(p.source(), 1);
        assert_eq!(p.dest(), 4);
        assert_eq!(p.kind(), "data");
    }
}
