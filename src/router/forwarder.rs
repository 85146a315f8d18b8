use std::fmt;

use crate::packet::DataPacket;
use crate::routing_table::RoutingTable;
use crate::NodeId;

/// What to do with one data packet, decided against whichever routing table
/// is current. The runtime acts on the verdict; the decision itself is pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The packet is for this node; hand the payload to the collaborator.
    Deliver(String),
    /// Transmit the (budget-decremented) packet on this outgoing link.
    Forward(usize, DataPacket),
    Drop(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The hop budget went negative.
    HopsExhausted,
    /// No routing-table entry, or the next hop is not a direct neighbor.
    NoRoute,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::HopsExhausted => write!(f, "hop budget exhausted"),
            DropReason::NoRoute => write!(f, "destination not in routing table"),
        }
    }
}

/// Move a data packet one hop closer to its destination, or deliver it.
///
/// A packet addressed to this node is delivered without consulting the
/// routing table or the hop budget.
pub fn forward(
    mut packet: DataPacket,
    node: NodeId,
    table: &RoutingTable,
    links: &[NodeId],
) -> Verdict {
    if packet.dest == node {
        return Verdict::Deliver(packet.payload);
    }

    packet.hop_budget -= 1;
    if packet.hop_budget < 0 {
        return Verdict::Drop(DropReason::HopsExhausted);
    }

    let Some(next_hop) = table.next_hop(packet.dest) else {
        return Verdict::Drop(DropReason::NoRoute);
    };
    match links.iter().position(|&n| n == next_hop) {
        Some(link) => Verdict::Forward(link, packet),
        None => Verdict::Drop(DropReason::NoRoute),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing_table::RouteEntry;

    fn data(dest: NodeId, hop_budget: i32) -> DataPacket {
        DataPacket {
            source: 1,
            dest,
            hop_budget,
            payload: "payload".into(),
        }
    }

    #[test]
    fn delivery_ignores_the_routing_table() {
        // Empty table on purpose: self-delivery must not consult it.
        let table = RoutingTable::default();
        let verdict = forward(data(5, 0), 5, &table, &[]);
        assert_eq!(verdict, Verdict::Deliver("payload".into()));
    }

    #[test]
    fn exhausted_budget_drops_before_lookup() {
        let mut table = RoutingTable::for_node(1);
        table.insert(
            9,
            RouteEntry {
                next_hop: Some(2),
                metric: 3,
            },
        );
        let verdict = forward(data(9, 0), 1, &table, &[2]);
        assert_eq!(verdict, Verdict::Drop(DropReason::HopsExhausted));
    }

    #[test]
    fn unknown_destination_is_dropped() {
        let table = RoutingTable::for_node(1);
        let verdict = forward(data(9, 5), 1, &table, &[2]);
        assert_eq!(verdict, Verdict::Drop(DropReason::NoRoute));
    }

    #[test]
    fn forwarding_decrements_and_picks_the_link() {
        let mut table = RoutingTable::for_node(1);
        table.insert(
            9,
            RouteEntry {
                next_hop: Some(3),
                metric: 7,
            },
        );
        match forward(data(9, 5), 1, &table, &[2, 3]) {
            Verdict::Forward(link, packet) => {
                assert_eq!(link, 1);
                assert_eq!(packet.hop_budget, 4);
                assert_eq!(packet.dest, 9);
            }
            other => panic!("unexpected verdict {other:?}"),
        }
    }
}
