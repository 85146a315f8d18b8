pub mod algorithms;
pub mod config;
pub mod network;
pub mod packet;
pub mod router;
pub mod routing_table;

/// Router identifier (the "nsap" of a node). Real nodes are numbered from 1;
/// 0 is reserved as the broadcast sentinel for flooded control packets.
pub type NodeId = u32;

/// Wildcard destination carried by flooded control packets.
pub const BROADCAST: NodeId = 0;

/// Link cost in milliseconds, as measured by the link probe.
pub type Cost = u64;

/// Hops a freshly originated data packet may take before being discarded.
pub const DEFAULT_HOP_BUDGET: i32 = 5;
