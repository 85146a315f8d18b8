use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::packet::Packet;
use crate::NodeId;

/// A packet in flight on one directed link, stamped with its send time so
/// the pump can emulate propagation delay without reordering.
pub(crate) type InFlight = (Instant, Packet);

/// One directed link: packets sent by `from` toward the owner of `deliver`.
///
/// The pump holds each packet until `sent + delay` before handing it to the
/// receiving node's inbound queue. Send times are monotone per channel, so
/// order within a single link is preserved; nothing is guaranteed across
/// links.
pub(crate) fn spawn_pump(
    from: NodeId,
    delay: std::time::Duration,
    mut rx: mpsc::UnboundedReceiver<InFlight>,
    deliver: mpsc::UnboundedSender<(NodeId, Packet)>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some((sent, packet)) = rx.recv().await {
            sleep_until(sent + delay).await;
            if deliver.send((from, packet)).is_err() {
                // Receiving router is gone; drain silently until shutdown.
                break;
            }
        }
    })
}
