use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{NodeId, DEFAULT_HOP_BUDGET};

/// Which routing engine every router in the simulation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Distance-vector (Bellman-Ford over neighbor advertisements).
    Dv,
    /// Link-state (flooding plus Dijkstra).
    Ls,
}

/// Static description of the simulated network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkSpec>,
}

/// One bidirectional link with a fixed one-way propagation delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub a: NodeId,
    pub b: NodeId,
    pub delay_ms: u64,
}

impl TopologyConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading topology file {}", path.display()))?;
        let config: TopologyConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing topology file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Neighbors of `node` in link-declaration order, with their delays.
    pub fn neighbors_of(&self, node: NodeId) -> Vec<(NodeId, u64)> {
        let mut out = Vec::new();
        for link in &self.links {
            if link.a == node {
                out.push((link.b, link.delay_ms));
            } else if link.b == node {
                out.push((link.a, link.delay_ms));
            }
        }
        out
    }
}

/// Per-router timing and forwarding knobs, shared by every node.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub engine: EngineKind,
    /// Time between cost discovery / route recomputation cycles.
    pub cost_interval: Duration,
    /// Shorter delay before the very first cycle.
    pub initial_delay: Duration,
    /// Hop budget stamped on freshly originated data packets.
    pub hop_budget: i32,
}

impl RouterSettings {
    pub fn new(engine: EngineKind) -> Self {
        Self {
            engine,
            cost_interval: Duration::from_secs(10),
            initial_delay: Duration::from_secs(1),
            hop_budget: DEFAULT_HOP_BUDGET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_topology() -> TopologyConfig {
        TopologyConfig {
            nodes: vec![1, 2, 3],
            links: vec![
                LinkSpec {
                    a: 1,
                    b: 2,
                    delay_ms: 5,
                },
                LinkSpec {
                    a: 2,
                    b: 3,
                    delay_ms: 7,
                },
            ],
        }
    }

    #[test]
    fn neighbors_follow_link_order() {
        let topo = line_topology();
        assert_eq!(topo.neighbors_of(2), vec![(1, 5), (3, 7)]);
        assert_eq!(topo.neighbors_of(1), vec![(2, 5)]);
        assert_eq!(topo.neighbors_of(3), vec![(2, 7)]);
    }

    #[test]
    fn round_trips_through_json_file() {
        let topo = line_topology();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topology.json");
        topo.save_to_file(&path).unwrap();

        let loaded = TopologyConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.nodes, topo.nodes);
        assert_eq!(loaded.links.len(), 2);
        assert_eq!(loaded.links[1].delay_ms, 7);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(TopologyConfig::load_from_file("/nonexistent/topology.json").is_err());
    }
}
