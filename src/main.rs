use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dynroute::config::{EngineKind, RouterSettings, TopologyConfig};
use dynroute::network::Simulation;

#[derive(Parser)]
#[command(name = "dynroute", about = "Simulate a network of dynamic routers")]
struct Cli {
    /// Topology description (JSON: nodes plus links with delays).
    #[arg(long)]
    topology: PathBuf,

    /// Routing algorithm every node runs.
    #[arg(long, value_enum, default_value_t = EngineKind::Ls)]
    engine: EngineKind,

    /// How long to run the simulation, in seconds.
    #[arg(long, default_value_t = 60)]
    duration: u64,

    /// Seconds between cost discovery / route recomputation cycles.
    #[arg(long, default_value_t = 10)]
    cost_interval: u64,

    /// Hop budget stamped on originated data packets.
    #[arg(long, default_value_t = dynroute::DEFAULT_HOP_BUDGET)]
    hop_budget: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let topology = TopologyConfig::load_from_file(&cli.topology)?;

    let mut settings = RouterSettings::new(cli.engine);
    settings.cost_interval = Duration::from_secs(cli.cost_interval);
    settings.hop_budget = cli.hop_budget;

    let mut sim = Simulation::start(&topology, settings)?;

    // Demo traffic: one packet per second from the first configured node to
    // the last, while arrivals anywhere are logged as they land.
    let (&first, &last) = match (topology.nodes.first(), topology.nodes.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => anyhow::bail!("topology has no nodes"),
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let deadline = tokio::time::Instant::now() + Duration::from_secs(cli.duration);
    let mut sent = 0u64;

    while tokio::time::Instant::now() < deadline {
        ticker.tick().await;

        if first != last {
            sent += 1;
            if let Some(node) = sim.node(first) {
                if let Err(e) = node.inject(last, format!("demo packet #{sent}")) {
                    warn!("failed to inject traffic: {e}");
                }
            }
        }

        for &node in &topology.nodes {
            if let Some(handle) = sim.node_mut(node) {
                while let Some(payload) = handle.try_arrival() {
                    info!(node, %payload, "arrival");
                }
            }
        }
    }

    info!(sent, "simulation finished");
    sim.shutdown();
    Ok(())
}
