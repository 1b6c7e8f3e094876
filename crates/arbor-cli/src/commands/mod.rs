pub mod check;
pub mod demo;
pub mod init;
pub mod route;

use std::path::Path;

use arbor_core::Segment;
use arbor_routing::{DeliveryOutcome, RoutingTree, TopologySpec};

/// Read and parse a topology file.
pub fn load_topology(path: &Path) -> anyhow::Result<TopologySpec> {
    if !path.exists() {
        anyhow::bail!(
            "topology file not found at {} (run 'arbor init' to create one)",
            path.display()
        );
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(TopologySpec::from_toml_str(&contents)?)
}

/// Print a routing outcome to stdout.
pub fn print_outcome(tree: &RoutingTree<Segment, String>, outcome: &DeliveryOutcome<String>) {
    match outcome {
        DeliveryOutcome::Delivered(delivery) => {
            println!("  Delivered: {}", delivery.name);
        }
        DeliveryOutcome::Unrouted { packet, .. } => {
            println!(
                "  No route found for packet {:?} with address {}",
                packet.payload, packet.address
            );
        }
    }
    println!("  Route:     {}", outcome.trace().render(tree));
}
