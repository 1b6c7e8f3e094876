//! `arbor route` — Route a single packet through a topology file.

use std::path::PathBuf;

use arbor_core::{Address, ArborConfig, Packet};
use arbor_routing::{DeliveryOutcome, HopKind, Router, RouterConfig};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Topology file (TOML).
    #[arg(short, long, default_value = "topology.toml")]
    pub topology: PathBuf,

    /// Destination address, e.g. /1/2 (use / for the root).
    #[arg(short, long)]
    pub address: String,

    /// Name of the node routing starts from (defaults to the root).
    #[arg(short, long)]
    pub from: Option<String>,

    /// Payload handed to the delivering node.
    #[arg(short, long, default_value = "")]
    pub payload: String,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct HopReport {
    node: String,
    kind: HopKind,
}

#[derive(Serialize)]
struct RouteReport {
    address: String,
    delivered: bool,
    node: Option<String>,
    hops: Vec<HopReport>,
}

pub fn run(args: &RouteArgs, config: &ArborConfig) -> anyhow::Result<()> {
    let spec = super::load_topology(&args.topology)?;
    let mut tree = spec.build::<String>(config.routing.strict_topology)?;
    let address: Address = args.address.parse()?;

    let start = match &args.from {
        Some(name) => match tree.find_by_name(name) {
            Some(id) => id,
            None => anyhow::bail!("no node named {:?} in {}", name, args.topology.display()),
        },
        None => tree.root(),
    };

    // JSON output owns stdout, so keep delivery reporting in the log.
    if !args.json {
        let ids: Vec<_> = tree.iter().map(|n| n.id()).collect();
        for id in ids {
            tree.on_deliver(id, |node, payload: String| {
                println!("{} handled: {:?}", node.name, payload);
            })?;
        }
    }

    let router = Router::new(RouterConfig::from(&config.routing));
    let outcome = router.route(&tree, start, Packet::new(address.clone(), args.payload.clone()))?;

    if args.json {
        let report = RouteReport {
            address: address.to_string(),
            delivered: outcome.is_delivered(),
            node: outcome.delivered_at().map(|id| tree.name_of(id).to_string()),
            hops: outcome
                .trace()
                .hops()
                .iter()
                .map(|hop| HopReport {
                    node: tree.name_of(hop.node).to_string(),
                    kind: hop.kind,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        super::print_outcome(&tree, &outcome);
    }

    if let DeliveryOutcome::Unrouted { packet, .. } = outcome {
        anyhow::bail!("no route found for address {}", packet.address);
    }
    Ok(())
}
