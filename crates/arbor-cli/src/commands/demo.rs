//! `arbor demo` — Route the sample packets through the sample tree.

use arbor_core::{Address, ArborConfig, Packet, Segment};
use arbor_routing::{DeliveryOutcome, Router, RouterConfig, RoutingTree, TopologySpec};
use clap::Args;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Print the sample topology as TOML before routing.
    #[arg(long)]
    pub show_topology: bool,
}

/// One demo packet: where routing starts and what is sent.
pub struct Scenario {
    pub title: &'static str,
    pub start: &'static str,
    pub address: &'static [i64],
    pub payload: &'static str,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        title: "Packet for Node A1",
        start: "Root",
        address: &[1, 1],
        payload: "Hello, Node A1!",
    },
    Scenario {
        title: "Packet for Node A2",
        start: "Root",
        address: &[1, 2],
        payload: "Hello, Node A2!",
    },
    Scenario {
        title: "Packet for Node A1a",
        start: "Root",
        address: &[1, 1, 1],
        payload: "Hello, Node A1a!",
    },
    Scenario {
        title: "Packet for Node B1",
        start: "Root",
        address: &[2, 1],
        payload: "Hello, Node B1!",
    },
    Scenario {
        title: "Packet sent into the wrong branch, corrected by a parallel route",
        start: "Node A",
        address: &[2, 2],
        payload: "Hello, Node B2 via a parallel route!",
    },
    Scenario {
        title: "Packet for an address nobody owns",
        start: "Root",
        address: &[9],
        payload: "Hello, nobody!",
    },
];

/// Build the sample tree with handlers that print to stdout.
pub fn sample_tree(strict: bool) -> anyhow::Result<RoutingTree<Segment, String>> {
    let mut tree: RoutingTree<Segment, String> = TopologySpec::sample().build(strict)?;
    let ids: Vec<_> = tree.iter().map(|n| n.id()).collect();
    for id in ids {
        tree.on_deliver(id, |node, payload: String| {
            println!("  {} handled: {:?}", node.name, payload);
        })?;
    }
    Ok(tree)
}

/// Route every scenario through `tree`.
pub fn run_scenarios(
    tree: &RoutingTree<Segment, String>,
    router: &Router,
) -> anyhow::Result<Vec<DeliveryOutcome<String>>> {
    let mut outcomes = Vec::with_capacity(SCENARIOS.len());
    for (i, scenario) in SCENARIOS.iter().enumerate() {
        let address: Address = Address::new(scenario.address.iter().copied());
        println!();
        println!("Test {}: {} (address {})", i + 1, scenario.title, address);

        let Some(start) = tree.find_by_name(scenario.start) else {
            anyhow::bail!("demo start node {:?} missing from sample tree", scenario.start);
        };
        let packet = Packet::new(address, scenario.payload.to_string());
        let outcome = router.route(tree, start, packet)?;
        super::print_outcome(tree, &outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

pub fn run(args: &DemoArgs, config: &ArborConfig) -> anyhow::Result<()> {
    if args.show_topology {
        println!("{}", TopologySpec::sample().to_toml_string()?);
    }

    let tree = sample_tree(config.routing.strict_topology)?;
    let router = Router::new(RouterConfig::from(&config.routing));
    let outcomes = run_scenarios(&tree, &router)?;

    let delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
    println!();
    println!("{} of {} packets delivered.", delivered, outcomes.len());
    Ok(())
}
