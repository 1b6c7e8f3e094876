//! Integration test: configuration and topology files driving a router.
//!
//! Covers ArborConfig from arbor-core together with TopologySpec, Router,
//! and SharedTree from arbor-routing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arbor_core::{Address, ArborConfig, Packet, Segment};
use arbor_routing::{
    Router, RouterConfig, RoutingError, RoutingTree, SharedTree, TopologyIssue, TopologySpec,
};

const DATACENTER: &str = r#"
[root]
name = "world"

[[nodes]]
name = "eu"
parent = "world"
address = ["eu"]

[[nodes]]
name = "eu-west"
parent = "eu"
address = ["eu", "west"]

[[nodes]]
name = "eu-west-rack-1"
key = "rack-1"
parent = "eu-west"
address = ["eu", "west", 1]

[[nodes]]
name = "us"
parent = "world"
address = ["us"]

[[nodes]]
name = "us-east"
parent = "us"
address = ["us", "east"]

[[parallel]]
from = "eu"
to = "us"
"#;

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

#[test]
fn test_labelled_topology_routes_by_prefix() {
    let spec = TopologySpec::from_toml_str(DATACENTER).unwrap();
    let tree: RoutingTree<Segment, String> = spec.build(true).unwrap();
    assert!(tree.validate().is_empty());

    let router = Router::with_defaults();
    let out = router
        .route_from_root(&tree, Packet::new(addr("/eu/west/1"), "job".to_string()))
        .unwrap();
    assert_eq!(out.delivered_at(), tree.find_by_name("eu-west-rack-1"));
    assert_eq!(out.trace().render(&tree), "world -> eu -> eu-west -> eu-west-rack-1");

    let eu = tree.find_by_name("eu").unwrap();
    let out = router
        .route(&tree, eu, Packet::new(addr("/us/east"), "job".to_string()))
        .unwrap();
    assert_eq!(out.trace().render(&tree), "eu ~> us -> us-east");
}

#[test]
fn test_config_limits_apply_to_router() {
    let config = ArborConfig::from_toml_str(
        r#"
[routing]
max_hops = 2
detect_loops = false
"#,
    )
    .unwrap();
    let router = Router::new(RouterConfig::from(&config.routing));

    let tree: RoutingTree<Segment, String> = TopologySpec::from_toml_str(DATACENTER)
        .unwrap()
        .build(config.routing.strict_topology)
        .unwrap();

    assert!(router
        .route_from_root(&tree, Packet::new(addr("/eu/west"), String::new()))
        .unwrap()
        .is_delivered());
    let err = router
        .route_from_root(&tree, Packet::new(addr("/eu/west/1"), String::new()))
        .unwrap_err();
    assert!(matches!(err, RoutingError::HopLimitExceeded { max_hops: 2, .. }));
}

#[test]
fn test_strict_config_rejects_malformed_topology() {
    let config = ArborConfig::from_toml_str("[routing]\nstrict_topology = true\n").unwrap();
    let malformed = DATACENTER.replace(
        r#"address = ["us", "east"]"#,
        r#"address = ["eu", "east"]"#,
    );
    let spec = TopologySpec::from_toml_str(&malformed).unwrap();

    assert!(matches!(
        spec.build::<String>(config.routing.strict_topology),
        Err(RoutingError::AddressNotExtending { .. })
    ));

    let lenient: RoutingTree<Segment, String> = spec.build(false).unwrap();
    let us_east = lenient.find_by_name("us-east").unwrap();
    let us = lenient.find_by_name("us").unwrap();
    assert_eq!(
        lenient.validate(),
        vec![TopologyIssue::ChildNotExtending {
            child: us_east,
            parent: us
        }]
    );
}

#[test]
fn test_shared_tree_routes_from_many_threads() {
    let spec = TopologySpec::sample();
    let mut tree: RoutingTree<Segment, usize> = spec.build(true).unwrap();
    let delivered = Arc::new(AtomicUsize::new(0));
    let ids: Vec<_> = tree.iter().map(|n| n.id()).collect();
    for id in ids {
        let counter = Arc::clone(&delivered);
        tree.on_deliver(id, move |_node, _payload: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    let shared = SharedTree::new(tree, Router::with_defaults());
    let targets = ["/1/1", "/1/2", "/1/1/1", "/2/1", "/2/2", "/", "/1", "/2"];

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for (i, target) in targets.iter().enumerate() {
                    let out = shared
                        .route_from_root(Packet::new(addr(target), t * 100 + i))
                        .unwrap();
                    assert!(out.is_delivered(), "{} not delivered", target);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(delivered.load(Ordering::SeqCst), 4 * targets.len());
}

#[test]
fn test_trace_serializes_for_reporting() {
    let tree: RoutingTree<Segment, String> = TopologySpec::sample().build(true).unwrap();
    let a = tree.find_by_name("Node A").unwrap();
    let out = Router::with_defaults()
        .route(&tree, a, Packet::new(addr("/2/2"), String::new()))
        .unwrap();

    let json = serde_json::to_value(out.trace()).unwrap();
    let kinds: Vec<&str> = json["hops"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["start", "parallel", "descend"]);
}

#[test]
fn test_numeric_looking_label_is_reachable_by_text_address() {
    let spec = TopologySpec::from_toml_str(
        r#"
[[nodes]]
name = "numeric"
parent = "Root"
address = [1]

[[nodes]]
name = "textual"
parent = "Root"
address = ["1"]
"#,
    )
    .unwrap();
    let tree: RoutingTree<Segment, String> = spec.build(true).unwrap();
    let textual = tree.find_by_name("textual").unwrap();
    let written = tree.node(textual).unwrap().address().to_string();
    assert_eq!(written, "/'1'");

    let router = Router::with_defaults();
    let out = router
        .route_from_root(&tree, Packet::new(addr(&written), String::new()))
        .unwrap();
    assert_eq!(out.delivered_at(), Some(textual));
    let out = router
        .route_from_root(&tree, Packet::new(addr("/1"), String::new()))
        .unwrap();
    assert_eq!(out.delivered_at(), tree.find_by_name("numeric"));
}
