//! Integration test: routing through the two-branch sample tree.
//!
//! Root=/ ; A=/1 and B=/2 under Root, mutually parallel ; A1=/1/1 and
//! A2=/1/2 under A ; B1=/2/1 and B2=/2/2 under B ; A1a=/1/1/1 under A1.

use std::sync::{Arc, Mutex};

use arbor_core::{Address, Packet, Segment};
use arbor_routing::{
    DeliveryOutcome, HopKind, NodeId, Router, RoutingError, RoutingTree, TopologySpec,
};

type Deliveries = Arc<Mutex<Vec<(String, String)>>>;

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

fn recording_tree() -> (RoutingTree<Segment, String>, Deliveries) {
    let mut tree: RoutingTree<Segment, String> = TopologySpec::sample().build(true).unwrap();
    let deliveries: Deliveries = Arc::new(Mutex::new(Vec::new()));
    let ids: Vec<NodeId> = tree.iter().map(|n| n.id()).collect();
    for id in ids {
        let sink = Arc::clone(&deliveries);
        tree.on_deliver(id, move |node, payload: String| {
            sink.lock().unwrap().push((node.name.to_string(), payload));
        })
        .unwrap();
    }
    (tree, deliveries)
}

fn id(tree: &RoutingTree<Segment, String>, name: &str) -> NodeId {
    tree.find_by_name(name).unwrap()
}

fn route(
    tree: &RoutingTree<Segment, String>,
    from: &str,
    address: &str,
) -> DeliveryOutcome<String> {
    Router::with_defaults()
        .route(
            tree,
            id(tree, from),
            Packet::new(addr(address), format!("to {}", address)),
        )
        .unwrap()
}

// =========================================================================
// Concrete scenarios
// =========================================================================

#[test]
fn test_scenario_root_to_a1() {
    let (tree, deliveries) = recording_tree();
    let out = route(&tree, "Root", "/1/1");
    assert_eq!(out.delivered_at(), Some(id(&tree, "Node A1")));
    assert_eq!(out.trace().render(&tree), "Root -> Node A -> Node A1");
    assert_eq!(
        *deliveries.lock().unwrap(),
        vec![("Node A1".to_string(), "to /1/1".to_string())]
    );
}

#[test]
fn test_scenario_root_to_a2() {
    let (tree, _) = recording_tree();
    let out = route(&tree, "Root", "/1/2");
    assert_eq!(out.delivered_at(), Some(id(&tree, "Node A2")));
    assert_eq!(out.trace().render(&tree), "Root -> Node A -> Node A2");
}

#[test]
fn test_scenario_root_to_a1a() {
    let (tree, _) = recording_tree();
    let out = route(&tree, "Root", "/1/1/1");
    assert_eq!(out.delivered_at(), Some(id(&tree, "Node A1a")));
    assert_eq!(
        out.trace().render(&tree),
        "Root -> Node A -> Node A1 -> Node A1a"
    );
}

#[test]
fn test_scenario_root_to_b1() {
    let (tree, _) = recording_tree();
    let out = route(&tree, "Root", "/2/1");
    assert_eq!(out.delivered_at(), Some(id(&tree, "Node B1")));
    assert_eq!(out.trace().render(&tree), "Root -> Node B -> Node B1");
}

#[test]
fn test_scenario_wrong_branch_corrected_by_parallel() {
    let (tree, deliveries) = recording_tree();
    let out = route(&tree, "Node A", "/2/2");
    assert_eq!(out.delivered_at(), Some(id(&tree, "Node B2")));

    let kinds: Vec<HopKind> = out.trace().hops().iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec![HopKind::Start, HopKind::Parallel, HopKind::Descend]);
    assert_eq!(deliveries.lock().unwrap()[0].0, "Node B2");
}

#[test]
fn test_scenario_no_matching_node() {
    let (tree, deliveries) = recording_tree();
    match route(&tree, "Root", "/9") {
        DeliveryOutcome::Unrouted { packet, trace } => {
            assert_eq!(packet.address, addr("/9"));
            assert_eq!(packet.payload, "to /9");
            assert_eq!(trace.last(), tree.root());
        }
        DeliveryOutcome::Delivered(d) => panic!("unexpected delivery at {}", d.name),
    }
    assert!(deliveries.lock().unwrap().is_empty());
}

// =========================================================================
// Properties
// =========================================================================

#[test]
fn test_every_node_reachable_from_every_node() {
    let (tree, _) = recording_tree();
    let addresses: Vec<(NodeId, Address)> = tree
        .iter()
        .map(|n| (n.id(), n.address().clone()))
        .collect();

    for start in tree.iter() {
        for (target, address) in &addresses {
            let out = Router::with_defaults()
                .route(&tree, start.id(), Packet::new(address.clone(), String::new()))
                .unwrap();
            assert_eq!(
                out.delivered_at(),
                Some(*target),
                "{} -> {} took {}",
                start.name(),
                address,
                out.trace().render(&tree)
            );
        }
    }
}

#[test]
fn test_exact_match_takes_precedence_everywhere() {
    let (tree, _) = recording_tree();
    for node in tree.iter() {
        let out = Router::with_defaults()
            .route(
                &tree,
                node.id(),
                Packet::new(node.address().clone(), String::new()),
            )
            .unwrap();
        assert_eq!(out.delivered_at(), Some(node.id()));
        assert_eq!(out.trace().hop_count(), 0);
    }
}

#[test]
fn test_descent_only_through_genuine_prefixes() {
    let (tree, _) = recording_tree();
    for target in ["/1/1/1", "/1/2", "/2/1", "/2/2", "/2/2/5", "/3"] {
        let target = addr(target);
        let out = Router::with_defaults()
            .route_from_root(&tree, Packet::new(target.clone(), String::new()));
        let Ok(out) = out else { continue };
        for hop in out.trace().hops() {
            if hop.kind == HopKind::Descend {
                let node = tree.node(hop.node).unwrap();
                assert!(node.address().is_prefix_of(&target));
            }
        }
    }
}

#[test]
fn test_parallel_hops_strictly_improve_match() {
    let (tree, _) = recording_tree();
    let target = addr("/2/2");
    let out = route(&tree, "Node A1a", "/2/2");
    assert_eq!(out.delivered_at(), Some(id(&tree, "Node B2")));

    let hops = out.trace().hops();
    for pair in hops.windows(2) {
        if pair[1].kind == HopKind::Parallel {
            let before = tree.node(pair[0].node).unwrap().address();
            let after = tree.node(pair[1].node).unwrap().address();
            assert!(after.divergence_index(&target) > before.divergence_index(&target));
        }
    }
    assert_eq!(
        out.trace().render(&tree),
        "Node A1a ^ Node A1 ^ Node A ~> Node B -> Node B2"
    );
}

#[test]
fn test_unknown_suffix_under_known_prefix_is_a_loop() {
    let (tree, _) = recording_tree();
    let err = Router::with_defaults()
        .route_from_root(&tree, Packet::new(addr("/2/7"), String::new()))
        .unwrap_err();
    assert!(matches!(err, RoutingError::RoutingLoop { .. }));
}

#[test]
fn test_repeated_routing_is_deterministic() {
    let (tree, _) = recording_tree();
    let first = route(&tree, "Node B1", "/1/1/1");
    for _ in 0..10 {
        assert_eq!(route(&tree, "Node B1", "/1/1/1"), first);
    }
}
