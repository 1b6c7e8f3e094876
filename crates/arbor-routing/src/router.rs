use std::fmt;
use std::time::Instant;

use arbor_core::{Address, Packet, RoutingSettings, Segment};

use crate::error::RoutingError;
use crate::trace::{HopKind, RouteTrace};
use crate::tree::{NodeId, RoutingNode, RoutingTree};

/// Limits applied to a single routing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum number of moves before giving up.
    pub max_hops: usize,
    /// Fail as soon as a node is reached a second time.
    pub detect_loops: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_hops: 256,
            detect_loops: true,
        }
    }
}

impl From<&RoutingSettings> for RouterConfig {
    fn from(settings: &RoutingSettings) -> Self {
        Self {
            max_hops: settings.max_hops,
            detect_loops: settings.detect_loops,
        }
    }
}

/// A successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The node whose handler received the payload.
    pub node: NodeId,
    pub name: String,
    pub trace: RouteTrace,
}

/// Result of routing a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome<T, S = Segment> {
    /// A node's address matched exactly and its handler ran.
    Delivered(Delivery),
    /// The search ended at a node with no eligible child, no qualifying
    /// parallel node and no parent. The packet is handed back untouched.
    Unrouted {
        packet: Packet<T, S>,
        trace: RouteTrace,
    },
}

impl<T, S> DeliveryOutcome<T, S> {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }

    /// The delivering node, if any.
    pub fn delivered_at(&self) -> Option<NodeId> {
        match self {
            DeliveryOutcome::Delivered(delivery) => Some(delivery.node),
            DeliveryOutcome::Unrouted { .. } => None,
        }
    }

    pub fn trace(&self) -> &RouteTrace {
        match self {
            DeliveryOutcome::Delivered(delivery) => &delivery.trace,
            DeliveryOutcome::Unrouted { trace, .. } => trace,
        }
    }
}

/// What to do at a node, given the packet's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The node's address matches exactly.
    Deliver,
    /// Continue at another node.
    Hop(NodeId, HopKind),
    /// Nowhere left to go.
    Unrouted,
}

/// Decide the next step at `node`: exact match first, then descent, then
/// [`navigate`].
pub fn step<S: PartialEq, T>(
    tree: &RoutingTree<S, T>,
    node: &RoutingNode<S, T>,
    address: &Address<S>,
) -> Step {
    if node.address().matches_exactly(address) {
        return Step::Deliver;
    }
    if let Some(child) = best_child(tree, node, address) {
        return Step::Hop(child, HopKind::Descend);
    }
    match navigate(tree, node, address) {
        Some((next, kind)) => Step::Hop(next, kind),
        None => Step::Unrouted,
    }
}

/// The most specific child whose address is a prefix of `address`.
///
/// A child must be strictly longer than `node` itself to qualify, and among
/// children of equal length the first one in insertion order wins.
pub fn best_child<S: PartialEq, T>(
    tree: &RoutingTree<S, T>,
    node: &RoutingNode<S, T>,
    address: &Address<S>,
) -> Option<NodeId> {
    let mut best = None;
    let mut best_len = node.address().len();
    for (_, child_id) in node.children() {
        let Some(child) = tree.node(child_id) else {
            continue;
        };
        let child_address = child.address();
        if child_address.is_prefix_of(address) && child_address.len() > best_len {
            best = Some(child_id);
            best_len = child_address.len();
        }
    }
    best
}

/// Fallback when no child qualifies.
///
/// Picks the first parallel node that agrees with `address` over a strictly
/// longer leading run than `node` does and is a genuine prefix of it;
/// otherwise escalates to the parent. `None` means `node` is a root with no
/// usable alternative.
pub fn navigate<S: PartialEq, T>(
    tree: &RoutingTree<S, T>,
    node: &RoutingNode<S, T>,
    address: &Address<S>,
) -> Option<(NodeId, HopKind)> {
    let current_match = node.address().divergence_index(address);
    let parallel = node.parallel().iter().copied().find(|&id| {
        tree.node(id).is_some_and(|p| {
            p.address().divergence_index(address) > current_match
                && p.address().is_prefix_of(address)
        })
    });
    if let Some(p) = parallel {
        return Some((p, HopKind::Parallel));
    }
    node.parent().map(|parent| (parent, HopKind::Escalate))
}

/// Delivers packets through a [`RoutingTree`].
///
/// Each step depends only on the current node and the packet address, so the
/// traversal is a loop over nodes rather than recursion. Loop detection and
/// the hop limit bound malformed trees.
#[derive(Debug, Clone, Default)]
pub struct Router {
    config: RouterConfig,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route `packet` starting the search at `start`.
    pub fn route<S, T>(
        &self,
        tree: &RoutingTree<S, T>,
        start: NodeId,
        packet: Packet<T, S>,
    ) -> Result<DeliveryOutcome<T, S>, RoutingError>
    where
        S: PartialEq + fmt::Display,
    {
        self.run(tree, start, packet, None)
    }

    /// Route from the tree's root.
    pub fn route_from_root<S, T>(
        &self,
        tree: &RoutingTree<S, T>,
        packet: Packet<T, S>,
    ) -> Result<DeliveryOutcome<T, S>, RoutingError>
    where
        S: PartialEq + fmt::Display,
    {
        self.run(tree, tree.root(), packet, None)
    }

    /// Like [`Router::route`] but gives up once `deadline` has passed.
    ///
    /// The deadline is checked between hops; a handler that blocks is not
    /// interrupted.
    pub fn route_until<S, T>(
        &self,
        tree: &RoutingTree<S, T>,
        start: NodeId,
        packet: Packet<T, S>,
        deadline: Instant,
    ) -> Result<DeliveryOutcome<T, S>, RoutingError>
    where
        S: PartialEq + fmt::Display,
    {
        self.run(tree, start, packet, Some(deadline))
    }

    fn run<S, T>(
        &self,
        tree: &RoutingTree<S, T>,
        start: NodeId,
        packet: Packet<T, S>,
        deadline: Option<Instant>,
    ) -> Result<DeliveryOutcome<T, S>, RoutingError>
    where
        S: PartialEq + fmt::Display,
    {
        let mut node = tree.get(start)?;
        let mut trace = RouteTrace::new(start);
        let mut visited = if self.config.detect_loops {
            vec![false; tree.len()]
        } else {
            Vec::new()
        };
        if let Some(seen) = visited.get_mut(start.index()) {
            *seen = true;
        }

        loop {
            match step(tree, node, &packet.address) {
                Step::Deliver => {
                    tracing::debug!(
                        node = node.name(),
                        address = %packet.address,
                        hops = trace.hop_count(),
                        "delivering packet"
                    );
                    let delivery = Delivery {
                        node: node.id(),
                        name: node.name().to_string(),
                        trace,
                    };
                    node.deliver(packet.payload);
                    return Ok(DeliveryOutcome::Delivered(delivery));
                }
                Step::Unrouted => {
                    tracing::warn!(
                        node = node.name(),
                        address = %packet.address,
                        hops = trace.hop_count(),
                        "no route found for packet"
                    );
                    return Ok(DeliveryOutcome::Unrouted { packet, trace });
                }
                Step::Hop(next, kind) => {
                    let hops = trace.hop_count();
                    if hops >= self.config.max_hops {
                        return Err(RoutingError::HopLimitExceeded {
                            max_hops: self.config.max_hops,
                            node: node.name().to_string(),
                        });
                    }
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return Err(RoutingError::DeadlineExceeded {
                            node: node.name().to_string(),
                            hops,
                        });
                    }
                    let next_node = tree.get(next)?;
                    if let Some(seen) = visited.get_mut(next.index()) {
                        if *seen {
                            return Err(RoutingError::RoutingLoop {
                                node: next_node.name().to_string(),
                                hops: hops + 1,
                            });
                        }
                        *seen = true;
                    }
                    tracing::trace!(
                        from = node.name(),
                        to = next_node.name(),
                        kind = ?kind,
                        "routing hop"
                    );
                    trace.push(next, kind);
                    node = next_node;
                }
            }
        }
    }
}
