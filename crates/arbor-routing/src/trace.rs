use serde::Serialize;

use crate::tree::{NodeId, RoutingTree};

/// How the router arrived at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HopKind {
    /// The node routing started from.
    Start,
    /// Moved to the most specific matching child.
    Descend,
    /// Redirected to a parallel node with a longer matching prefix.
    Parallel,
    /// Fell back to the parent.
    Escalate,
}

impl HopKind {
    fn arrow(self) -> &'static str {
        match self {
            HopKind::Start => "",
            HopKind::Descend => " -> ",
            HopKind::Parallel => " ~> ",
            HopKind::Escalate => " ^ ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub node: NodeId,
    pub kind: HopKind,
}

/// The ordered list of nodes visited during one routing attempt.
///
/// The first entry is always the start node with [`HopKind::Start`]. Traces
/// are only built by the router; they serialize for reports but are never
/// read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTrace {
    hops: Vec<Hop>,
}

impl RouteTrace {
    pub fn new(start: NodeId) -> Self {
        Self {
            hops: vec![Hop {
                node: start,
                kind: HopKind::Start,
            }],
        }
    }

    pub(crate) fn push(&mut self, node: NodeId, kind: HopKind) {
        self.hops.push(Hop { node, kind });
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Number of moves taken (the start node is not a move).
    pub fn hop_count(&self) -> usize {
        self.hops.len() - 1
    }

    pub fn origin(&self) -> NodeId {
        self.hops[0].node
    }

    /// The node the traversal ended at.
    pub fn last(&self) -> NodeId {
        self.hops[self.hops.len() - 1].node
    }

    /// Visited node ids in order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.hops.iter().map(|h| h.node)
    }

    pub fn count(&self, kind: HopKind) -> usize {
        self.hops.iter().filter(|h| h.kind == kind).count()
    }

    /// Render as node names joined by arrows, e.g. `Root -> Node A -> Node A1`.
    ///
    /// Descent is `->`, a parallel redirect `~>` and an escalation `^`.
    pub fn render<S, T>(&self, tree: &RoutingTree<S, T>) -> String {
        let mut out = String::new();
        for hop in &self.hops {
            out.push_str(hop.kind.arrow());
            out.push_str(tree.name_of(hop.node));
        }
        out
    }
}
