use std::fmt;

use arbor_core::Address;
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::handler::{DeliveryHandler, LogHandler, NodeIdentity};

/// Index of a node inside a [`RoutingTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in its tree's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the routing tree.
///
/// `parent` and `parallel` are plain indices into the owning tree; they do
/// not own anything. `children` keeps insertion order, which decides ties
/// between equally specific children during descent.
pub struct RoutingNode<S, T> {
    id: NodeId,
    name: String,
    address: Address<S>,
    parent: Option<NodeId>,
    children: Vec<(String, NodeId)>,
    parallel: Vec<NodeId>,
    handler: Box<dyn DeliveryHandler<S, T>>,
}

impl<S, T> RoutingNode<S, T> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Address<S> {
        &self.address
    }

    /// The owning parent, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Children as `(key, id)` pairs in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.children.iter().map(|(key, id)| (key.as_str(), *id))
    }

    /// Look up a child by its key.
    pub fn child(&self, key: &str) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, id)| *id)
    }

    /// Parallel alternatives in the order they were linked.
    pub fn parallel(&self) -> &[NodeId] {
        &self.parallel
    }

    pub fn identity(&self) -> NodeIdentity<'_, S> {
        NodeIdentity {
            id: self.id,
            name: &self.name,
            address: &self.address,
        }
    }

    pub(crate) fn deliver(&self, payload: T) {
        self.handler.deliver(self.identity(), payload);
    }
}

impl<S: fmt::Debug, T> fmt::Debug for RoutingNode<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("address", &self.address)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

/// Structural problems reported by [`RoutingTree::validate`].
///
/// None of these stop the router from running, but they make routing
/// results depend on tie-breaks or lead to spurious unrouted packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyIssue {
    /// The child's address is not a strict extension of its parent's.
    ChildNotExtending { child: NodeId, parent: NodeId },
    /// Two siblings share an address; `shadowed` can never win descent.
    DuplicateAddress { first: NodeId, shadowed: NodeId },
    /// `from` lists `to` as parallel but not the other way around.
    AsymmetricParallel { from: NodeId, to: NodeId },
}

/// An arena-backed routing tree. The node at index 0 is the root.
///
/// Nodes are only ever added by [`RoutingTree::attach`] onto an existing
/// node, so every non-root node has exactly one parent and following parents
/// always ends at the root.
pub struct RoutingTree<S, T> {
    nodes: Vec<RoutingNode<S, T>>,
}

impl<S, T> RoutingTree<S, T> {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&RoutingNode<S, T>> {
        self.nodes.get(id.0)
    }

    /// Like [`RoutingTree::node`] but reports unknown ids as an error.
    pub fn get(&self, id: NodeId) -> Result<&RoutingNode<S, T>, RoutingError> {
        self.nodes.get(id.0).ok_or(RoutingError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut RoutingNode<S, T>, RoutingError> {
        self.nodes.get_mut(id.0).ok_or(RoutingError::UnknownNode(id))
    }

    /// Name of a node, or `"?"` for an unknown id.
    pub fn name_of(&self, id: NodeId) -> &str {
        self.node(id).map_or("?", |n| n.name())
    }

    /// All nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &RoutingNode<S, T>> + '_ {
        self.nodes.iter()
    }

    /// First node (in creation order) with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Ids from `id` up to and including the root.
    pub fn path_to_root(&self, id: NodeId) -> Result<Vec<NodeId>, RoutingError> {
        let mut path = vec![id];
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            path.push(parent);
            current = self.get(parent)?;
        }
        Ok(path)
    }

    /// Depth of a node; the root has depth 0.
    pub fn depth(&self, id: NodeId) -> Result<usize, RoutingError> {
        Ok(self.path_to_root(id)?.len() - 1)
    }

    /// Replace a node's delivery handler.
    pub fn set_handler<H>(&mut self, id: NodeId, handler: H) -> Result<(), RoutingError>
    where
        H: DeliveryHandler<S, T> + 'static,
    {
        self.get_mut(id)?.handler = Box::new(handler);
        Ok(())
    }

    /// Replace a node's delivery handler with a closure.
    pub fn on_deliver<F>(&mut self, id: NodeId, handler: F) -> Result<(), RoutingError>
    where
        F: Fn(NodeIdentity<'_, S>, T) + Send + Sync + 'static,
    {
        self.set_handler(id, handler)
    }

    /// Register `to` as a parallel alternative of `from` (one direction only).
    ///
    /// Returns `false` if the link already existed.
    pub fn add_parallel(&mut self, from: NodeId, to: NodeId) -> Result<bool, RoutingError> {
        let to_name = self.get(to)?.name.clone();
        let node = self.get_mut(from)?;
        if from == to {
            return Err(RoutingError::SelfParallel(to_name));
        }
        if node.parallel.contains(&to) {
            return Ok(false);
        }
        node.parallel.push(to);
        Ok(true)
    }

    /// Make `a` and `b` parallel alternatives of each other.
    pub fn link_parallel(&mut self, a: NodeId, b: NodeId) -> Result<(), RoutingError> {
        self.add_parallel(a, b)?;
        self.add_parallel(b, a)?;
        Ok(())
    }
}

impl<S, T> RoutingTree<S, T>
where
    S: PartialEq + fmt::Display,
    T: fmt::Debug,
{
    /// Create a tree consisting of a single root node.
    pub fn new(root_name: impl Into<String>, root_address: Address<S>) -> Self {
        let root = RoutingNode {
            id: NodeId(0),
            name: root_name.into(),
            address: root_address,
            parent: None,
            children: Vec::new(),
            parallel: Vec::new(),
            handler: Box::new(LogHandler),
        };
        Self { nodes: vec![root] }
    }

    /// Create a node and register it under `key` in `parent`'s children.
    ///
    /// The address is taken as given: nothing checks that it extends the
    /// parent's. Use [`RoutingTree::attach_checked`] to enforce that.
    pub fn attach(
        &mut self,
        parent: NodeId,
        key: impl Into<String>,
        name: impl Into<String>,
        address: Address<S>,
    ) -> Result<NodeId, RoutingError> {
        let key = key.into();
        let parent_node = self.get(parent)?;
        if parent_node.child(&key).is_some() {
            return Err(RoutingError::DuplicateChildKey {
                parent: parent_node.name.clone(),
                key,
            });
        }

        let id = NodeId(self.nodes.len());
        let name = name.into();
        tracing::trace!(
            node = %name,
            address = %address,
            parent = parent_node.name(),
            "attaching node"
        );
        self.nodes.push(RoutingNode {
            id,
            name,
            address,
            parent: Some(parent),
            children: Vec::new(),
            parallel: Vec::new(),
            handler: Box::new(LogHandler),
        });
        self.get_mut(parent)?.children.push((key, id));
        Ok(id)
    }

    /// Like [`RoutingTree::attach`] but rejects addresses that are not a
    /// strict extension of the parent's address.
    pub fn attach_checked(
        &mut self,
        parent: NodeId,
        key: impl Into<String>,
        name: impl Into<String>,
        address: Address<S>,
    ) -> Result<NodeId, RoutingError> {
        let parent_address = self.get(parent)?.address();
        if !parent_address.is_strict_prefix_of(&address) {
            return Err(RoutingError::AddressNotExtending {
                name: name.into(),
                address: address.to_string(),
                parent_address: parent_address.to_string(),
            });
        }
        self.attach(parent, key, name, address)
    }

    /// First node (in creation order) whose address exactly matches.
    pub fn find_by_address(&self, address: &Address<S>) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.address.matches_exactly(address))
            .map(|n| n.id)
    }

    /// Check the structure for problems the router does not guard against.
    pub fn validate(&self) -> Vec<TopologyIssue> {
        let mut issues = Vec::new();
        for node in &self.nodes {
            let children: Vec<NodeId> = node.children().map(|(_, id)| id).collect();
            for (i, &child_id) in children.iter().enumerate() {
                let Some(child) = self.node(child_id) else {
                    continue;
                };
                if !node.address.is_strict_prefix_of(&child.address) {
                    issues.push(TopologyIssue::ChildNotExtending {
                        child: child_id,
                        parent: node.id,
                    });
                }
                let shadowed_by = children[..i].iter().copied().find(|&earlier| {
                    self.node(earlier)
                        .is_some_and(|e| e.address.matches_exactly(&child.address))
                });
                if let Some(first) = shadowed_by {
                    issues.push(TopologyIssue::DuplicateAddress {
                        first,
                        shadowed: child_id,
                    });
                }
            }
            for &to in &node.parallel {
                let symmetric = self
                    .node(to)
                    .is_some_and(|other| other.parallel.contains(&node.id));
                if !symmetric {
                    issues.push(TopologyIssue::AsymmetricParallel { from: node.id, to });
                }
            }
        }
        issues
    }

    /// Human-readable description of a validation issue.
    pub fn describe(&self, issue: &TopologyIssue) -> String {
        let label = |id: NodeId| match self.node(id) {
            Some(n) => format!("{:?} ({})", n.name, n.address),
            None => id.to_string(),
        };
        match *issue {
            TopologyIssue::ChildNotExtending { child, parent } => format!(
                "child {} does not extend parent {}",
                label(child),
                label(parent)
            ),
            TopologyIssue::DuplicateAddress { first, shadowed } => format!(
                "sibling {} is shadowed by {} with the same address",
                label(shadowed),
                label(first)
            ),
            TopologyIssue::AsymmetricParallel { from, to } => format!(
                "{} lists {} as parallel but not vice versa",
                label(from),
                label(to)
            ),
        }
    }
}

impl<S: fmt::Debug, T> fmt::Debug for RoutingTree<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingTree")
            .field("nodes", &self.nodes)
            .finish()
    }
}
