use std::fmt;
use std::sync::Arc;

use arbor_core::Packet;
use parking_lot::RwLock;

use crate::error::RoutingError;
use crate::router::{DeliveryOutcome, Router};
use crate::tree::{NodeId, RoutingTree};

/// A routing tree that can be shared between threads.
///
/// Routing holds the read lock for the whole attempt, so any number of
/// packets can be routed concurrently. Structural changes go through
/// [`SharedTree::mutate`] or [`SharedTree::replace`], which wait for
/// in-flight routes to finish.
///
/// Reads are taken recursively, so a handler may forward a packet through
/// the same `SharedTree` even while a writer is queued. A handler must not
/// call `mutate` or `replace` on its own tree; that deadlocks.
pub struct SharedTree<S, T> {
    tree: Arc<RwLock<RoutingTree<S, T>>>,
    router: Router,
}

impl<S, T> Clone for SharedTree<S, T> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            router: self.router.clone(),
        }
    }
}

impl<S, T> SharedTree<S, T>
where
    S: PartialEq + fmt::Display,
{
    pub fn new(tree: RoutingTree<S, T>, router: Router) -> Self {
        Self {
            tree: Arc::new(RwLock::new(tree)),
            router,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn route(
        &self,
        start: NodeId,
        packet: Packet<T, S>,
    ) -> Result<DeliveryOutcome<T, S>, RoutingError> {
        let tree = self.tree.read_recursive();
        self.router.route(&tree, start, packet)
    }

    pub fn route_from_root(
        &self,
        packet: Packet<T, S>,
    ) -> Result<DeliveryOutcome<T, S>, RoutingError> {
        let tree = self.tree.read_recursive();
        self.router.route_from_root(&tree, packet)
    }

    /// Run `f` with shared read access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&RoutingTree<S, T>) -> R) -> R {
        f(&self.tree.read_recursive())
    }

    /// Run `f` with exclusive access to the tree.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut RoutingTree<S, T>) -> R) -> R {
        f(&mut self.tree.write())
    }

    /// Swap in a freshly built tree, returning the previous one.
    pub fn replace(&self, tree: RoutingTree<S, T>) -> RoutingTree<S, T> {
        std::mem::replace(&mut *self.tree.write(), tree)
    }
}
