use std::fmt;

use arbor_core::Address;

use crate::tree::NodeId;

/// Identity of the node a packet is being delivered to.
#[derive(Debug, Clone, Copy)]
pub struct NodeIdentity<'a, S> {
    pub id: NodeId,
    pub name: &'a str,
    pub address: &'a Address<S>,
}

/// Receives the payload of a packet whose address exactly matches a node.
///
/// Handlers run synchronously on the routing thread, inside the `route`
/// call that reached them. Any closure `Fn(NodeIdentity<'_, S>, T)` is a
/// handler.
pub trait DeliveryHandler<S, T>: Send + Sync {
    fn deliver(&self, node: NodeIdentity<'_, S>, payload: T);
}

impl<S, T, F> DeliveryHandler<S, T> for F
where
    F: Fn(NodeIdentity<'_, S>, T) + Send + Sync,
{
    fn deliver(&self, node: NodeIdentity<'_, S>, payload: T) {
        self(node, payload)
    }
}

/// Default handler: records the delivery as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHandler;

impl<S, T> DeliveryHandler<S, T> for LogHandler
where
    S: fmt::Display,
    T: fmt::Debug,
{
    fn deliver(&self, node: NodeIdentity<'_, S>, payload: T) {
        tracing::info!(
            node = node.name,
            address = %node.address,
            payload = ?payload,
            "packet handled"
        );
    }
}
