use crate::tree::NodeId;

/// Errors that can occur while building a routing tree or routing a packet.
///
/// An unroutable packet is not an error; see
/// [`DeliveryOutcome::Unrouted`](crate::DeliveryOutcome::Unrouted).
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown node name {0:?}")]
    UnknownNodeName(String),

    #[error("duplicate node name {0:?}")]
    DuplicateNodeName(String),

    #[error("node {parent:?} already has a child under key {key:?}")]
    DuplicateChildKey { parent: String, key: String },

    #[error("address {address} of {name:?} does not extend parent address {parent_address}")]
    AddressNotExtending {
        name: String,
        address: String,
        parent_address: String,
    },

    #[error("node {0:?} cannot be parallel to itself")]
    SelfParallel(String),

    #[error("maximum hop count exceeded: {max_hops} (stopped at {node:?})")]
    HopLimitExceeded { max_hops: usize, node: String },

    #[error("routing loop detected: {node:?} revisited after {hops} hops")]
    RoutingLoop { node: String, hops: usize },

    #[error("routing deadline exceeded after {hops} hops (stopped at {node:?})")]
    DeadlineExceeded { node: String, hops: usize },

    #[error("topology parse error: {0}")]
    TopologyParse(#[from] toml::de::Error),

    #[error("topology serialization error: {0}")]
    TopologySerialize(#[from] toml::ser::Error),
}
