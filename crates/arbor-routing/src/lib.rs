//! Arbor Routing — hierarchical prefix-addressed packet delivery.
//!
//! This crate provides:
//! - [`RoutingTree`] — an arena of [`RoutingNode`]s with parent, child, and parallel links.
//! - [`Router`] — delivers a packet to the node whose address matches it exactly, by
//!   longest-prefix descent, parallel redirection, and parent escalation.
//! - [`RouteTrace`] — the hops taken by one routing attempt.
//! - [`DeliveryHandler`] — per-node callbacks, [`LogHandler`] by default.
//! - [`SharedTree`] — a tree behind a read-write lock for multi-threaded routing.
//! - [`TopologySpec`] — declarative tree descriptions loaded from TOML.

pub mod error;
pub mod handler;
pub mod router;
pub mod shared;
pub mod topology;
pub mod trace;
pub mod tree;

// Re-exports for convenience.
pub use error::RoutingError;
pub use handler::{DeliveryHandler, LogHandler, NodeIdentity};
pub use router::{
    best_child, navigate, step, Delivery, DeliveryOutcome, Router, RouterConfig, Step,
};
pub use shared::SharedTree;
pub use topology::{NodeSpec, ParallelSpec, RootSpec, TopologySpec};
pub use trace::{Hop, HopKind, RouteTrace};
pub use tree::{NodeId, RoutingNode, RoutingTree, TopologyIssue};
