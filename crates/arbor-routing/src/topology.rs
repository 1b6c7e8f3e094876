//! Declarative tree descriptions, usually read from TOML:
//!
//! ```toml
//! [root]
//! name = "Root"
//! address = []
//!
//! [[nodes]]
//! name = "Node A"
//! key = "A"
//! parent = "Root"
//! address = [1]
//!
//! [[parallel]]
//! from = "Node A"
//! to = "Node B"
//! ```
//!
//! Parents must be declared before their children.

use std::collections::HashMap;
use std::fmt;

use arbor_core::{Address, Segment};
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::tree::{NodeId, RoutingTree};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySpec {
    #[serde(default)]
    pub root: RootSpec,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub parallel: Vec<ParallelSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootSpec {
    #[serde(default = "default_root_name")]
    pub name: String,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique node name, also used to refer to the node elsewhere in the file.
    pub name: String,
    /// Key under the parent's children; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Name of the parent node.
    pub parent: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelSpec {
    pub from: String,
    pub to: String,
    /// Also link `to` back to `from`.
    #[serde(default = "default_true")]
    pub symmetric: bool,
}

fn default_root_name() -> String {
    "Root".into()
}
fn default_true() -> bool {
    true
}

impl Default for RootSpec {
    fn default() -> Self {
        Self {
            name: default_root_name(),
            address: Address::root(),
        }
    }
}

impl TopologySpec {
    pub fn from_toml_str(contents: &str) -> Result<Self, RoutingError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String, RoutingError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The two-branch sample tree used by `arbor demo`.
    ///
    /// Root (`/`) with `Node A` (`/1`) and `Node B` (`/2`) as mutually
    /// parallel children; A has `/1/1` and `/1/2`, B has `/2/1` and `/2/2`,
    /// and `Node A1a` (`/1/1/1`) sits below A1.
    pub fn sample() -> Self {
        let node = |key: &str, parent: &str, address: &[i64]| NodeSpec {
            name: format!("Node {}", key),
            key: Some(key.to_string()),
            parent: parent.to_string(),
            address: Address::new(address.iter().copied()),
        };
        Self {
            root: RootSpec::default(),
            nodes: vec![
                node("A", "Root", &[1]),
                node("B", "Root", &[2]),
                node("A1", "Node A", &[1, 1]),
                node("A2", "Node A", &[1, 2]),
                node("B1", "Node B", &[2, 1]),
                node("B2", "Node B", &[2, 2]),
                node("A1a", "Node A1", &[1, 1, 1]),
            ],
            parallel: vec![ParallelSpec {
                from: "Node A".into(),
                to: "Node B".into(),
                symmetric: true,
            }],
        }
    }

    /// Build a routing tree. With `strict` set, every node's address must
    /// strictly extend its parent's.
    pub fn build<T>(&self, strict: bool) -> Result<RoutingTree<Segment, T>, RoutingError>
    where
        T: fmt::Debug,
    {
        let mut tree = RoutingTree::new(self.root.name.clone(), self.root.address.clone());
        let mut ids: HashMap<&str, NodeId> = HashMap::new();
        ids.insert(&self.root.name, tree.root());

        for spec in &self.nodes {
            if ids.contains_key(spec.name.as_str()) {
                return Err(RoutingError::DuplicateNodeName(spec.name.clone()));
            }
            let parent = *ids
                .get(spec.parent.as_str())
                .ok_or_else(|| RoutingError::UnknownNodeName(spec.parent.clone()))?;
            let key = spec.key.clone().unwrap_or_else(|| spec.name.clone());
            let id = if strict {
                tree.attach_checked(parent, key, spec.name.clone(), spec.address.clone())?
            } else {
                tree.attach(parent, key, spec.name.clone(), spec.address.clone())?
            };
            ids.insert(&spec.name, id);
        }

        for link in &self.parallel {
            let lookup = |name: &str| {
                ids.get(name)
                    .copied()
                    .ok_or_else(|| RoutingError::UnknownNodeName(name.to_string()))
            };
            let (from, to) = (lookup(link.from.as_str())?, lookup(link.to.as_str())?);
            if link.symmetric {
                tree.link_parallel(from, to)?;
            } else {
                tree.add_parallel(from, to)?;
            }
        }

        tracing::debug!(
            nodes = tree.len(),
            parallel_links = self.parallel.len(),
            strict,
            "built routing tree from topology"
        );
        Ok(tree)
    }
}
