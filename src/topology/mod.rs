// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routing topology - the normalized, queryable node registry.
//!
//! Raw configuration strings become [`NodeDescriptor`]s through
//! [`parse_node_configs`]; the [`Topology`] deduplicates and normalizes them
//! into a canonical mapping from resource path to [`ProxyNode`]. The
//! registry is built once during startup, before any traffic is accepted,
//! and is immutable afterwards - hot reload is a possible extension point
//! but deliberately unsupported, which is why a plain ordered map suffices
//! as the backing structure.

mod node;
mod parser;

#[cfg(test)]
mod tests;

pub use node::{normalize_resource, HttpMethod, NodeDescriptor, ProxyNode, DEFAULT_METHODS};
pub use parser::parse_node_configs;

use std::collections::BTreeMap;

use url::Url;

/// The complete, deduplicated set of proxy nodes, keyed by normalized
/// resource path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    nodes: BTreeMap<String, ProxyNode>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology from parsed descriptors, merging duplicates.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = NodeDescriptor>,
    {
        let mut topology = Self::new();
        for descriptor in descriptors {
            topology.register(
                descriptor.name.as_deref(),
                &descriptor.resource,
                descriptor.methods,
                descriptor.instances,
            );
        }
        topology
    }

    /// Register a node, normalizing the resource path first.
    ///
    /// When a node already exists for the normalized path, only the
    /// instances are appended; the first registration's name and methods
    /// stay authoritative.
    pub fn register(
        &mut self,
        name: Option<&str>,
        resource: &str,
        methods: Option<Vec<HttpMethod>>,
        instances: Vec<Url>,
    ) -> &ProxyNode {
        let key = normalize_resource(resource);

        let node = self
            .nodes
            .entry(key.clone())
            .or_insert_with(|| ProxyNode::new(name, &key, methods, Vec::new()));

        for instance in instances {
            node.add_instance(instance);
        }

        node
    }

    /// The registered resource paths, in ascending order.
    pub fn resources(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    /// Look up a node by its exact normalized resource path.
    pub fn node(&self, resource: &str) -> Option<&ProxyNode> {
        self.nodes.get(resource)
    }

    /// All nodes, sorted ascending case-insensitively by resource path.
    pub fn nodes(&self) -> Vec<&ProxyNode> {
        let mut nodes: Vec<&ProxyNode> = self.nodes.values().collect();
        nodes.sort_by_key(|n| n.resource().to_lowercase());
        nodes
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize the registry to the structured JSON form, a mapping from
    /// resource path to node object. Parsing the result back yields an
    /// equal topology.
    pub fn to_structured(&self) -> Result<String, serde_json::Error> {
        let map: BTreeMap<&str, NodeDescriptor> = self
            .nodes
            .values()
            .map(|n| (n.resource(), n.descriptor()))
            .collect();
        serde_json::to_string(&map)
    }
}
