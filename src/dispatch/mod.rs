// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Route compilation - from topology to dispatch table.
//!
//! For every node the compiler produces one [`BackendPool`] and one
//! [`RouteTarget`], then registers the target once per accepted method at
//! the exact resource path, plus at `resource*` for non-root resources so
//! sub-paths match too.
//!
//! Lookup honors the engine contract: an exact-literal match always beats a
//! wildcard match, and among wildcard matches the longest registered prefix
//! wins. The compiler itself performs no prefix-overlap resolution - node
//! paths are assumed non-conflicting in practice, and overlapping nodes
//! simply produce overlapping but independently valid registrations.

mod pool;


pub use pool::{BackendInstance, BackendPool, InstanceGuard};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::config::ProxySettings;
use crate::security::BasicAuthGate;
use crate::topology::{HttpMethod, Topology};

/// A compiled forwarding target: the node's pool, the per-request budget
/// and the optional authentication gate in front of it.
#[derive(Debug)]
pub struct RouteTarget {
    resource: String,
    pool: Arc<BackendPool>,
    max_request_time: Duration,
    auth: Option<Arc<BasicAuthGate>>,
}

impl RouteTarget {
    /// The resource path this target forwards for.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The backend pool behind this target.
    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    /// Maximum duration a forwarded request may take.
    pub fn max_request_time(&self) -> Duration {
        self.max_request_time
    }

    /// The authentication gate, when one is configured globally.
    pub fn auth_gate(&self) -> Option<&Arc<BasicAuthGate>> {
        self.auth.as_ref()
    }
}

/// The compiled set of method+path routes handed to the HTTP engine.
///
/// Built once during startup and queried concurrently afterwards; lookups
/// take `&self` and no locking is involved.
#[derive(Debug, Default)]
pub struct DispatchTable {
    targets: Vec<Arc<RouteTarget>>,
    exact: HashMap<(HttpMethod, String), usize>,
    /// Wildcard registrations as (method, prefix, target); sorted by
    /// descending prefix length so the first hit is the longest prefix.
    wildcard: Vec<(HttpMethod, String, usize)>,
}

impl DispatchTable {
    /// Compile a topology into a dispatch table.
    ///
    /// A node without instances still compiles into routes over an empty
    /// pool; the shortfall surfaces per request as service-unavailable.
    pub fn compile(topology: &Topology, settings: &ProxySettings) -> Self {
        let auth = settings
            .basic_authentication
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|credential| Arc::new(BasicAuthGate::new(credential)));

        let mut table = Self::default();

        for node in topology.nodes() {
            let resource = node.resource();

            let mut pool = BackendPool::new(resource, settings.connections_by_thread);
            for instance in node.instances() {
                pool.add_instance(instance.clone());
            }

            let target = Arc::new(RouteTarget {
                resource: resource.to_string(),
                pool: Arc::new(pool),
                max_request_time: settings.max_request_duration(),
                auth: auth.clone(),
            });

            let index = table.targets.len();
            table.targets.push(target);

            for &method in node.methods() {
                table
                    .exact
                    .insert((method, resource.to_string()), index);

                if resource != "/" {
                    table
                        .wildcard
                        .push((method, resource.to_string(), index));
                }
            }

            debug!(
                "Compiled route [{}] with {} instance(s) and {} method(s)",
                resource,
                node.instances().len(),
                node.methods().len()
            );
        }

        // longest registered prefix first
        table
            .wildcard
            .sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.1.cmp(&b.1)));

        table
    }

    /// Resolve a request to a target. Exact matches win over wildcard
    /// matches; among wildcards the longest prefix wins.
    pub fn resolve(&self, method: HttpMethod, path: &str) -> Option<&Arc<RouteTarget>> {
        if let Some(&index) = self.exact.get(&(method, path.to_string())) {
            return Some(&self.targets[index]);
        }

        self.wildcard
            .iter()
            .find(|(m, prefix, _)| *m == method && path.starts_with(prefix.as_str()))
            .map(|&(_, _, index)| &self.targets[index])
    }

    /// The compiled targets, one per node, in compilation order.
    pub fn targets(&self) -> &[Arc<RouteTarget>] {
        &self.targets
    }

    /// Number of registered routes, exact and wildcard combined.
    pub fn route_count(&self) -> usize {
        self.exact.len() + self.wildcard.len()
    }

    /// True when no route was compiled.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
