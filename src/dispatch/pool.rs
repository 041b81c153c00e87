// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-node backend pool with round-robin selection.
//!
//! Selection must be safe under concurrent acquisition from many in-flight
//! requests: the rotation cursor and the per-instance accounting are plain
//! atomics, and capacity is claimed through RAII guards so a slot is always
//! released when the request finishes.

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use url::Url;

/// A single backend target, tagged with the resource path it serves.
#[derive(Debug)]
pub struct BackendInstance {
    uri: Url,
    resource: String,
    active: AtomicUsize,
}

impl BackendInstance {
    fn new(uri: Url, resource: &str) -> Self {
        Self {
            uri,
            resource: resource.to_string(),
            active: AtomicUsize::new(0),
        }
    }

    /// The backend base URI.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The resource path this instance was registered for.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Number of requests currently holding a slot on this instance.
    pub fn active_requests(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Claim a slot if the instance is below `cap`.
    fn try_acquire(self: &Arc<Self>, cap: usize) -> Option<InstanceGuard> {
        let mut prev = self.active.load(Ordering::Relaxed);
        loop {
            if prev >= cap {
                return None;
            }
            match self.active.compare_exchange_weak(
                prev,
                prev + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => prev = current,
            }
        }

        Some(InstanceGuard {
            instance: self.clone(),
        })
    }
}

/// RAII slot on a backend instance; dropping it releases the slot.
#[derive(Debug)]
pub struct InstanceGuard {
    instance: Arc<BackendInstance>,
}

impl Deref for InstanceGuard {
    type Target = BackendInstance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.instance.active.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Round-robin pool over a node's backend instances.
///
/// A pool may be empty; acquisition then always fails and the request
/// surfaces as service-unavailable, by design a runtime condition rather
/// than a compile-time error.
#[derive(Debug)]
pub struct BackendPool {
    resource: String,
    max_connections: usize,
    instances: Vec<Arc<BackendInstance>>,
    cursor: AtomicUsize,
}

impl BackendPool {
    /// Create an empty pool for a resource with a per-instance concurrency
    /// cap.
    pub fn new(resource: &str, max_connections: usize) -> Self {
        Self {
            resource: resource.to_string(),
            max_connections,
            instances: Vec::new(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Add a backend instance, tagged with this pool's resource path.
    pub fn add_instance(&mut self, uri: Url) {
        self.instances
            .push(Arc::new(BackendInstance::new(uri, &self.resource)));
    }

    /// The resource path this pool serves.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The per-instance concurrency cap.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// The pooled instances, in registration order.
    pub fn instances(&self) -> &[Arc<BackendInstance>] {
        &self.instances
    }

    /// True when the pool has no backends.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Select the next backend round-robin, skipping instances at their
    /// concurrency cap. `None` when the pool is empty or fully saturated.
    pub fn acquire(&self) -> Option<InstanceGuard> {
        if self.instances.is_empty() {
            return None;
        }

        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        let len = self.instances.len();

        for i in 0..len {
            let instance = &self.instances[(start + i) % len];
            if let Some(guard) = instance.try_acquire(self.max_connections) {
                return Some(guard);
            }
        }

        None
    }
}
