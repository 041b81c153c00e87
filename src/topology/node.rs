// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node model - the addressable forwarding targets of the topology.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP methods a node can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Trace,
    Connect,
}

/// The method set assigned to a node that doesn't configure its own.
pub const DEFAULT_METHODS: [HttpMethod; 5] = [
    HttpMethod::Get,
    HttpMethod::Patch,
    HttpMethod::Put,
    HttpMethod::Post,
    HttpMethod::Delete,
];

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Head => write!(f, "HEAD"),
            HttpMethod::Options => write!(f, "OPTIONS"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Trace => write!(f, "TRACE"),
            HttpMethod::Connect => write!(f, "CONNECT"),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "PATCH" => Ok(HttpMethod::Patch),
            "TRACE" => Ok(HttpMethod::Trace),
            "CONNECT" => Ok(HttpMethod::Connect),
            other => Err(format!("unknown HTTP method [{other}]")),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Trace => reqwest::Method::TRACE,
            HttpMethod::Connect => reqwest::Method::CONNECT,
        }
    }
}

/// Raw node description produced by the configuration parser, before
/// registry normalization.
///
/// This is also the element type of the structured (JSON) configuration
/// form, so field names are part of the configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Display name; defaults to the resource path when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resource path prefix, not yet normalized.
    #[serde(default)]
    pub resource: String,
    /// Accepted methods; defaults to [`DEFAULT_METHODS`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<HttpMethod>>,
    /// Backend instance URIs.
    #[serde(default)]
    pub instances: Vec<Url>,
}

impl NodeDescriptor {
    /// Descriptor for a compact-form entry: only path and instances known.
    pub fn from_entry(resource: &str, instances: Vec<Url>) -> Self {
        Self {
            name: None,
            resource: resource.to_string(),
            methods: None,
            instances,
        }
    }
}

/// A named, addressable forwarding target with a normalized resource path.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyNode {
    name: String,
    resource: String,
    methods: Vec<HttpMethod>,
    instances: Vec<Url>,
}

impl ProxyNode {
    /// Create a node, applying the normalization defaults: a blank resource
    /// becomes `/`, the resource always ends in `/`, a blank name falls back
    /// to the resource, and an absent or empty method set becomes
    /// [`DEFAULT_METHODS`].
    pub fn new(
        name: Option<&str>,
        resource: &str,
        methods: Option<Vec<HttpMethod>>,
        instances: Vec<Url>,
    ) -> Self {
        let resource = normalize_resource(resource);

        let name = match name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => resource.clone(),
        };

        let methods = match methods {
            Some(m) if !m.is_empty() => m,
            _ => DEFAULT_METHODS.to_vec(),
        };

        Self {
            name,
            resource,
            methods,
            instances,
        }
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized resource path; non-empty and `/`-terminated.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The accepted method set.
    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    /// The backend instances, in registration order.
    pub fn instances(&self) -> &[Url] {
        &self.instances
    }

    /// Append a backend instance.
    pub fn add_instance(&mut self, instance: Url) {
        self.instances.push(instance);
    }

    /// The structured-form descriptor of this node.
    pub fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: Some(self.name.clone()),
            resource: self.resource.clone(),
            methods: Some(self.methods.clone()),
            instances: self.instances.clone(),
        }
    }
}

impl fmt::Display for ProxyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProxyNode [name={}, resource={}, methods={:?}, instances={:?}]",
            self.name,
            self.resource,
            self.methods,
            self.instances.iter().map(Url::as_str).collect::<Vec<_>>()
        )
    }
}

/// Normalize a resource path: blank input becomes `/`; anything else is
/// trimmed and `/`-terminated.
pub fn normalize_resource(resource: &str) -> String {
    let resource = resource.trim();
    if resource.is_empty() {
        return "/".to_string();
    }

    if resource.ends_with('/') {
        resource.to_string()
    } else {
        format!("{resource}/")
    }
}
