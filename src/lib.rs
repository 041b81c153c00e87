// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Warren - a configuration-driven reverse proxy with a flexible topology DSL
//!
//! Warren turns human-authored configuration - a compact textual DSL or a
//! JSON document - into a normalized routing topology, and compiles that
//! topology into a dispatch table of method+path routes backed by per-node
//! backend pools. A thin hyper-based engine then serves the table.
//!
//! # Configuration System
//!
//! Configuration is resolved through an ordered chain of [`ConfigProvider`]s
//! (properties file, environment variables, your own provider). The
//! first-class keys mirror the classic properties surface:
//!
//! | key | default | description |
//! |-----|---------|-------------|
//! | `networkProxyName`      | *(empty)*   | Display name shown in the banner |
//! | `hostname`              | `0.0.0.0`   | Bind address |
//! | `port`                  | `8080`      | Bind port |
//! | `networkProxyNodes`     | –           | Node list (DSL or JSON, see below) |
//! | `connectionsByThread`   | `20`        | Concurrency cap per backend instance |
//! | `maxRequestTime`        | `3000`      | Per-request budget in milliseconds |
//! | `ioThreads`             | *(cores)*   | Runtime worker threads |
//! | `workerThreads`         | `ioThreads*8` | Reserved sizing hint |
//! | `verboseLevel`          | `INFO`      | `NONE`, `INFO`, `ACCESS`, `ACCESS_CONSOLE`, `VERBOSE` |
//! | `accessLogFormatString` | `combined`  | Access log line format |
//! | `accessLogFilePattern`  | –           | Access log sink hint for the log collector |
//! | `healthPath`            | `/q/health` | Health endpoint path; blank disables |
//!
//! # Topology DSL
//!
//! Two interchangeable grammars describe the proxy topology:
//!
//! ```text
//! /api/=[http://10.0.0.1:9000/,http://10.0.0.2:9000/],/static/=http://cdn:8080/
//! ```
//!
//! or the structured JSON form:
//!
//! ```text
//! [{"resource": "/api/", "instances": ["http://10.0.0.1:9000/"]}]
//! ```
//!
//! Registering the same resource path twice appends backend instances to the
//! existing node rather than creating a duplicate entry.

// Module declarations
pub mod config;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod logging;
pub mod security;
pub mod server;
pub mod topology;

// Re-export key types at the crate root for convenience
pub use config::{
    Config, ConfigError, ConfigProvider, ConfigProviderExt, EnvConfigProvider, FileConfigProvider,
    ProxySettings, VerboseLevel,
};
pub use dispatch::{BackendPool, DispatchTable, InstanceGuard, RouteTarget};
pub use error::ProxyError;
pub use loader::{LoaderError, Warren, WarrenLoader};
pub use security::BasicAuthGate;
pub use server::ProxyServer;
pub use topology::{
    parse_node_configs, HttpMethod, NodeDescriptor, ProxyNode, Topology, DEFAULT_METHODS,
};
