// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level entry-point – "turn the key and go".
//!
//! The [`WarrenLoader`] assembles the configuration chain, resolves the
//! typed settings, parses the node topology, compiles the dispatch table
//! and returns a [`Warren`] ready to [`start`](Warren::start).
//!
//! The three resolution phases - parse, register, compile - run exactly
//! once, single-threaded, before any traffic is accepted. Nothing mutates
//! the topology or the dispatch table afterwards.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::config::{
    Config, ConfigError, EnvConfigProvider, FileConfigProvider, ProxySettings, VerboseLevel,
};
use crate::dispatch::DispatchTable;
use crate::error::ProxyError;
use crate::logging;
use crate::server::ProxyServer;
use crate::topology::{parse_node_configs, Topology};

/// Errors that can occur during Warren initialization.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Proxy error
    #[error("proxy error: {0}")]
    ProxyError(#[from] ProxyError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Builder for initializing and configuring Warren.
///
/// Values set directly on the loader override whatever the provider chain
/// resolves, mirroring command-line precedence over the properties file.
#[derive(Debug, Default)]
pub struct WarrenLoader {
    config: Option<Config>,
    config_file_path: Option<String>,
    use_env_vars: bool,
    env_prefix: Option<String>,
    node_configs: Vec<String>,
    proxy_name: Option<String>,
    hostname: Option<String>,
    port: Option<u16>,
    basic_authentication: Option<String>,
    health_path: Option<String>,
    connections_by_thread: Option<usize>,
    max_request_time: Option<u64>,
    verbose_level: Option<VerboseLevel>,
    access_log_format: Option<String>,
    access_log_file_pattern: Option<String>,
}

impl WarrenLoader {
    /// Create a new loader with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-built configuration chain instead of file/env assembly.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a configuration file to load (properties, JSON, TOML or YAML).
    pub fn with_config_file(mut self, file_path: &str) -> Self {
        self.config_file_path = Some(file_path.to_string());
        self
    }

    /// Enable environment variable configuration.
    pub fn with_env_vars(mut self) -> Self {
        self.use_env_vars = true;
        self
    }

    /// Set a custom prefix for environment variables (default is "WARREN_").
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.use_env_vars = true;
        self
    }

    /// Add a raw node configuration string (DSL or JSON form). May be
    /// called repeatedly; strings accumulate in order.
    pub fn with_node_config(mut self, raw: &str) -> Self {
        self.node_configs.push(raw.to_string());
        self
    }

    /// Override the display name.
    pub fn with_proxy_name(mut self, name: &str) -> Self {
        self.proxy_name = Some(name.to_string());
        self
    }

    /// Override the bind address.
    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = Some(hostname.to_string());
        self
    }

    /// Override the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the `user:password` credential; a blank value disables the gate.
    pub fn with_basic_auth(mut self, credential: &str) -> Self {
        self.basic_authentication = Some(credential.to_string());
        self
    }

    /// Set the health endpoint path; a blank value disables the endpoint.
    pub fn with_health_path(mut self, path: &str) -> Self {
        self.health_path = Some(path.to_string());
        self
    }

    /// Override the per-instance concurrency cap.
    pub fn with_connections_by_thread(mut self, connections: usize) -> Self {
        self.connections_by_thread = Some(connections);
        self
    }

    /// Override the per-request budget in milliseconds.
    pub fn with_max_request_time(mut self, millis: u64) -> Self {
        self.max_request_time = Some(millis);
        self
    }

    /// Override the verbose level.
    pub fn with_verbose_level(mut self, level: VerboseLevel) -> Self {
        self.verbose_level = Some(level);
        self
    }

    /// Override the access log line format.
    pub fn with_access_log_format(mut self, format: &str) -> Self {
        self.access_log_format = Some(format.to_string());
        self
    }

    /// Override the access log sink hint.
    pub fn with_access_log_file_pattern(mut self, pattern: &str) -> Self {
        self.access_log_file_pattern = Some(pattern.to_string());
        self
    }

    /// Resolve configuration, build the topology and compile the dispatch
    /// table.
    ///
    /// Malformed node entries and invalid scalars never fail the build;
    /// they are logged and skipped. Only a broken configuration file
    /// surfaces as an error here.
    pub fn build(self) -> Result<Warren, LoaderError> {
        let config = match self.config {
            Some(config) => config,
            None => {
                let mut builder = Config::builder();

                if let Some(file_path) = &self.config_file_path {
                    builder = builder.with_provider(FileConfigProvider::new(file_path)?);
                }

                // env comes after the file so it wins on conflicts
                if self.use_env_vars {
                    let env_provider = match &self.env_prefix {
                        Some(prefix) => EnvConfigProvider::new(prefix),
                        None => EnvConfigProvider::default(),
                    };
                    builder = builder.with_provider(env_provider);
                }

                builder.build()
            }
        };

        let mut settings = ProxySettings::from_config(&config);

        if let Some(name) = non_blank(self.proxy_name) {
            settings.proxy_name = name;
        }
        if let Some(hostname) = non_blank(self.hostname) {
            settings.hostname = hostname;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(connections) = self.connections_by_thread {
            settings.connections_by_thread = connections;
        }
        if let Some(millis) = self.max_request_time {
            settings.max_request_time = millis;
        }
        if let Some(level) = self.verbose_level {
            settings.verbose_level = level;
        }
        if let Some(format) = non_blank(self.access_log_format) {
            settings.access_log_format = format;
        }
        if let Some(pattern) = non_blank(self.access_log_file_pattern) {
            settings.access_log_file_pattern = pattern;
        }
        if let Some(credential) = self.basic_authentication {
            settings.basic_authentication = Some(credential).filter(|c| !c.trim().is_empty());
        }
        if let Some(path) = self.health_path {
            settings.health_path = Some(path).filter(|p| !p.trim().is_empty());
        }
        settings.node_configs.extend(self.node_configs);

        // initialize logging before parsing so node warnings are visible
        logging::init(Some(logging::level_filter(settings.verbose_level)));

        let descriptors = parse_node_configs(&settings.node_configs);
        let topology = Topology::from_descriptors(descriptors);
        info!(
            "Resolved {} proxy node(s) from {} configuration string(s)",
            topology.len(),
            settings.node_configs.len()
        );

        let table = DispatchTable::compile(&topology, &settings);

        let settings = Arc::new(settings);
        let topology = Arc::new(topology);
        let table = Arc::new(table);
        let server = ProxyServer::new(settings.clone(), topology.clone(), table.clone())?;

        Ok(Warren {
            config: Arc::new(config),
            settings,
            topology,
            table,
            server,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A fully resolved proxy: settings, topology, dispatch table and server.
#[derive(Debug, Clone)]
pub struct Warren {
    config: Arc<Config>,
    settings: Arc<ProxySettings>,
    topology: Arc<Topology>,
    table: Arc<DispatchTable>,
    server: ProxyServer,
}

impl Warren {
    /// Create a new loader for initializing Warren.
    pub fn loader() -> WarrenLoader {
        WarrenLoader::new()
    }

    /// The resolved configuration chain.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The resolved settings.
    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    /// The normalized topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The compiled dispatch table.
    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.table
    }

    /// Start the proxy server and block until shutdown.
    pub async fn start(&self) -> Result<(), LoaderError> {
        self.server.start().await.map_err(LoaderError::ProxyError)
    }
}
