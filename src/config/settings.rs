// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed view over the properties surface.
//!
//! `ProxySettings` folds the raw provider chain into concrete values using
//! lenient coercion: a missing key keeps its default, and an invalid scalar
//! keeps its default with a warning. Configuration resolution never fails.

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Config;

/// Verbosity of the running proxy, independent of the log-level filter.
///
/// `ACCESS` and `VERBOSE` route access-log lines to the `access` log target;
/// `ACCESS_CONSOLE` prints them to stdout; `NONE` suppresses the startup
/// banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerboseLevel {
    None,
    Info,
    Access,
    AccessConsole,
    Verbose,
}

impl VerboseLevel {
    /// True when access-log lines should be produced at all.
    pub fn logs_access(self) -> bool {
        matches!(
            self,
            VerboseLevel::Access | VerboseLevel::AccessConsole | VerboseLevel::Verbose
        )
    }

    /// True when access-log lines go to stdout instead of the log facade.
    pub fn logs_access_to_console(self) -> bool {
        matches!(self, VerboseLevel::AccessConsole)
    }

    /// True when the startup banner should be printed.
    pub fn prints_banner(self) -> bool {
        !matches!(self, VerboseLevel::None)
    }
}

impl fmt::Display for VerboseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerboseLevel::None => "NONE",
            VerboseLevel::Info => "INFO",
            VerboseLevel::Access => "ACCESS",
            VerboseLevel::AccessConsole => "ACCESS_CONSOLE",
            VerboseLevel::Verbose => "VERBOSE",
        };
        write!(f, "{name}")
    }
}

impl FromStr for VerboseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(VerboseLevel::None),
            "INFO" => Ok(VerboseLevel::Info),
            "ACCESS" => Ok(VerboseLevel::Access),
            "ACCESS_CONSOLE" => Ok(VerboseLevel::AccessConsole),
            "VERBOSE" => Ok(VerboseLevel::Verbose),
            other => Err(format!("unknown verbose level [{other}]")),
        }
    }
}

/// Resolved proxy settings.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Display name shown in the startup banner; empty by default.
    pub proxy_name: String,
    /// Bind address.
    pub hostname: String,
    /// Bind port.
    pub port: u16,
    /// Raw node configuration strings, fed to the topology parser.
    pub node_configs: Vec<String>,
    /// Concurrency cap per backend instance.
    pub connections_by_thread: usize,
    /// Per-request budget in milliseconds.
    pub max_request_time: u64,
    /// Runtime worker thread count.
    pub io_threads: usize,
    /// Reserved sizing hint, follows `io_threads` when that is set.
    pub worker_threads: usize,
    /// Verbosity of banner and access logging.
    pub verbose_level: VerboseLevel,
    /// Access log line format (`combined` or `common`).
    pub access_log_format: String,
    /// Access log sink hint, passed through to the log collector.
    pub access_log_file_pattern: String,
    /// Single `user:password` credential; `None` disables the gate.
    pub basic_authentication: Option<String>,
    /// Health endpoint path; `None` disables the endpoint.
    pub health_path: Option<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        let io_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2)
            .max(2);

        Self {
            proxy_name: String::new(),
            hostname: "0.0.0.0".to_string(),
            port: 8080,
            node_configs: Vec::new(),
            connections_by_thread: 20,
            max_request_time: 3000,
            io_threads,
            worker_threads: io_threads * 8,
            verbose_level: VerboseLevel::Info,
            access_log_format: "combined".to_string(),
            access_log_file_pattern: "logs/access-%d{yyyy-MM-dd}.log.gz".to_string(),
            basic_authentication: None,
            health_path: Some("/q/health".to_string()),
        }
    }
}

impl ProxySettings {
    /// Resolve settings from a provider chain, falling back to defaults
    /// key by key.
    ///
    /// `basicAuthentication` is deliberately not read from the chain;
    /// credentials only enter through the CLI or the API.
    pub fn from_config(config: &Config) -> Self {
        let mut settings = Self::default();

        settings.proxy_name = read_string(config, "networkProxyName", &settings.proxy_name);
        settings.hostname = read_string(config, "hostname", &settings.hostname);
        settings.port = read_number(config, "port", settings.port);

        if let Some(nodes) = read_optional_string(config, "networkProxyNodes") {
            if !nodes.trim().is_empty() {
                settings.node_configs.push(nodes);
            }
        }

        settings.connections_by_thread =
            read_number(config, "connectionsByThread", settings.connections_by_thread);
        settings.max_request_time = read_number(config, "maxRequestTime", settings.max_request_time);

        let io_threads = read_number(config, "ioThreads", settings.io_threads);
        if io_threads > 0 && io_threads != settings.io_threads {
            settings.io_threads = io_threads;
            settings.worker_threads = io_threads * 8;
        }
        let worker_threads = read_number(config, "workerThreads", settings.worker_threads);
        if worker_threads > 0 {
            settings.worker_threads = worker_threads;
        }

        settings.verbose_level = read_verbose_level(config, "verboseLevel", settings.verbose_level);
        settings.access_log_format =
            read_string(config, "accessLogFormatString", &settings.access_log_format);
        settings.access_log_file_pattern = read_string(
            config,
            "accessLogFilePattern",
            &settings.access_log_file_pattern,
        );

        // healthPath allows an explicitly empty value, which disables the endpoint
        if config.has("healthPath") {
            settings.health_path =
                read_optional_string(config, "healthPath").filter(|p| !p.trim().is_empty());
        }

        settings
    }

    /// True when the basic-auth gate is active.
    pub fn has_basic_authentication(&self) -> bool {
        self.basic_authentication
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// True when the health endpoint is enabled.
    pub fn has_health_check(&self) -> bool {
        self.health_path
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    /// The per-request budget as a `Duration`.
    pub fn max_request_duration(&self) -> Duration {
        Duration::from_millis(self.max_request_time)
    }
}

/// Render a scalar provider value as a string; compound values have no
/// scalar reading.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn read_optional_string(config: &Config, key: &str) -> Option<String> {
    match config.get_value(key) {
        Ok(Some(value)) => scalar_string(&value),
        Ok(None) => None,
        Err(e) => {
            warn!("Could not read attribute [{key}]: {e}");
            None
        }
    }
}

/// Read a string attribute; a missing or blank value keeps the default.
fn read_string(config: &Config, key: &str, default: &str) -> String {
    match read_optional_string(config, key) {
        Some(value) if !value.trim().is_empty() => {
            let value = value.trim().to_string();
            if value != default {
                debug!("Assign attribute [{key}] = [{value}]");
            }
            value
        }
        _ => default.to_string(),
    }
}

/// Read a numeric attribute; an unparsable value keeps the default with a
/// warning.
fn read_number<T>(config: &Config, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display + Copy,
{
    match read_optional_string(config, key) {
        Some(value) if !value.trim().is_empty() => match value.trim().parse::<T>() {
            Ok(parsed) => {
                debug!("Assign attribute [{key}] = [{parsed}]");
                parsed
            }
            Err(_) => {
                warn!("Invalid value [{value}] for attribute [{key}], keep default value [{default}]");
                default
            }
        },
        _ => default,
    }
}

/// Read the verbose level; an unknown token keeps the default with a warning.
fn read_verbose_level(config: &Config, key: &str, default: VerboseLevel) -> VerboseLevel {
    match read_optional_string(config, key) {
        Some(value) if !value.trim().is_empty() => match value.parse::<VerboseLevel>() {
            Ok(level) => level,
            Err(_) => {
                warn!("Invalid value [{value}] for attribute [{key}], keep default value [{default}]");
                default
            }
        },
        _ => default,
    }
}
