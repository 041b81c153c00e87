// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line wrapper so the library can run as a stand-alone proxy.
//!
//! Flags override the properties file and the environment; startup failure
//! is reported by the library and the exit decision is made here.

use std::process::ExitCode;

use clap::Parser;
use log::warn;
use warren::{VerboseLevel, Warren};

#[derive(Parser, Debug)]
#[command(name = "warren", version, about = "Configuration-driven reverse proxy.")]
struct Cli {
    /// The bind address, by default 0.0.0.0.
    #[arg(short = 'b', long = "bind", value_name = "address")]
    bind: Option<String>,

    /// The port, by default 8080.
    #[arg(short = 'p', long, value_name = "port")]
    port: Option<u16>,

    /// Node list in DSL or JSON form; repeatable.
    #[arg(long = "nodes", value_name = "nodeList")]
    nodes: Vec<String>,

    /// The health path, by default /q/health; an empty value disables it.
    #[arg(long = "health-path", value_name = "healthPath")]
    health_path: Option<String>,

    /// The basic authentication: user:password, by default disabled.
    #[arg(long = "basicauth", value_name = "authentication")]
    basic_auth: Option<String>,

    /// The proxy display name.
    #[arg(long, value_name = "proxyName")]
    name: Option<String>,

    /// Verbose level: NONE, INFO, ACCESS, ACCESS_CONSOLE, VERBOSE.
    #[arg(long = "verbose", value_name = "verboseLevel")]
    verbose: Option<String>,

    /// Access log format, default: combined.
    #[arg(long = "access-log-format", value_name = "accessLogFormat")]
    access_log_format: Option<String>,

    /// Access log file pattern hint for the log collector.
    #[arg(long = "access-log-file-pattern", value_name = "accessLogFilePattern")]
    access_log_file_pattern: Option<String>,

    /// Configuration file (properties, JSON, TOML or YAML).
    #[arg(short = 'c', long = "config", value_name = "file")]
    config: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut loader = Warren::loader().with_env_vars();

    if let Some(path) = &cli.config {
        loader = loader.with_config_file(path);
    }
    if let Some(bind) = &cli.bind {
        loader = loader.with_hostname(bind);
    }
    if let Some(port) = cli.port {
        loader = loader.with_port(port);
    }
    for raw in &cli.nodes {
        loader = loader.with_node_config(raw);
    }
    if let Some(path) = &cli.health_path {
        loader = loader.with_health_path(path);
    }
    if let Some(credential) = &cli.basic_auth {
        loader = loader.with_basic_auth(credential);
    }
    if let Some(name) = &cli.name {
        loader = loader.with_proxy_name(name);
    }
    if let Some(level) = &cli.verbose {
        // an unknown level keeps the configured default
        match level.parse::<VerboseLevel>() {
            Ok(level) => loader = loader.with_verbose_level(level),
            Err(e) => eprintln!("Ignoring --verbose: {e}"),
        }
    }
    if let Some(format) = &cli.access_log_format {
        loader = loader.with_access_log_format(format);
    }
    if let Some(pattern) = &cli.access_log_file_pattern {
        loader = loader.with_access_log_file_pattern(pattern);
    }

    let proxy = match loader.build() {
        Ok(proxy) => proxy,
        Err(e) => {
            eprintln!("Failed to build proxy: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(proxy.settings().io_threads)
        .max_blocking_threads(proxy.settings().worker_threads)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(proxy.start()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warn!("Proxy server failed: {e}");
            ExitCode::FAILURE
        }
    }
}
