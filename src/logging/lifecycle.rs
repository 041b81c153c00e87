// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Startup banner.
//!
//! Rendered once around server startup: to stdout for the operator and
//! through the log facade for collectors. A failed bind renders the same
//! banner without listener information, followed by the diagnostic.

use std::fmt::Write as _;
use std::net::SocketAddr;

use chrono::{SecondsFormat, Utc};
use log::info;

use crate::config::ProxySettings;
use crate::topology::Topology;

const LINE: &str =
    "----------------------------------------------------------------------------------------";
const APP: &str = concat!("warren v", env!("CARGO_PKG_VERSION"));

/// Print the startup banner to stdout and the log.
pub fn print_startup(settings: &ProxySettings, topology: &Topology, listener: Option<SocketAddr>) {
    let banner = render(settings, topology, listener);
    info!("{banner}");
    println!("{banner}");
}

/// Render the banner; `listener` is `None` when the server failed to bind.
pub fn render(
    settings: &ProxySettings,
    topology: &Topology,
    listener: Option<SocketAddr>,
) -> String {
    let mut message = String::new();
    let _ = writeln!(message);
    let _ = writeln!(message, "{LINE}");

    if settings.proxy_name.trim().is_empty() {
        let _ = writeln!(message, "  {APP}");
    } else {
        let _ = writeln!(message, "  {} (powered by {APP})", settings.proxy_name);
    }

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let _ = writeln!(message, "{}{}", header("Timestamp"), timestamp);

    if let Some(addr) = listener {
        let _ = writeln!(message, "{}http://{}", header("Listener"), addr);

        if let Some(health_path) = settings.health_path.as_deref() {
            let _ = writeln!(message, "{}{}", header("Health"), health_path);
        }

        if settings.has_basic_authentication() {
            let _ = writeln!(message, "{}enabled", header("Basic Auth"));
        }
    }

    if !topology.is_empty() {
        let _ = writeln!(message, "{}", header("Proxy").trim_end());
        for node in topology.nodes() {
            let _ = writeln!(message, "    - {}", node.resource());

            if node.instances().is_empty() {
                let _ = writeln!(message, "       - URL   n/a");
                continue;
            }

            if node.name() != node.resource() {
                let _ = writeln!(message, "       - NAME  {}", node.name());
            }

            let urls = node
                .instances()
                .iter()
                .map(|u| u.as_str())
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(message, "       - URL   {urls}");
        }
    }

    let _ = write!(message, "{LINE}");
    message
}

fn header(tag: &str) -> String {
    format!("  > {tag:<11}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::parse_node_configs;

    #[test]
    fn test_banner_lists_nodes_and_listener() {
        let settings = ProxySettings::default();
        let topology = Topology::from_descriptors(parse_node_configs(&[
            "/abc/=[http://localhost:9000/,http://localhost:9001/]",
        ]));
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();

        let banner = render(&settings, &topology, Some(addr));

        assert!(banner.contains("warren v"));
        assert!(banner.contains("http://127.0.0.1:8080"));
        assert!(banner.contains("/q/health"));
        assert!(banner.contains("- /abc/"));
        assert!(banner.contains("http://localhost:9000/,http://localhost:9001/"));
    }

    #[test]
    fn test_banner_with_proxy_name_and_auth() {
        let settings = ProxySettings {
            proxy_name: "edge".to_string(),
            basic_authentication: Some("user:password".to_string()),
            ..ProxySettings::default()
        };
        let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();

        let banner = render(&settings, &Topology::new(), Some(addr));

        assert!(banner.contains("edge (powered by warren v"));
        assert!(banner.contains("Basic Auth"));
        // the credential itself never shows up
        assert!(!banner.contains("user:password"));
    }

    #[test]
    fn test_failure_banner_omits_listener() {
        let settings = ProxySettings::default();
        let banner = render(&settings, &Topology::new(), None);

        assert!(!banner.contains("Listener"));
        assert!(!banner.contains("Health"));
        assert!(banner.contains("Timestamp"));
    }
}
