// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access logging.
//!
//! One line per handled request, produced only when the verbose level asks
//! for it: `ACCESS` and `VERBOSE` route lines to the `access` log target so
//! the collector can split them off; `ACCESS_CONSOLE` prints to stdout.

use chrono::Local;
use log::info;

use crate::config::ProxySettings;

/// Record one handled request, honoring the configured verbose level and
/// line format.
#[allow(clippy::too_many_arguments)]
pub(crate) fn record(
    settings: &ProxySettings,
    client_ip: &str,
    method: &str,
    path: &str,
    version: &str,
    status: u16,
    referer: Option<&str>,
    user_agent: Option<&str>,
) {
    if !settings.verbose_level.logs_access() {
        return;
    }

    let line = format_line(
        &settings.access_log_format,
        client_ip,
        method,
        path,
        version,
        status,
        referer,
        user_agent,
    );

    if settings.verbose_level.logs_access_to_console() {
        println!("{line}");
    } else {
        info!(target: "access", "{line}");
    }
}

/// Render a `common` or `combined` access-log line. The response size is
/// unknown while bodies stream, so the bytes field stays `-`.
#[allow(clippy::too_many_arguments)]
fn format_line(
    format: &str,
    client_ip: &str,
    method: &str,
    path: &str,
    version: &str,
    status: u16,
    referer: Option<&str>,
    user_agent: Option<&str>,
) -> String {
    let timestamp = Local::now().format("%d/%b/%Y:%H:%M:%S %z");
    let common = format!("{client_ip} - - [{timestamp}] \"{method} {path} {version}\" {status} -");

    match format {
        "common" => common,
        // anything else renders the combined layout
        _ => format!(
            "{common} \"{}\" \"{}\"",
            referer.unwrap_or("-"),
            user_agent.unwrap_or("-")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_line_has_referer_and_agent() {
        let line = format_line(
            "combined",
            "127.0.0.1",
            "GET",
            "/abc/",
            "HTTP/1.1",
            200,
            Some("http://example.com/"),
            Some("curl/8.0"),
        );

        assert!(line.starts_with("127.0.0.1 - - ["));
        assert!(line.contains("\"GET /abc/ HTTP/1.1\" 200 -"));
        assert!(line.ends_with("\"http://example.com/\" \"curl/8.0\""));
    }

    #[test]
    fn test_common_line_omits_referer_and_agent() {
        let line = format_line(
            "common",
            "127.0.0.1",
            "GET",
            "/abc/",
            "HTTP/1.1",
            404,
            Some("http://example.com/"),
            None,
        );

        assert!(line.ends_with("\"GET /abc/ HTTP/1.1\" 404 -"));
        assert!(!line.contains("example.com"));
    }

    #[test]
    fn test_missing_headers_render_as_dashes() {
        let line = format_line(
            "combined",
            "10.0.0.1",
            "POST",
            "/",
            "HTTP/2.0",
            503,
            None,
            None,
        );

        assert!(line.ends_with("\"-\" \"-\""));
    }
}
