// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::VerboseLevel;
use crate::topology::HttpMethod;
use crate::Warren;
use std::io::Write;

#[test]
fn test_build_with_defaults() {
    let warren = Warren::loader().build().unwrap();

    assert_eq!(warren.settings().port, 8080);
    assert!(warren.topology().is_empty());
    assert!(warren.dispatch_table().is_empty());
}

#[test]
fn test_build_resolves_nodes_and_routes() {
    let warren = Warren::loader()
        .with_node_config("/abc/=[http://localhost:9000/,http://localhost:9001/]")
        .build()
        .unwrap();

    assert_eq!(warren.topology().len(), 1);

    let target = warren
        .dispatch_table()
        .resolve(HttpMethod::Get, "/abc/xyz")
        .unwrap();
    assert_eq!(target.resource(), "/abc/");
    assert_eq!(target.pool().instances().len(), 2);
}

#[test]
fn test_malformed_node_config_does_not_fail_build() {
    let warren = Warren::loader()
        .with_node_config("broken=[")
        .with_node_config("/ok/=[http://localhost:9000/]")
        .build()
        .unwrap();

    assert_eq!(warren.topology().len(), 1);
    assert!(warren.topology().node("/ok/").is_some());
}

#[test]
fn test_loader_overrides_win_over_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".properties")
        .tempfile()
        .unwrap();
    writeln!(file, "port=9000").unwrap();
    writeln!(file, "networkProxyName=from-file").unwrap();
    writeln!(file, "networkProxyNodes=/file/=[http://localhost:9000/]").unwrap();
    file.flush().unwrap();

    let warren = Warren::loader()
        .with_config_file(file.path().to_str().unwrap())
        .with_port(9001)
        .with_proxy_name("from-cli")
        .with_node_config("/cli/=[http://localhost:9001/]")
        .build()
        .unwrap();

    assert_eq!(warren.settings().port, 9001);
    assert_eq!(warren.settings().proxy_name, "from-cli");

    // node strings accumulate instead of replacing each other
    assert_eq!(warren.topology().len(), 2);
    assert!(warren.topology().node("/file/").is_some());
    assert!(warren.topology().node("/cli/").is_some());
}

#[test]
fn test_basic_auth_flows_into_targets() {
    let warren = Warren::loader()
        .with_node_config("/abc/=[http://localhost:9000/]")
        .with_basic_auth("user:password")
        .build()
        .unwrap();

    assert!(warren.settings().has_basic_authentication());
    let target = warren
        .dispatch_table()
        .resolve(HttpMethod::Get, "/abc/")
        .unwrap();
    assert!(target.auth_gate().is_some());
}

#[test]
fn test_blank_health_path_disables_endpoint() {
    let warren = Warren::loader().with_health_path("").build().unwrap();

    assert!(!warren.settings().has_health_check());
    assert_eq!(warren.settings().health_path, None);
}

#[test]
fn test_verbose_level_override() {
    let warren = Warren::loader()
        .with_verbose_level(VerboseLevel::AccessConsole)
        .build()
        .unwrap();

    assert_eq!(warren.settings().verbose_level, VerboseLevel::AccessConsole);
}

#[test]
fn test_missing_config_file_fails_build() {
    let result = Warren::loader()
        .with_config_file("/definitely/not/here.properties")
        .build();

    assert!(result.is_err());
}
