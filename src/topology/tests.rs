// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests {
    use crate::topology::{
        parse_node_configs, HttpMethod, NodeDescriptor, Topology, DEFAULT_METHODS,
    };
    use url::Url;

    fn uri(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn entry(resource: &str, uris: &[&str]) -> NodeDescriptor {
        NodeDescriptor::from_entry(resource, uris.iter().map(|u| uri(u)).collect())
    }

    #[test]
    fn test_empty_inputs_yield_no_descriptors() {
        assert!(parse_node_configs::<&str>(&[]).is_empty());
        assert!(parse_node_configs(&[""]).is_empty());
        assert!(parse_node_configs(&["    "]).is_empty());
        assert!(parse_node_configs(&["{}"]).is_empty());
        assert!(parse_node_configs(&["{    }"]).is_empty());
    }

    #[test]
    fn test_simple_entry() {
        let reference = vec![entry(
            "a",
            &["http://localhost:1/k", "http://localhost:2/l"],
        )];

        assert_eq!(
            parse_node_configs(&["a=[http://localhost:1/k,http://localhost:2/l]"]),
            reference
        );
        assert_eq!(
            parse_node_configs(&["  a = [  http://localhost:1/k , http://localhost:2/l ] "]),
            reference
        );
        assert_eq!(
            parse_node_configs(&["a=http://localhost:1/k,http://localhost:2/l"]),
            reference
        );
        assert_eq!(
            parse_node_configs(&["  a  =  http://localhost:1/k , http://localhost:2/l   "]),
            reference
        );
    }

    #[test]
    fn test_entry_list() {
        let reference = vec![
            entry("a", &["http://localhost:1/k", "http://localhost:2/l"]),
            entry("b", &["http://localhost:3/k", "http://localhost:4/l"]),
        ];

        assert_eq!(
            parse_node_configs(&[
                "a=[http://localhost:1/k,http://localhost:2/l],b=[http://localhost:3/k,http://localhost:4/l]"
            ]),
            reference
        );
        assert_eq!(
            parse_node_configs(&[
                "   a  =  [  http://localhost:1/k   ,   http://localhost:2/l  ]  ,  b  =  [   http://localhost:3/k  ,  http://localhost:4/l]   "
            ]),
            reference
        );
        assert_eq!(
            parse_node_configs(&[
                "a=http://localhost:1/k,http://localhost:2/l,b=http://localhost:3/k,http://localhost:4/l"
            ]),
            reference
        );
        assert_eq!(
            parse_node_configs(&[
                " a  =  http://localhost:1/k   ,   http://localhost:2/l    ,   b  =  http://localhost:3/k  ,  http://localhost:4/l  "
            ]),
            reference
        );
    }

    #[test]
    fn test_mixed_bracket_styles() {
        let reference = vec![
            entry("a", &["http://localhost:1/k"]),
            entry("b", &["http://localhost:3/k", "http://localhost:4/l"]),
        ];

        assert_eq!(
            parse_node_configs(&[
                "a=[http://localhost:1/k],b=http://localhost:3/k,http://localhost:4/l"
            ]),
            reference
        );
    }

    #[test]
    fn test_semicolon_terminates_unbracketed_list() {
        let reference = vec![
            entry("a", &["http://localhost:1/k"]),
            entry("b", &["http://localhost:2/l"]),
        ];

        assert_eq!(
            parse_node_configs(&["a=http://localhost:1/k;b=http://localhost:2/l"]),
            reference
        );
    }

    #[test]
    fn test_multiple_raw_strings_accumulate_in_order() {
        let descriptors = parse_node_configs(&[
            "a=[http://localhost:1/k]",
            "",
            "b=[http://localhost:2/l]",
        ]);

        assert_eq!(
            descriptors,
            vec![
                entry("a", &["http://localhost:1/k"]),
                entry("b", &["http://localhost:2/l"]),
            ]
        );
    }

    #[test]
    fn test_malformed_uri_discards_only_remaining_parse() {
        // the first entry of the bad string survives, the rest of that
        // string is dropped, and other strings are unaffected
        let descriptors = parse_node_configs(&[
            "a=[http://localhost:1/k],b=[not a uri],c=[http://localhost:3/k]",
            "d=[http://localhost:4/k]",
        ]);

        assert_eq!(
            descriptors,
            vec![
                entry("a", &["http://localhost:1/k"]),
                entry("d", &["http://localhost:4/k"]),
            ]
        );
    }

    #[test]
    fn test_structured_array_form() {
        let descriptors = parse_node_configs(&[
            r#"[{"name":"backend","resource":"/api/","methods":["GET","POST"],"instances":["http://localhost:9000/"]}]"#,
        ]);

        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name.as_deref(), Some("backend"));
        assert_eq!(descriptors[0].resource, "/api/");
        assert_eq!(
            descriptors[0].methods,
            Some(vec![HttpMethod::Get, HttpMethod::Post])
        );
        assert_eq!(descriptors[0].instances, vec![uri("http://localhost:9000/")]);
    }

    #[test]
    fn test_structured_object_form() {
        let descriptors = parse_node_configs(&[
            r#"{"/api/":{"resource":"/api/","instances":["http://localhost:9000/"]}}"#,
        ]);

        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].resource, "/api/");
    }

    #[test]
    fn test_invalid_structured_form_is_skipped() {
        let descriptors = parse_node_configs(&[
            r#"{"resource": unquoted}"#,
            "a=[http://localhost:1/k]",
        ]);

        assert_eq!(descriptors, vec![entry("a", &["http://localhost:1/k"])]);
    }

    #[test]
    fn test_register_normalizes_resource_path() {
        let mut topology = Topology::new();

        assert_eq!(topology.register(None, "", None, Vec::new()).resource(), "/");
        assert_eq!(
            topology.register(None, "abc", None, Vec::new()).resource(),
            "abc/"
        );
        assert_eq!(
            topology
                .register(None, "  /def/  ", None, Vec::new())
                .resource(),
            "/def/"
        );
    }

    #[test]
    fn test_register_defaults() {
        let mut topology = Topology::new();
        let node = topology.register(None, "/api", None, vec![uri("http://localhost:9000/")]);

        assert_eq!(node.name(), "/api/");
        assert_eq!(node.methods(), DEFAULT_METHODS);
        assert_eq!(node.instances(), [uri("http://localhost:9000/")]);
    }

    #[test]
    fn test_register_twice_appends_instances() {
        let mut topology = Topology::new();
        topology.register(
            Some("first"),
            "/api/",
            Some(vec![HttpMethod::Get]),
            vec![uri("http://localhost:9000/")],
        );
        topology.register(
            Some("second"),
            "/api",
            Some(vec![HttpMethod::Delete]),
            vec![uri("http://localhost:9001/")],
        );

        assert_eq!(topology.len(), 1);
        let node = topology.node("/api/").unwrap();
        // first registration stays authoritative for name and methods
        assert_eq!(node.name(), "first");
        assert_eq!(node.methods(), [HttpMethod::Get]);
        assert_eq!(
            node.instances(),
            [uri("http://localhost:9000/"), uri("http://localhost:9001/")]
        );
    }

    #[test]
    fn test_nodes_sorted_case_insensitively() {
        let mut topology = Topology::new();
        topology.register(None, "/Zeta/", None, Vec::new());
        topology.register(None, "/alpha/", None, Vec::new());
        topology.register(None, "/Beta/", None, Vec::new());

        let order: Vec<&str> = topology.nodes().iter().map(|n| n.resource()).collect();
        assert_eq!(order, vec!["/alpha/", "/Beta/", "/Zeta/"]);
    }

    #[test]
    fn test_structured_round_trip() {
        let mut topology = Topology::new();
        topology.register(
            None,
            "/api/",
            None,
            vec![uri("http://localhost:9000/"), uri("http://localhost:9001/")],
        );
        topology.register(
            Some("static"),
            "/static/",
            Some(vec![HttpMethod::Get]),
            vec![uri("http://cdn:8080/")],
        );

        let serialized = topology.to_structured().unwrap();
        let reparsed = Topology::from_descriptors(parse_node_configs(&[serialized]));

        assert_eq!(reparsed, topology);
    }

    #[test]
    fn test_from_descriptors_merges_duplicate_paths() {
        let descriptors = parse_node_configs(&[
            "/api/=[http://localhost:9000/]",
            "/api=[http://localhost:9001/]",
        ]);
        let topology = Topology::from_descriptors(descriptors);

        assert_eq!(topology.len(), 1);
        assert_eq!(topology.resources(), vec!["/api/"]);
        assert_eq!(topology.node("/api/").unwrap().instances().len(), 2);
    }
}
