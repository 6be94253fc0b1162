use crate::error::ConfigError;
use crate::net::NodeId;
use crate::registry::Registry;
use crate::sim::SimConfig;

fn config_for(topology: &str, algorithm: &str) -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.network.topology = topology.to_string();
    cfg.network.width = 4;
    cfg.network.height = 4;
    cfg.network.hypercube_dimension = 3;
    cfg.routing.algorithm = algorithm.to_string();
    cfg
}

#[test]
fn builtins_list_topologies_algorithms_and_defaults() {
    let r = Registry::with_builtins();
    assert_eq!(r.topologies(), vec!["2D_mesh", "hypercube"]);
    assert_eq!(r.algorithms_for("2D_mesh"), vec!["duato"]);
    assert_eq!(r.algorithms_for("hypercube"), vec!["duato", "ecube"]);
    assert_eq!(r.default_routing("2D_mesh"), Some("duato"));
    assert_eq!(r.default_routing("hypercube"), Some("ecube"));
    assert!(r.is_supported("ecube", "hypercube"));
    assert!(!r.is_supported("ecube", "2D_mesh"));
    assert!(r.describe_routing("duato", "2D_mesh").is_some());
}

#[test]
fn builds_each_supported_combination() {
    let r = Registry::with_builtins();
    for (topology, algorithm) in [("2D_mesh", "duato"), ("hypercube", "ecube"), ("hypercube", "duato")] {
        let cfg = config_for(topology, algorithm);
        let net = r.build_topology(&cfg).expect("topology");
        assert_eq!(net.kind().name(), topology);
        let routing = r.build_routing(&net, &cfg).expect("routing");
        assert_eq!(routing.name(), algorithm);
        let res = routing.route(&net, NodeId(0), NodeId(7));
        assert!(res.success, "{topology}/{algorithm}");
    }
}

#[test]
fn unsupported_combination_falls_back_to_topology_default() {
    let r = Registry::with_builtins();
    let cfg = config_for("2D_mesh", "ecube");
    let net = r.build_topology(&cfg).expect("topology");
    let routing = r.build_routing(&net, &cfg).expect("fallback routing");
    assert_eq!(routing.name(), "duato");

    let cfg = config_for("hypercube", "adaptive");
    let net = r.build_topology(&cfg).expect("topology");
    assert_eq!(r.build_routing(&net, &cfg).expect("fallback").name(), "ecube");
}

#[test]
fn unsupported_combination_errors_without_fallback() {
    let r = Registry::with_builtins();
    let mut cfg = config_for("2D_mesh", "ecube");
    cfg.routing.fallback_to_default = false;
    let net = r.build_topology(&cfg).expect("topology");
    match r.build_routing(&net, &cfg) {
        Err(ConfigError::UnsupportedRouting {
            algorithm,
            topology,
            supported,
        }) => {
            assert_eq!(algorithm, "ecube");
            assert_eq!(topology, "2D_mesh");
            assert_eq!(supported, "duato");
        }
        other => panic!("expected UnsupportedRouting, got {other:?}"),
    }
}

#[test]
fn unknown_topology_lists_supported_names() {
    let r = Registry::with_builtins();
    let err = r.build_topology(&config_for("torus", "duato")).expect_err("unknown topology");
    match err {
        ConfigError::UnsupportedTopology { name, supported } => {
            assert_eq!(name, "torus");
            assert_eq!(supported, "2D_mesh, hypercube");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn empty_registry_has_nothing_to_fall_back_to() {
    let full = Registry::with_builtins();
    let cfg = config_for("hypercube", "ecube");
    let net = full.build_topology(&cfg).expect("topology");

    let empty = Registry::new();
    assert!(empty.topologies().is_empty());
    assert!(matches!(
        empty.build_routing(&net, &cfg),
        Err(ConfigError::UnsupportedRouting { .. })
    ));
}

#[test]
fn custom_default_routing_is_honoured() {
    let mut r = Registry::with_builtins();
    r.set_default_routing("hypercube", "duato");
    let cfg = config_for("hypercube", "unknown");
    let net = r.build_topology(&cfg).expect("topology");
    let routing = r.build_routing(&net, &cfg).expect("routing");
    assert_eq!(routing.name(), "duato");
}
