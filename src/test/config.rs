use crate::error::ConfigError;
use crate::sim::{SimConfig, SimulationContext};

fn invalid_field(result: Result<SimConfig, ConfigError>) -> &'static str {
    match result {
        Err(ConfigError::InvalidParameter { field, .. }) => field,
        other => panic!("expected InvalidParameter, got {other:?}"),
    }
}

#[test]
fn empty_document_yields_defaults() {
    let cfg = SimConfig::from_json_str("{}").expect("defaults");
    assert_eq!(cfg.network.topology, "2D_mesh");
    assert_eq!((cfg.network.width, cfg.network.height), (8, 8));
    assert_eq!(cfg.network.buffer_size, 8);
    assert_eq!(cfg.traffic.packet_injection_rates, vec![0.01, 0.02, 0.03, 0.04, 0.05]);
    assert_eq!(cfg.traffic.packet_size_flits, 4);
    assert_eq!(cfg.traffic.warmup_cycles, 1000);
    assert_eq!(cfg.traffic.measurement_cycles, 10000);
    assert_eq!(cfg.routing.algorithm, "duato");
    assert!(cfg.routing.fallback_to_default);
    assert!(!cfg.routing.channel_reservation);
    assert_eq!(cfg.experiment.runs_per_injection_rate, 5);
    assert_eq!(cfg.injection_reserve(), 0);
    assert!(cfg.debug_directives().is_empty());
}

#[test]
fn partial_sections_override_only_named_fields() {
    let raw = r#"{
        "network": { "topology": "hypercube", "hypercube_dimension": 5, "buffer_size": 6 },
        "traffic": { "packet_injection_rates": [0.1, 0.2], "injection_reserve": 1 },
        "routing": { "algorithm": "ecube", "dimension_priorities": [4, 0] },
        "experiment": { "runs_per_injection_rate": 2, "output_file": "out.csv" }
    }"#;
    let cfg = SimConfig::from_json_str(raw).expect("config");
    assert!(cfg.is_hypercube());
    assert_eq!(cfg.network.hypercube_dimension, 5);
    assert_eq!(cfg.network.width, 8);
    assert_eq!(cfg.traffic.packet_injection_rates, vec![0.1, 0.2]);
    assert_eq!(cfg.traffic.warmup_cycles, 1000);
    assert_eq!(cfg.injection_reserve(), 1);
    assert_eq!(cfg.routing.dimension_priorities, vec![4, 0]);
    assert_eq!(cfg.experiment.output_file, "out.csv");
}

#[test]
fn out_of_range_values_are_rejected() {
    assert_eq!(
        invalid_field(SimConfig::from_json_str(
            r#"{"traffic": {"packet_injection_rates": [0.1, 1.5]}}"#
        )),
        "traffic.packet_injection_rates"
    );
    assert_eq!(
        invalid_field(SimConfig::from_json_str(r#"{"network": {"link_latency": 0.5}}"#)),
        "network.link_latency"
    );
    assert_eq!(
        invalid_field(SimConfig::from_json_str(r#"{"network": {"buffer_size": 0}}"#)),
        "network.buffer_size"
    );
    assert_eq!(
        invalid_field(SimConfig::from_json_str(
            r#"{"network": {"buffer_size": 4}, "traffic": {"injection_reserve": 4}}"#
        )),
        "traffic.injection_reserve"
    );
    assert_eq!(
        invalid_field(SimConfig::from_json_str(r#"{"traffic": {"hotspot_ratio": 2.0}}"#)),
        "traffic.hotspot_ratio"
    );
    assert_eq!(
        invalid_field(SimConfig::from_json_str(
            r#"{"experiment": {"runs_per_injection_rate": 0}}"#
        )),
        "experiment.runs_per_injection_rate"
    );
}

#[test]
fn dimension_priorities_are_checked_only_for_hypercubes() {
    let raw = r#"{
        "network": { "topology": "hypercube", "hypercube_dimension": 3 },
        "routing": { "dimension_priorities": [0, 3] }
    }"#;
    assert_eq!(
        invalid_field(SimConfig::from_json_str(raw)),
        "routing.dimension_priorities"
    );

    let raw = r#"{ "routing": { "dimension_priorities": [0, 3] } }"#;
    assert!(SimConfig::from_json_str(raw).is_ok());
}

#[test]
fn unknown_traffic_pattern_is_rejected() {
    let err = SimConfig::from_json_str(r#"{"traffic": {"pattern": "tornado"}}"#)
        .expect_err("unknown pattern");
    assert!(matches!(err, ConfigError::UnsupportedTraffic(ref p) if p == "tornado"));
}

#[test]
fn malformed_json_and_missing_file_are_reported() {
    assert!(matches!(
        SimConfig::from_json_str("{ not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        SimConfig::from_json_file("/nonexistent/icnsim/config.json"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn debug_switches_map_to_filter_directives() {
    let raw = r#"{"debug": {"routing_verbose": true, "packet_trace": true}}"#;
    let cfg = SimConfig::from_json_str(raw).expect("config");
    assert_eq!(
        cfg.debug_directives(),
        vec!["icnsim_rs::routing=debug", "icnsim_rs::sim=trace"]
    );
}

#[test]
fn context_describes_network_and_effective_routing() {
    let mut cfg = SimConfig::default();
    cfg.network.width = 4;
    cfg.network.height = 2;
    let ctx = SimulationContext::new(cfg).expect("context");
    assert_eq!(ctx.network_description(), "4x2 2D mesh (8 nodes)");
    assert!(ctx.routing_description().contains("Duato"));

    let mut cfg = SimConfig::default();
    cfg.network.topology = "hypercube".to_string();
    cfg.network.hypercube_dimension = 3;
    cfg.routing.algorithm = "minimal".to_string();
    let ctx = SimulationContext::new(cfg).expect("context");
    assert_eq!(ctx.network_description(), "3-dimensional hypercube (8 nodes)");
    let engine = ctx.build_engine().expect("engine");
    assert_eq!(engine.routing().name(), "ecube");
    assert_eq!(engine.network().num_nodes(), 8);
}

#[test]
fn context_rejects_invalid_config() {
    let mut cfg = SimConfig::default();
    cfg.network.link_latency = f64::NAN;
    assert!(matches!(
        SimulationContext::new(cfg),
        Err(ConfigError::InvalidParameter { field: "network.link_latency", .. })
    ));
}
