//! 拓扑与路由算法注册表
//!
//! 按名字查找拓扑构建函数，按 (算法名, 拓扑名) 查找路由算法构建函数。
//! 注册表是一个普通值，构造一次后显式传给需要它的地方。

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::net::{Network, TopologyKind};
use crate::routing::{DuatoHypercubeRouting, DuatoMeshRouting, EcubeRouting, RoutingAlgorithm};
use crate::sim::config::SimConfig;
use crate::topo::{HypercubeOpts, MeshOpts, build_hypercube, build_mesh};

pub type TopologyBuilder = fn(&SimConfig) -> Result<Network, ConfigError>;
pub type RoutingBuilder = fn(&Network, &SimConfig) -> Result<Box<dyn RoutingAlgorithm>, ConfigError>;

#[derive(Debug, Clone)]
struct RoutingEntry {
    builder: RoutingBuilder,
    description: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    topologies: BTreeMap<String, TopologyBuilder>,
    routings: BTreeMap<(String, String), RoutingEntry>,
    defaults: BTreeMap<String, String>,
}

impl Registry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 带内置拓扑与算法的注册表
    ///
    /// 拓扑：`2D_mesh`、`hypercube`；算法：mesh 上的 `duato`，
    /// 超立方体上的 `ecube` 与 `duato`。默认算法 mesh 为 `duato`、超立方体为 `ecube`。
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        r.register_topology("2D_mesh", build_mesh_from_config);
        r.register_topology("hypercube", build_hypercube_from_config);
        r.register_routing(
            "duato",
            "2D_mesh",
            "Duato's Deadlock-Free Protocol for 2D Mesh",
            build_duato_mesh,
        );
        r.register_routing(
            "ecube",
            "hypercube",
            "E-cube Routing Algorithm for Hypercubes",
            build_ecube,
        );
        r.register_routing(
            "duato",
            "hypercube",
            "Duato's Deadlock-Free Protocol for Hypercubes (E-cube escape paths)",
            build_duato_hypercube,
        );
        r.set_default_routing("2D_mesh", "duato");
        r.set_default_routing("hypercube", "ecube");
        r
    }

    pub fn register_topology(&mut self, name: &str, builder: TopologyBuilder) {
        self.topologies.insert(name.to_string(), builder);
    }

    pub fn register_routing(
        &mut self,
        algorithm: &str,
        topology: &str,
        description: &'static str,
        builder: RoutingBuilder,
    ) {
        self.routings.insert(
            (algorithm.to_string(), topology.to_string()),
            RoutingEntry {
                builder,
                description,
            },
        );
    }

    pub fn set_default_routing(&mut self, topology: &str, algorithm: &str) {
        self.defaults
            .insert(topology.to_string(), algorithm.to_string());
    }

    pub fn topologies(&self) -> Vec<&str> {
        self.topologies.keys().map(String::as_str).collect()
    }

    /// 某拓扑上可用的算法名
    pub fn algorithms_for(&self, topology: &str) -> Vec<&str> {
        self.routings
            .keys()
            .filter(|(_, t)| t == topology)
            .map(|(a, _)| a.as_str())
            .collect()
    }

    pub fn is_supported(&self, algorithm: &str, topology: &str) -> bool {
        self.routings
            .contains_key(&(algorithm.to_string(), topology.to_string()))
    }

    pub fn default_routing(&self, topology: &str) -> Option<&str> {
        self.defaults.get(topology).map(String::as_str)
    }

    pub fn describe_routing(&self, algorithm: &str, topology: &str) -> Option<&'static str> {
        self.routings
            .get(&(algorithm.to_string(), topology.to_string()))
            .map(|e| e.description)
    }

    /// 按配置构建拓扑
    #[tracing::instrument(skip(self, cfg), fields(topology = %cfg.network.topology))]
    pub fn build_topology(&self, cfg: &SimConfig) -> Result<Network, ConfigError> {
        let name = cfg.network.topology.as_str();
        let builder = self
            .topologies
            .get(name)
            .ok_or_else(|| ConfigError::UnsupportedTopology {
                name: name.to_string(),
                supported: self.topologies().join(", "),
            })?;
        let net = builder(cfg)?;
        debug!(nodes = net.num_nodes(), links = net.num_links(), "🏗️ 拓扑已构建");
        Ok(net)
    }

    /// 按配置为已构建的拓扑选择路由算法
    ///
    /// 不支持的组合在 `fallback_to_default` 打开时退回该拓扑的默认算法。
    #[tracing::instrument(skip(self, net, cfg), fields(algorithm = %cfg.routing.algorithm))]
    pub fn build_routing(
        &self,
        net: &Network,
        cfg: &SimConfig,
    ) -> Result<Box<dyn RoutingAlgorithm>, ConfigError> {
        let topology = net.kind().name();
        let requested = cfg.routing.algorithm.as_str();
        let key = (requested.to_string(), topology.to_string());
        if let Some(entry) = self.routings.get(&key) {
            return (entry.builder)(net, cfg);
        }

        let unsupported = || ConfigError::UnsupportedRouting {
            algorithm: requested.to_string(),
            topology: topology.to_string(),
            supported: self.algorithms_for(topology).join(", "),
        };
        if !cfg.routing.fallback_to_default {
            return Err(unsupported());
        }
        let fallback = self.default_routing(topology).ok_or_else(unsupported)?;
        let entry = self
            .routings
            .get(&(fallback.to_string(), topology.to_string()))
            .ok_or_else(unsupported)?;
        warn!(
            requested,
            topology,
            fallback,
            "⚠️ 路由算法不支持该拓扑，使用默认算法"
        );
        (entry.builder)(net, cfg)
    }
}

fn build_mesh_from_config(cfg: &SimConfig) -> Result<Network, ConfigError> {
    build_mesh(&MeshOpts {
        width: cfg.network.width,
        height: cfg.network.height,
    })
}

fn build_hypercube_from_config(cfg: &SimConfig) -> Result<Network, ConfigError> {
    build_hypercube(&HypercubeOpts {
        dimension: cfg.network.hypercube_dimension,
    })
}

fn hypercube_dimension(net: &Network) -> Result<usize, ConfigError> {
    match net.kind() {
        TopologyKind::Hypercube { dimension } => Ok(dimension),
        TopologyKind::Mesh { .. } => Err(ConfigError::invalid(
            "network.topology",
            "hypercube routing requires a hypercube topology",
        )),
    }
}

fn build_duato_mesh(
    net: &Network,
    cfg: &SimConfig,
) -> Result<Box<dyn RoutingAlgorithm>, ConfigError> {
    if !matches!(net.kind(), TopologyKind::Mesh { .. }) {
        return Err(ConfigError::invalid(
            "network.topology",
            "mesh routing requires a 2D mesh topology",
        ));
    }
    Ok(Box::new(DuatoMeshRouting::new(cfg.network.link_latency)))
}

fn build_ecube(net: &Network, cfg: &SimConfig) -> Result<Box<dyn RoutingAlgorithm>, ConfigError> {
    let dimension = hypercube_dimension(net)?;
    Ok(Box::new(EcubeRouting::new(dimension, cfg.network.link_latency)))
}

fn build_duato_hypercube(
    net: &Network,
    cfg: &SimConfig,
) -> Result<Box<dyn RoutingAlgorithm>, ConfigError> {
    let dimension = hypercube_dimension(net)?;
    Ok(Box::new(DuatoHypercubeRouting::new(
        dimension,
        cfg.network.link_latency,
        &cfg.routing.dimension_priorities,
    )))
}
