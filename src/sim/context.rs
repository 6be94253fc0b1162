//! 仿真上下文
//!
//! 把配置和注册表组合起来：构建拓扑、选择路由算法、生成引擎。

use tracing::info;

use crate::error::ConfigError;
use crate::registry::Registry;
use crate::sim::config::SimConfig;
use crate::sim::engine::{Engine, EngineParams};

#[derive(Debug, Clone)]
pub struct SimulationContext {
    registry: Registry,
    config: SimConfig,
}

impl SimulationContext {
    /// 使用内置注册表
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Self::with_registry(Registry::with_builtins(), config)
    }

    pub fn with_registry(registry: Registry, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// 构建一台新引擎
    pub fn build_engine(&self) -> Result<Engine, ConfigError> {
        let net = self.registry.build_topology(&self.config)?;
        let routing = self.registry.build_routing(&net, &self.config)?;
        let pattern = self.config.traffic_pattern()?;
        info!(
            topology = net.kind().name(),
            nodes = net.num_nodes(),
            routing = routing.name(),
            pattern = pattern.name(),
            "🧩 仿真上下文初始化完成"
        );
        Ok(Engine::new(
            net,
            routing,
            pattern,
            EngineParams::from_config(&self.config),
        ))
    }

    /// 拓扑的人类可读描述
    pub fn network_description(&self) -> String {
        let n = &self.config.network;
        if self.config.is_hypercube() {
            format!(
                "{}-dimensional hypercube ({} nodes)",
                n.hypercube_dimension,
                1usize.checked_shl(n.hypercube_dimension as u32).unwrap_or(0)
            )
        } else {
            format!("{}x{} 2D mesh ({} nodes)", n.width, n.height, n.width * n.height)
        }
    }

    /// 实际生效算法的描述（考虑退回默认算法）
    pub fn routing_description(&self) -> String {
        let topology = self.config.network.topology.as_str();
        let requested = self.config.routing.algorithm.as_str();
        let effective = if self.registry.is_supported(requested, topology) {
            Some(requested)
        } else if self.config.routing.fallback_to_default {
            self.registry.default_routing(topology)
        } else {
            None
        };
        effective
            .and_then(|a| self.registry.describe_routing(a, topology))
            .unwrap_or("unsupported routing algorithm")
            .to_string()
    }
}
