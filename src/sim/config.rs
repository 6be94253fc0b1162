//! 仿真配置
//!
//! JSON 配置文件的强类型视图。所有段和字段都有默认值，缺省的部分按默认处理。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::queue::DEFAULT_BUFFER_PKTS;
use crate::sim::traffic::TrafficPattern;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationSection,
    pub network: NetworkSection,
    pub traffic: TrafficSection,
    pub routing: RoutingSection,
    pub experiment: ExperimentSection,
    pub debug: DebugSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub name: String,
    pub description: String,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            name: "icnsim - interconnection network routing simulation".to_string(),
            description: "Network routing simulation using various protocols".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    /// "2D_mesh" 或 "hypercube"
    pub topology: String,
    pub width: usize,
    pub height: usize,
    pub hypercube_dimension: usize,
    pub virtual_channels: usize,
    /// 每节点缓冲深度（packet 个数）
    pub buffer_size: usize,
    pub link_bandwidth: f64,
    /// 每跳链路时延（周期），不小于 1
    pub link_latency: f64,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            topology: "2D_mesh".to_string(),
            width: 8,
            height: 8,
            hypercube_dimension: 4,
            virtual_channels: 2,
            buffer_size: DEFAULT_BUFFER_PKTS,
            link_bandwidth: 1.0,
            link_latency: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficSection {
    /// "uniform" / "transpose" / "hotspot"
    pub pattern: String,
    pub packet_injection_rates: Vec<f64>,
    pub packet_size_flits: u32,
    pub warmup_cycles: u64,
    pub measurement_cycles: u64,
    pub hotspot_ratio: f64,
    /// 空表示使用最后一个节点
    pub hotspot_nodes: Vec<usize>,
    /// 为转发流量保留的缓冲槽数；None 表示不保留，仅在缓冲区满时拒绝注入
    pub injection_reserve: Option<usize>,
}

impl Default for TrafficSection {
    fn default() -> Self {
        Self {
            pattern: "uniform".to_string(),
            packet_injection_rates: vec![0.01, 0.02, 0.03, 0.04, 0.05],
            packet_size_flits: 4,
            warmup_cycles: 1000,
            measurement_cycles: 10000,
            hotspot_ratio: 0.3,
            hotspot_nodes: Vec::new(),
            injection_reserve: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSection {
    pub algorithm: String,
    /// 超立方体 Duato 协议的确定性维度顺序
    pub dimension_priorities: Vec<usize>,
    /// 不支持的 (算法, 拓扑) 组合是否退回该拓扑的默认算法
    pub fallback_to_default: bool,
    /// 是否在每跳占用所选虚通道
    pub channel_reservation: bool,
}

impl Default for RoutingSection {
    fn default() -> Self {
        Self {
            algorithm: "duato".to_string(),
            dimension_priorities: Vec::new(),
            fallback_to_default: true,
            channel_reservation: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentSection {
    pub runs_per_injection_rate: usize,
    pub latency_threshold: f64,
    pub throughput_drop_threshold: f64,
    pub output_file: String,
}

impl Default for ExperimentSection {
    fn default() -> Self {
        Self {
            runs_per_injection_rate: 5,
            latency_threshold: 50.0,
            throughput_drop_threshold: 0.1,
            output_file: "icnsim_results.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSection {
    pub routing_verbose: bool,
    pub packet_trace: bool,
    pub deadlock_detection_verbose: bool,
}

impl SimConfig {
    /// 从 JSON 文件读取并校验
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn is_hypercube(&self) -> bool {
        self.network.topology == "hypercube"
    }

    /// 实际生效的注入保留槽数
    pub fn injection_reserve(&self) -> usize {
        self.traffic.injection_reserve.unwrap_or(0)
    }

    pub fn traffic_pattern(&self) -> Result<TrafficPattern, ConfigError> {
        TrafficPattern::from_config(self)
    }

    /// 拓扑无关的参数校验，拓扑名与算法名由注册表检查
    pub fn validate(&self) -> Result<(), ConfigError> {
        let net = &self.network;
        if net.buffer_size == 0 {
            return Err(ConfigError::invalid("network.buffer_size", "must be at least 1"));
        }
        if net.link_latency.is_nan() || net.link_latency < 1.0 {
            return Err(ConfigError::invalid(
                "network.link_latency",
                format!("must be >= 1.0, got {}", net.link_latency),
            ));
        }
        if net.virtual_channels == 0 {
            return Err(ConfigError::invalid("network.virtual_channels", "must be at least 1"));
        }

        let t = &self.traffic;
        if let Some(rate) = t
            .packet_injection_rates
            .iter()
            .find(|r| !(0.0..=1.0).contains(*r))
        {
            return Err(ConfigError::invalid(
                "traffic.packet_injection_rates",
                format!("rate {rate} is outside [0, 1]"),
            ));
        }
        if t.packet_size_flits == 0 {
            return Err(ConfigError::invalid("traffic.packet_size_flits", "must be at least 1"));
        }
        if t.measurement_cycles == 0 {
            return Err(ConfigError::invalid("traffic.measurement_cycles", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&t.hotspot_ratio) {
            return Err(ConfigError::invalid(
                "traffic.hotspot_ratio",
                format!("{} is outside [0, 1]", t.hotspot_ratio),
            ));
        }
        if self.injection_reserve() >= net.buffer_size {
            return Err(ConfigError::invalid(
                "traffic.injection_reserve",
                format!(
                    "reserve {} leaves no room for injection in a buffer of {}",
                    self.injection_reserve(),
                    net.buffer_size
                ),
            ));
        }
        self.traffic_pattern()?;

        if self.is_hypercube() {
            if let Some(p) = self
                .routing
                .dimension_priorities
                .iter()
                .find(|p| **p >= net.hypercube_dimension)
            {
                return Err(ConfigError::invalid(
                    "routing.dimension_priorities",
                    format!("dimension {p} >= hypercube_dimension {}", net.hypercube_dimension),
                ));
            }
        }

        if self.experiment.runs_per_injection_rate == 0 {
            return Err(ConfigError::invalid(
                "experiment.runs_per_injection_rate",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// 由调试开关推导的 tracing 过滤指令
    pub fn debug_directives(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.debug.routing_verbose {
            out.push("icnsim_rs::routing=debug");
        }
        if self.debug.deadlock_detection_verbose {
            out.push("icnsim_rs::routing=trace");
        }
        if self.debug.packet_trace {
            out.push("icnsim_rs::sim=trace");
        }
        out
    }
}
