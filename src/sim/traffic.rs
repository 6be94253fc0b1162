//! 流量模式与注入
//!
//! 每个周期的注入完全由 (cycle, rate, trial) 决定：用它们派生种子，
//! 按节点编号顺序为每个节点抽一次随机数，小于注入率就生成一条消息。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;
use crate::net::{Message, NodeId};
use crate::sim::config::SimConfig;

/// 目的地选择方式
#[derive(Debug, Clone, PartialEq)]
pub enum TrafficPattern {
    /// 均匀随机，抽到自己就重抽
    Uniform,
    /// `dst = N - 1 - src`
    Transpose,
    /// 以 `ratio` 概率发往热点节点，否则均匀随机
    Hotspot { ratio: f64, hotspots: Vec<usize> },
}

impl TrafficPattern {
    pub fn from_config(cfg: &SimConfig) -> Result<Self, ConfigError> {
        match cfg.traffic.pattern.as_str() {
            "uniform" => Ok(TrafficPattern::Uniform),
            "transpose" => Ok(TrafficPattern::Transpose),
            "hotspot" => Ok(TrafficPattern::Hotspot {
                ratio: cfg.traffic.hotspot_ratio,
                hotspots: cfg.traffic.hotspot_nodes.clone(),
            }),
            other => Err(ConfigError::UnsupportedTraffic(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrafficPattern::Uniform => "uniform",
            TrafficPattern::Transpose => "transpose",
            TrafficPattern::Hotspot { .. } => "hotspot",
        }
    }

    /// 为 `src` 选一个目的节点；选不出（如网络只有一个节点）时返回 None
    pub fn destination(&self, src: NodeId, nodes: usize, rng: &mut StdRng) -> Option<NodeId> {
        if nodes < 2 {
            return None;
        }
        match self {
            TrafficPattern::Uniform => Some(uniform_other(src, nodes, rng)),
            TrafficPattern::Transpose => {
                let dst = NodeId(nodes - 1 - src.0.min(nodes - 1));
                (dst != src).then_some(dst)
            }
            TrafficPattern::Hotspot { ratio, hotspots } => {
                if rng.gen_range(0.0..1.0) < *ratio {
                    let valid: Vec<usize> =
                        hotspots.iter().copied().filter(|h| *h < nodes).collect();
                    let hot = match valid.len() {
                        0 => nodes - 1,
                        1 => valid[0],
                        n => valid[rng.gen_range(0..n)],
                    };
                    if hot != src.0 {
                        return Some(NodeId(hot));
                    }
                }
                Some(uniform_other(src, nodes, rng))
            }
        }
    }
}

fn uniform_other(src: NodeId, nodes: usize, rng: &mut StdRng) -> NodeId {
    loop {
        let dst = rng.gen_range(0..nodes);
        if dst != src.0 {
            return NodeId(dst);
        }
    }
}

/// 注入种子：周期、注入率与试验编号的确定性混合
pub fn injection_seed(cycle: u64, rate: f64, trial: u64) -> u64 {
    let rate_key = (rate * 10_000.0).round() as u64;
    mix64(cycle.wrapping_mul(12_345).wrapping_add(rate_key) ^ mix64(trial))
}

/// 生成某一周期的全部注入消息（按源节点编号排序）
pub fn injection_plan(
    pattern: &TrafficPattern,
    nodes: usize,
    cycle: u64,
    rate: f64,
    trial: u64,
) -> Vec<Message> {
    let mut out = Vec::new();
    if rate <= 0.0 {
        return out;
    }
    let mut rng = StdRng::seed_from_u64(injection_seed(cycle, rate, trial));
    for src in 0..nodes {
        let u: f64 = rng.gen_range(0.0..1.0);
        if u >= rate {
            continue;
        }
        let src = NodeId(src);
        if let Some(dst) = pattern.destination(src, nodes, &mut rng) {
            out.push(Message {
                src,
                dst,
                injected_at: cycle,
            });
        }
    }
    out
}

/// 一个简单、确定性的 64-bit mixing（splitmix64）
pub(crate) fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
