//! E-cube 路由（超立方体维序路由）
//!
//! 每一跳修正当前地址与目的地址之间最低的不同位，只使用确定性通道。
//! 路径长度恰为两地址的汉明距离。

use super::{Hop, RoutingAlgorithm, RoutingResult, walk};
use crate::net::{Network, NodeId, VirtualChannel};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct EcubeRouting {
    dimension: usize,
    link_latency: f64,
}

impl EcubeRouting {
    pub fn new(dimension: usize, link_latency: f64) -> Self {
        Self {
            dimension,
            link_latency,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl RoutingAlgorithm for EcubeRouting {
    fn name(&self) -> &str {
        "ecube"
    }

    fn next_hop(&self, net: &Network, current: NodeId, dst: NodeId) -> Option<Hop> {
        if !net.contains(current) || !net.contains(dst) {
            return None;
        }
        let diff = current.xor(dst);
        if diff == 0 {
            return None;
        }
        let dim = diff.trailing_zeros() as usize;
        if dim >= self.dimension {
            return None;
        }
        let next = net.neighbor_in_dimension(current, dim)?;
        trace!(?current, ?dst, dim, ?next, "e-cube 选择维度");
        Some(Hop {
            next,
            channel: VirtualChannel::Deterministic,
        })
    }

    fn route(&self, net: &Network, src: NodeId, dst: NodeId) -> RoutingResult {
        walk(self, net, src, dst, self.dimension, self.link_latency)
    }
}
