//! Duato 协议（超立方体）
//!
//! 自适应通道按维度从低到高尝试所有需要修正的维度；都不可用时，
//! 沿维度优先级中第一个需要修正的维度走确定性逃生通道。
//!
//! 逃生路径的无死锁性要求优先级是一个全序且在所有节点上一致使用。
//! 构造时会把缺失的维度按升序补到优先级末尾。

use super::{
    AlwaysAvailable, ChannelAvailability, CycleAvoidance, Hop, NoCycleCheck, RoutingAlgorithm,
    RoutingResult, walk,
};
use crate::net::{Network, NodeId, VirtualChannel};
use tracing::{debug, trace, warn};

#[derive(Debug)]
pub struct DuatoHypercubeRouting {
    dimension: usize,
    link_latency: f64,
    priorities: Vec<usize>,
    cycle_check: Box<dyn CycleAvoidance>,
    channels: Box<dyn ChannelAvailability>,
}

impl DuatoHypercubeRouting {
    pub fn new(dimension: usize, link_latency: f64, priorities: &[usize]) -> Self {
        Self::with_policies(
            dimension,
            link_latency,
            priorities,
            Box::new(NoCycleCheck),
            Box::new(AlwaysAvailable),
        )
    }

    pub fn with_policies(
        dimension: usize,
        link_latency: f64,
        priorities: &[usize],
        cycle_check: Box<dyn CycleAvoidance>,
        channels: Box<dyn ChannelAvailability>,
    ) -> Self {
        Self {
            dimension,
            link_latency,
            priorities: normalize_priorities(priorities, dimension),
            cycle_check,
            channels,
        }
    }

    /// 实际使用的确定性维度顺序
    pub fn priorities(&self) -> &[usize] {
        &self.priorities
    }
}

/// 去掉越界和重复的维度，并把缺失维度按升序补齐
fn normalize_priorities(priorities: &[usize], dimension: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(dimension);
    for &p in priorities {
        if p < dimension && !out.contains(&p) {
            out.push(p);
        }
    }
    let given = out.len();
    for d in 0..dimension {
        if !out.contains(&d) {
            out.push(d);
        }
    }
    if !priorities.is_empty() && (given != priorities.len() || given != dimension) {
        warn!(?priorities, normalized = ?out, "维度优先级不完整，已补齐");
    }
    out
}

impl RoutingAlgorithm for DuatoHypercubeRouting {
    fn name(&self) -> &str {
        "duato"
    }

    fn next_hop(&self, net: &Network, current: NodeId, dst: NodeId) -> Option<Hop> {
        if !net.contains(current) || !net.contains(dst) {
            return None;
        }
        let diff = current.xor(dst);
        if diff == 0 {
            return None;
        }

        for dim in (0..self.dimension).filter(|d| diff & (1 << d) != 0) {
            if self
                .cycle_check
                .would_create_cycle(net, current, dim, VirtualChannel::Adaptive)
            {
                trace!(?current, dim, "自适应维度被环路检查排除");
                continue;
            }
            let Some(next) = net.neighbor_in_dimension(current, dim) else {
                continue;
            };
            if self
                .channels
                .is_channel_available(net, current, next, VirtualChannel::Adaptive)
            {
                trace!(?current, ?dst, dim, "走自适应通道");
                return Some(Hop {
                    next,
                    channel: VirtualChannel::Adaptive,
                });
            }
        }

        let dim = self
            .priorities
            .iter()
            .copied()
            .find(|d| diff & (1 << d) != 0)?;
        let next = net.neighbor_in_dimension(current, dim)?;
        if self
            .channels
            .is_channel_available(net, current, next, VirtualChannel::Deterministic)
        {
            debug!(?current, ?dst, dim, "退回确定性逃生通道");
            Some(Hop {
                next,
                channel: VirtualChannel::Deterministic,
            })
        } else {
            debug!(?current, ?dst, "没有可用通道");
            None
        }
    }

    fn route(&self, net: &Network, src: NodeId, dst: NodeId) -> RoutingResult {
        walk(self, net, src, dst, self.dimension, self.link_latency)
    }
}
