//! Duato 协议（二维 mesh）
//!
//! 优先走自适应通道：在当前节点的链路中按连接顺序寻找第一条能缩短曼哈顿距离、
//! 且自适应通道可用的链路。找不到时退回确定性的先 X 后 Y 逃生路径，
//! 该路径只在确定性通道可用时才会被选中。

use super::{
    ChannelAvailability, CycleAvoidance, Hop, LinkOccupancy, NoCycleCheck, RoutingAlgorithm,
    RoutingResult, walk,
};
use crate::net::{Network, NodeId, VirtualChannel};
use tracing::{debug, trace};

/// 路径节点数上限，超过即判定为失败
pub const MAX_MESH_PATH_NODES: usize = 100;

#[derive(Debug)]
pub struct DuatoMeshRouting {
    link_latency: f64,
    cycle_check: Box<dyn CycleAvoidance>,
    channels: Box<dyn ChannelAvailability>,
}

impl DuatoMeshRouting {
    pub fn new(link_latency: f64) -> Self {
        Self::with_policies(link_latency, Box::new(NoCycleCheck), Box::new(LinkOccupancy))
    }

    pub fn with_policies(
        link_latency: f64,
        cycle_check: Box<dyn CycleAvoidance>,
        channels: Box<dyn ChannelAvailability>,
    ) -> Self {
        Self {
            link_latency,
            cycle_check,
            channels,
        }
    }

    fn adaptive_hop(&self, net: &Network, current: NodeId, dst: NodeId) -> Option<Hop> {
        let node = net.node(current)?;
        let distance = net.manhattan_distance(current, dst);
        for &link_id in node.links() {
            let Some(link) = net.link(link_id) else {
                continue;
            };
            let Some(next) = link.other_end(current) else {
                continue;
            };
            if net.manhattan_distance(next, dst) >= distance {
                continue;
            }
            let axis = link.direction_from(current).map(|d| d.axis()).unwrap_or(0);
            if self
                .cycle_check
                .would_create_cycle(net, current, axis, VirtualChannel::Adaptive)
            {
                trace!(?current, ?next, "自适应链路被环路检查排除");
                continue;
            }
            if self
                .channels
                .is_channel_available(net, current, next, VirtualChannel::Adaptive)
            {
                return Some(Hop {
                    next,
                    channel: VirtualChannel::Adaptive,
                });
            }
        }
        None
    }

    /// 先 X 后 Y 的维序逃生路径
    fn deterministic_hop(&self, net: &Network, current: NodeId, dst: NodeId) -> Option<Hop> {
        let (cx, cy) = net.mesh_coords(current)?;
        let (dx, dy) = net.mesh_coords(dst)?;
        let (cx, cy, dx, dy) = (cx as i64, cy as i64, dx as i64, dy as i64);
        let next = if cx != dx {
            net.mesh_node(cx + (dx - cx).signum(), cy)?
        } else {
            net.mesh_node(cx, cy + (dy - cy).signum())?
        };
        if self
            .channels
            .is_channel_available(net, current, next, VirtualChannel::Deterministic)
        {
            Some(Hop {
                next,
                channel: VirtualChannel::Deterministic,
            })
        } else {
            None
        }
    }
}

impl RoutingAlgorithm for DuatoMeshRouting {
    fn name(&self) -> &str {
        "duato"
    }

    fn next_hop(&self, net: &Network, current: NodeId, dst: NodeId) -> Option<Hop> {
        if current == dst || !net.contains(current) || !net.contains(dst) {
            return None;
        }
        if let Some(hop) = self.adaptive_hop(net, current, dst) {
            trace!(?current, ?dst, next = ?hop.next, "走自适应通道");
            return Some(hop);
        }
        let hop = self.deterministic_hop(net, current, dst);
        match hop {
            Some(h) => debug!(?current, ?dst, next = ?h.next, "退回确定性逃生通道"),
            None => debug!(?current, ?dst, "没有可用通道"),
        }
        hop
    }

    fn route(&self, net: &Network, src: NodeId, dst: NodeId) -> RoutingResult {
        walk(self, net, src, dst, MAX_MESH_PATH_NODES - 1, self.link_latency)
    }
}
