//! 路由算法
//!
//! 所有算法都实现 `RoutingAlgorithm`：
//! - `next_hop`：引擎每个周期调用，给出当前节点的下一跳与所用虚通道；
//! - `route`：静态路径查询，从源点反复取下一跳直到终点，不修改网络状态。
//!
//! 算法可通过 `CycleAvoidance` / `ChannelAvailability` 两个策略点替换行为。

use crate::net::{Network, NodeId, VirtualChannel};

mod duato_hypercube;
mod duato_mesh;
mod ecube;
mod policy;

pub use duato_hypercube::DuatoHypercubeRouting;
pub use duato_mesh::{DuatoMeshRouting, MAX_MESH_PATH_NODES};
pub use ecube::EcubeRouting;
pub use policy::{AlwaysAvailable, ChannelAvailability, CycleAvoidance, LinkOccupancy, NoCycleCheck};

/// 每跳固定的额外路由开销（周期）
pub const PER_HOP_ROUTING_OVERHEAD: f64 = 0.5;

/// 单跳决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub next: NodeId,
    pub channel: VirtualChannel,
}

/// 路径查询结果
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingResult {
    pub success: bool,
    pub path: Vec<NodeId>,
    pub hops: usize,
    pub total_delay: f64,
}

impl RoutingResult {
    pub fn failed(path: Vec<NodeId>) -> Self {
        let hops = path.len().saturating_sub(1);
        Self {
            success: false,
            path,
            hops,
            total_delay: 0.0,
        }
    }

    pub fn completed(path: Vec<NodeId>, link_latency: f64) -> Self {
        let hops = path.len().saturating_sub(1);
        Self {
            success: true,
            path,
            hops,
            total_delay: path_delay(hops, link_latency),
        }
    }
}

/// 路径时延估计：每跳链路时延加固定路由开销
pub fn path_delay(hops: usize, link_latency: f64) -> f64 {
    let hops = hops as f64;
    hops * link_latency + hops * PER_HOP_ROUTING_OVERHEAD
}

/// 路由算法接口
pub trait RoutingAlgorithm: std::fmt::Debug {
    fn name(&self) -> &str;

    /// 当前节点的下一跳；已在终点或无路可走时返回 None
    fn next_hop(&self, net: &Network, current: NodeId, dst: NodeId) -> Option<Hop>;

    /// 完整路径查询
    fn route(&self, net: &Network, src: NodeId, dst: NodeId) -> RoutingResult;
}

/// 反复取下一跳拼出路径；超过 `max_hops` 仍未到达视为失败
pub(crate) fn walk(
    algo: &dyn RoutingAlgorithm,
    net: &Network,
    src: NodeId,
    dst: NodeId,
    max_hops: usize,
    link_latency: f64,
) -> RoutingResult {
    if !net.contains(src) || !net.contains(dst) {
        return RoutingResult::failed(Vec::new());
    }
    let mut path = vec![src];
    let mut cur = src;
    while cur != dst {
        if path.len() > max_hops {
            return RoutingResult::failed(path);
        }
        match algo.next_hop(net, cur, dst) {
            Some(hop) => {
                cur = hop.next;
                path.push(cur);
            }
            None => return RoutingResult::failed(path),
        }
    }
    RoutingResult::completed(path, link_latency)
}
