//! 路由策略点
//!
//! 两个可替换的判断：
//! - 选择某条自适应通道是否会在通道依赖图中形成环；
//! - 某条链路上的某个虚通道当前是否可用。

use crate::net::{Network, NodeId, VirtualChannel};

/// 环路规避检查
pub trait CycleAvoidance: std::fmt::Debug {
    fn would_create_cycle(
        &self,
        net: &Network,
        current: NodeId,
        dimension: usize,
        vc: VirtualChannel,
    ) -> bool;
}

/// 默认实现：从不排除任何选择
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCycleCheck;

impl CycleAvoidance for NoCycleCheck {
    fn would_create_cycle(&self, _: &Network, _: NodeId, _: usize, _: VirtualChannel) -> bool {
        false
    }
}

/// 虚通道可用性检查
pub trait ChannelAvailability: std::fmt::Debug {
    fn is_channel_available(
        &self,
        net: &Network,
        from: NodeId,
        to: NodeId,
        vc: VirtualChannel,
    ) -> bool;
}

/// 总是可用（超立方体默认）
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAvailable;

impl ChannelAvailability for AlwaysAvailable {
    fn is_channel_available(&self, _: &Network, _: NodeId, _: NodeId, _: VirtualChannel) -> bool {
        true
    }
}

/// 查询链路上的占用标志（mesh 默认）
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkOccupancy;

impl ChannelAvailability for LinkOccupancy {
    fn is_channel_available(
        &self,
        net: &Network,
        from: NodeId,
        to: NodeId,
        vc: VirtualChannel,
    ) -> bool {
        net.can_transmit(from, to, vc)
    }
}
