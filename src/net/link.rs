//! 链路类型
//!
//! 无向链路，带方向标签和两个虚通道占用标志（自适应 / 确定性）。
//! 占用标志只是一个空闲/占用的闸门，不是队列。

use super::id::NodeId;

/// 链路方向标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
}

impl Direction {
    /// 超立方体链路按维度循环打标签（仅用于记账）
    pub const CYCLE: [Direction; 4] = [
        Direction::PositiveX,
        Direction::PositiveY,
        Direction::NegativeX,
        Direction::NegativeY,
    ];

    pub fn reverse(self) -> Self {
        match self {
            Direction::PositiveX => Direction::NegativeX,
            Direction::NegativeX => Direction::PositiveX,
            Direction::PositiveY => Direction::NegativeY,
            Direction::NegativeY => Direction::PositiveY,
        }
    }

    /// X 方向为 0，Y 方向为 1
    pub fn axis(self) -> usize {
        match self {
            Direction::PositiveX | Direction::NegativeX => 0,
            Direction::PositiveY | Direction::NegativeY => 1,
        }
    }
}

/// 虚通道类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualChannel {
    /// 自适应通道，可走任意有效（缩短距离的）链路
    Adaptive,
    /// 确定性逃生通道，按固定维序路由，保证无死锁
    Deterministic,
}

/// 网络链路
#[derive(Debug, Clone)]
pub struct Link {
    pub a: NodeId,
    pub b: NodeId,
    /// 从 `a` 看的方向
    pub direction: Direction,
    /// 超立方体链路所在维度
    pub dimension: Option<usize>,
    adaptive_busy: bool,
    deterministic_busy: bool,
}

impl Link {
    /// 创建新链路
    pub fn new(a: NodeId, b: NodeId, direction: Direction) -> Self {
        Self {
            a,
            b,
            direction,
            dimension: None,
            adaptive_busy: false,
            deterministic_busy: false,
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// 链路另一端；`node` 不是端点时返回 None
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// 从某一端看的方向，`b` 端看到的是反方向
    pub fn direction_from(&self, node: NodeId) -> Option<Direction> {
        if node == self.a {
            Some(self.direction)
        } else if node == self.b {
            Some(self.direction.reverse())
        } else {
            None
        }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// 指定虚通道是否空闲
    pub fn can_transmit(&self, vc: VirtualChannel) -> bool {
        match vc {
            VirtualChannel::Adaptive => !self.adaptive_busy,
            VirtualChannel::Deterministic => !self.deterministic_busy,
        }
    }

    /// 占用指定虚通道
    pub fn mark_transmitted(&mut self, vc: VirtualChannel) {
        match vc {
            VirtualChannel::Adaptive => self.adaptive_busy = true,
            VirtualChannel::Deterministic => self.deterministic_busy = true,
        }
    }

    /// 释放两个虚通道
    pub fn release_channels(&mut self) {
        self.adaptive_busy = false;
        self.deterministic_busy = false;
    }
}
