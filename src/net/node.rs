//! 节点类型
//!
//! 互连网络中的路由节点。每个节点带有一种坐标：二维 mesh 的 (x, y)，
//! 或超立方体的比特地址。

use super::id::{LinkId, NodeId};

/// 节点坐标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coord {
    Mesh { x: usize, y: usize },
    /// `bits[i]` 为地址的第 i 位
    Hypercube { bits: Vec<bool> },
}

/// 路由节点
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    coord: Coord,
    links: Vec<LinkId>,
}

impl Node {
    /// 创建 mesh 节点
    pub fn mesh(id: NodeId, x: usize, y: usize) -> Self {
        Self {
            id,
            coord: Coord::Mesh { x, y },
            links: Vec::new(),
        }
    }

    /// 创建超立方体节点，坐标由 id 的低 `dimension` 位给出
    pub fn hypercube(id: NodeId, dimension: usize) -> Self {
        let bits = (0..dimension).map(|i| (id.0 >> i) & 1 == 1).collect();
        Self {
            id,
            coord: Coord::Hypercube { bits },
            links: Vec::with_capacity(dimension),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn coord(&self) -> &Coord {
        &self.coord
    }

    /// mesh 坐标；超立方体节点返回 None
    pub fn mesh_xy(&self) -> Option<(usize, usize)> {
        match self.coord {
            Coord::Mesh { x, y } => Some((x, y)),
            Coord::Hypercube { .. } => None,
        }
    }

    /// 超立方体比特地址；mesh 节点返回 None
    pub fn hypercube_bits(&self) -> Option<&[bool]> {
        match &self.coord {
            Coord::Hypercube { bits } => Some(bits),
            Coord::Mesh { .. } => None,
        }
    }

    /// 相连链路（按连接顺序）
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    pub fn degree(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn attach(&mut self, link: LinkId) {
        self.links.push(link);
    }
}
