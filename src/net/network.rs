//! 网络拓扑管理
//!
//! 拓扑是一个 arena：拥有全部节点和链路，外部只通过 `NodeId` / `LinkId` 引用它们。
//! 同一对节点之间只会有一条无向链路。

use std::collections::HashMap;

use super::id::{LinkId, NodeId};
use super::link::{Direction, Link, VirtualChannel};
use super::node::Node;
use super::packet::{Message, Packet};
use tracing::trace;

/// 拓扑种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyKind {
    Mesh { width: usize, height: usize },
    Hypercube { dimension: usize },
}

impl TopologyKind {
    /// 注册表中使用的拓扑名
    pub fn name(&self) -> &'static str {
        match self {
            TopologyKind::Mesh { .. } => "2D_mesh",
            TopologyKind::Hypercube { .. } => "hypercube",
        }
    }
}

/// 网络拓扑
#[derive(Debug, Clone)]
pub struct Network {
    kind: TopologyKind,
    nodes: Vec<Node>,
    links: Vec<Link>,
    edges: HashMap<(NodeId, NodeId), LinkId>,
    next_pkt_id: u64,
}

impl Network {
    pub fn new(kind: TopologyKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            links: Vec::new(),
            edges: HashMap::new(),
            next_pkt_id: 0,
        }
    }

    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    /// 添加 mesh 节点
    pub fn add_mesh_node(&mut self, x: usize, y: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::mesh(id, x, y));
        id
    }

    /// 添加超立方体节点
    pub fn add_hypercube_node(&mut self, dimension: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::hypercube(id, dimension));
        id
    }

    /// 连接两个节点（无向链路）
    ///
    /// 若两点之间已有链路，直接返回已有链路。
    pub fn connect(&mut self, a: NodeId, b: NodeId, direction: Direction) -> LinkId {
        self.insert_link(Link::new(a, b, direction))
    }

    /// 连接超立方体某一维上的两个节点
    pub fn connect_dimension(
        &mut self,
        a: NodeId,
        b: NodeId,
        direction: Direction,
        dimension: usize,
    ) -> LinkId {
        self.insert_link(Link::new(a, b, direction).with_dimension(dimension))
    }

    fn insert_link(&mut self, link: Link) -> LinkId {
        let (a, b) = (link.a, link.b);
        if let Some(&existing) = self.edges.get(&(a, b)) {
            trace!(?a, ?b, ?existing, "链路已存在");
            return existing;
        }
        let id = LinkId(self.links.len());
        self.links.push(link);
        self.edges.insert((a, b), id);
        self.edges.insert((b, a), id);
        if let Some(node) = self.nodes.get_mut(a.0) {
            node.attach(id);
        }
        if let Some(node) = self.nodes.get_mut(b.0) {
            node.attach(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// 两点之间的链路
    pub fn link_between(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        self.edges.get(&(a, b)).copied()
    }

    /// 邻居节点（按链路连接顺序）
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.links().iter())
            .filter_map(move |l| self.link(*l).and_then(|link| link.other_end(id)))
    }

    /// 超立方体维度；mesh 返回 None
    pub fn dimension(&self) -> Option<usize> {
        match self.kind {
            TopologyKind::Hypercube { dimension } => Some(dimension),
            TopologyKind::Mesh { .. } => None,
        }
    }

    /// 按坐标查找 mesh 节点，越界返回 None
    pub fn mesh_node(&self, x: i64, y: i64) -> Option<NodeId> {
        let TopologyKind::Mesh { width, height } = self.kind else {
            return None;
        };
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= width || y >= height {
            return None;
        }
        Some(NodeId(x * height + y))
    }

    /// mesh 节点坐标
    pub fn mesh_coords(&self, id: NodeId) -> Option<(usize, usize)> {
        self.node(id).and_then(Node::mesh_xy)
    }

    /// 超立方体中沿某一维的邻居
    pub fn neighbor_in_dimension(&self, node: NodeId, dim: usize) -> Option<NodeId> {
        let dimension = self.dimension()?;
        if dim >= dimension || !self.contains(node) {
            return None;
        }
        Some(NodeId(node.0 ^ (1 << dim)))
    }

    /// 两节点是否直接相连
    pub fn are_neighbors(&self, a: NodeId, b: NodeId) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        match self.kind {
            TopologyKind::Hypercube { .. } => self.hamming_distance(a, b) == 1,
            TopologyKind::Mesh { .. } => self.link_between(a, b).is_some(),
        }
    }

    /// 地址异或后的置位数
    pub fn hamming_distance(&self, a: NodeId, b: NodeId) -> u32 {
        a.xor(b).count_ones()
    }

    /// 曼哈顿距离
    ///
    /// mesh 中为 |dx| + |dy|；超立方体中比特空间的曼哈顿距离即汉明距离。
    pub fn manhattan_distance(&self, a: NodeId, b: NodeId) -> usize {
        match self.kind {
            TopologyKind::Hypercube { .. } => self.hamming_distance(a, b) as usize,
            TopologyKind::Mesh { .. } => match (self.mesh_coords(a), self.mesh_coords(b)) {
                (Some((ax, ay)), Some((bx, by))) => ax.abs_diff(bx) + ay.abs_diff(by),
                _ => usize::MAX,
            },
        }
    }

    /// 检查 from -> to 链路上某个虚通道是否空闲；没有链路时为 false
    pub fn can_transmit(&self, from: NodeId, to: NodeId, vc: VirtualChannel) -> bool {
        self.link_between(from, to)
            .and_then(|l| self.link(l))
            .is_some_and(|l| l.can_transmit(vc))
    }

    /// 占用 from -> to 链路上的虚通道
    pub fn mark_transmitted(&mut self, from: NodeId, to: NodeId, vc: VirtualChannel) -> bool {
        let Some(id) = self.link_between(from, to) else {
            return false;
        };
        match self.links.get_mut(id.0) {
            Some(link) => {
                link.mark_transmitted(vc);
                true
            }
            None => false,
        }
    }

    /// 释放所有链路上的虚通道
    pub fn release_all_channels(&mut self) {
        for link in &mut self.links {
            link.release_channels();
        }
    }

    /// 由注入消息创建数据包
    pub fn make_packet(&mut self, msg: Message) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Packet::from_message(id, msg)
    }

    /// 清空数据包编号与通道状态，用于重新运行
    pub fn reset(&mut self) {
        self.next_pkt_id = 0;
        self.release_all_channels();
    }
}
