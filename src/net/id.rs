//! 标识符类型
//!
//! 定义节点和链路的唯一标识符。二者都是拓扑 arena 中的稠密下标。

/// 节点标识符
///
/// mesh 中为 `x * height + y`，超立方体中即节点的二进制地址。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// 链路标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

impl NodeId {
    /// 与另一个节点地址按位异或（超立方体寻址用）
    pub fn xor(self, other: NodeId) -> usize {
        self.0 ^ other.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}
