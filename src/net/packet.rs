//! 数据包类型
//!
//! `Message` 只是注入时的一次性描述；真正在缓冲区之间移动的是 `Packet`。

use super::id::NodeId;

/// 注入消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub src: NodeId,
    pub dst: NodeId,
    pub injected_at: u64,
}

/// 网络数据包
///
/// 由持有它的缓冲区拥有，只在缓冲区之间移动，不复制。
#[derive(Debug, PartialEq, Eq)]
pub struct Packet {
    pub id: u64,
    pub src: NodeId,
    pub dst: NodeId,
    /// 当前所在节点
    pub at: NodeId,
    pub injected_at: u64,
    /// 已经走过的跳数，每次成功转发加一
    pub hops: u32,
}

impl Packet {
    /// 由注入消息创建数据包
    pub fn from_message(id: u64, msg: Message) -> Self {
        Self {
            id,
            src: msg.src,
            dst: msg.dst,
            at: msg.src,
            injected_at: msg.injected_at,
            hops: 0,
        }
    }

    /// 是否已到达目的节点
    pub fn arrived(&self) -> bool {
        self.at == self.dst
    }

    /// 前进到下一跳
    pub fn advance(mut self, next: NodeId) -> Self {
        self.at = next;
        self.hops += 1;
        self
    }
}
