//! 节点缓冲队列
//!
//! 每个路由节点持有一个有界 FIFO。容量按 packet 个数计，永远不会被超出。

use crate::net::Packet;

mod bounded;

pub use bounded::BoundedQueue;

/// 默认缓冲深度（packet 个数）
pub const DEFAULT_BUFFER_PKTS: usize = 8;

/// Packet 队列抽象
pub trait PacketQueue: std::fmt::Debug {
    /// 入队：成功返回 Ok；队列已满则返回 Err(pkt)
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet>;
    /// 出队：返回队首 packet
    fn dequeue(&mut self) -> Option<Packet>;
    /// 查看队首 packet
    fn front(&self) -> Option<&Packet>;

    fn len(&self) -> usize;
    fn capacity(&self) -> usize;
    /// 清空队列，返回被丢弃的 packet 数
    fn clear(&mut self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// 占用率 len / capacity；零容量视为满
    fn occupancy(&self) -> f64 {
        if self.capacity() == 0 {
            return 1.0;
        }
        self.len() as f64 / self.capacity() as f64
    }
}
