//! 有界 FIFO 队列
//!
//! 以数据包个数计容量；满时拒绝新到达的 packet 并原样交还调用方。

use std::collections::VecDeque;

use crate::net::Packet;

use super::PacketQueue;

#[derive(Debug)]
pub struct BoundedQueue {
    max_pkts: usize,
    q: VecDeque<Packet>,
}

impl BoundedQueue {
    pub fn new(max_pkts: usize) -> Self {
        Self {
            max_pkts,
            q: VecDeque::with_capacity(max_pkts),
        }
    }
}

impl PacketQueue for BoundedQueue {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        if self.q.len() >= self.max_pkts {
            return Err(pkt);
        }
        self.q.push_back(pkt);
        Ok(())
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.q.pop_front()
    }

    fn front(&self) -> Option<&Packet> {
        self.q.front()
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn capacity(&self) -> usize {
        self.max_pkts
    }

    fn clear(&mut self) -> usize {
        let n = self.q.len();
        self.q.clear();
        n
    }
}
