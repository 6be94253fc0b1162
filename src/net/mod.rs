//! 网络拓扑模块
//!
//! 此模块包含互连网络的核心组件：节点、链路、虚通道、数据包和拓扑 arena。

// 子模块声明
mod id;
mod link;
mod network;
mod node;
mod packet;

// 重新导出公共接口
pub use id::{LinkId, NodeId};
pub use link::{Direction, Link, VirtualChannel};
pub use network::{Network, TopologyKind};
pub use node::{Coord, Node};
pub use packet::{Message, Packet};
