//! 二维 mesh 拓扑构建

use crate::error::ConfigError;
use crate::net::{Direction, Network, TopologyKind};
use tracing::debug;

/// mesh 拓扑配置选项
#[derive(Debug, Clone)]
pub struct MeshOpts {
    pub width: usize,
    pub height: usize,
}

impl Default for MeshOpts {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
        }
    }
}

/// 构建 width×height 的二维 mesh（无环绕）
///
/// 节点编号为 `x * height + y`；每条水平/垂直相邻关系对应一条链路，
/// 链路方向标签从坐标较小的一端看为 `PositiveX` / `PositiveY`。
pub fn build_mesh(opts: &MeshOpts) -> Result<Network, ConfigError> {
    if opts.width == 0 {
        return Err(ConfigError::invalid("network.width", "must be at least 1"));
    }
    if opts.height == 0 {
        return Err(ConfigError::invalid("network.height", "must be at least 1"));
    }

    let (width, height) = (opts.width, opts.height);
    let mut net = Network::new(TopologyKind::Mesh { width, height });

    for x in 0..width {
        for y in 0..height {
            net.add_mesh_node(x, y);
        }
    }

    let id = |x: usize, y: usize| crate::net::NodeId(x * height + y);
    for x in 0..width {
        for y in 0..height {
            if x + 1 < width {
                net.connect(id(x, y), id(x + 1, y), Direction::PositiveX);
            }
            if y + 1 < height {
                net.connect(id(x, y), id(x, y + 1), Direction::PositiveY);
            }
        }
    }

    debug!(
        width,
        height,
        nodes = net.num_nodes(),
        links = net.num_links(),
        "🧱 mesh 拓扑构建完成"
    );
    Ok(net)
}
