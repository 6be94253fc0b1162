//! 超立方体拓扑构建

use crate::error::ConfigError;
use crate::net::{Direction, Network, NodeId, TopologyKind};
use tracing::debug;

/// 维度上限，2^20 个节点已远超仿真可承受的规模
pub const MAX_DIMENSION: usize = 20;

#[derive(Debug, Clone)]
pub struct HypercubeOpts {
    pub dimension: usize,
}

impl Default for HypercubeOpts {
    fn default() -> Self {
        Self { dimension: 4 }
    }
}

/// 构建 `2^dimension` 个节点的超立方体
///
/// 地址只差一位的两个节点相连；每条链路只在较小地址一侧创建一次，
/// 方向标签按 `dim % 4` 循环。
pub fn build_hypercube(opts: &HypercubeOpts) -> Result<Network, ConfigError> {
    let dimension = opts.dimension;
    if dimension == 0 || dimension > MAX_DIMENSION {
        return Err(ConfigError::invalid(
            "network.hypercube_dimension",
            format!("must be in 1..={MAX_DIMENSION}, got {dimension}"),
        ));
    }

    let n = 1usize << dimension;
    let mut net = Network::new(TopologyKind::Hypercube { dimension });
    for _ in 0..n {
        net.add_hypercube_node(dimension);
    }

    for node in 0..n {
        for dim in 0..dimension {
            let neighbor = node ^ (1 << dim);
            if neighbor > node {
                net.connect_dimension(
                    NodeId(node),
                    NodeId(neighbor),
                    Direction::CYCLE[dim % 4],
                    dim,
                );
            }
        }
    }

    debug!(
        dimension,
        nodes = net.num_nodes(),
        links = net.num_links(),
        "🧊 超立方体拓扑构建完成"
    );
    Ok(net)
}
