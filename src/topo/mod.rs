//! 拓扑构建
//!
//! 二维 mesh 与超立方体两种拓扑的构建函数，返回填充好的 `Network`。

pub mod hypercube;
pub mod mesh;

pub use hypercube::{HypercubeOpts, build_hypercube};
pub use mesh::{MeshOpts, build_mesh};
