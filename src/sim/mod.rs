//! 仿真核心模块
//!
//! 此模块包含周期驱动仿真的核心组件：配置、注入、容量曲线、时延模型、
//! 引擎本体、仿真上下文与注入率扫描。

// 子模块声明
pub mod capacity;
pub mod config;
mod context;
pub mod delay;
mod engine;
pub mod experiment;
pub mod traffic;

// 重新导出公共接口
pub use capacity::{CapacitySchedule, rounds_per_cycle};
pub use config::SimConfig;
pub use context::SimulationContext;
pub use delay::DelaySample;
pub use engine::{
    CycleSummary, Engine, EngineParams, Phase, RunReport, RunStats, SaturationCheck,
};
pub use experiment::{RateResult, SweepSummary};
pub use traffic::{TrafficPattern, injection_plan};
