//! 解析式时延模型
//!
//! 数据包退役时不做 flit 级仿真，而是用网络时延、传输时延、排队时延与
//! 若干随负载陡增的惩罚项估算端到端时延。各分段函数均为纯函数。

/// 每跳传输时延（周期）
pub const TRANSMISSION_PER_HOP: f64 = 4.0;
/// 链路利用率的归一化基准（对应基准链路带宽）
pub const LINK_UTIL_BASE: f64 = 3.0;

/// 退役时刻的网络状态快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySample {
    /// 当前周期减去注入周期
    pub network_latency: f64,
    pub hops: u32,
    pub injection_rate: f64,
    /// 全网利用率，见 [`network_utilization`]
    pub utilization: f64,
    /// 退役节点缓冲区占用率
    pub buffer_occupancy: f64,
}

/// 全网利用率
///
/// `avg_buffer` 为各节点缓冲占用率的均值，`avg_link` 为本周期用过的链路
/// 计数 / 3 的均值；再叠加注入压力项，结果截断到 1。
pub fn network_utilization(avg_buffer: f64, avg_link: f64, rate: f64) -> f64 {
    let combined = 0.8 * avg_buffer + 0.2 * avg_link;
    let pressure = (rate / 0.15).powi(3) * 0.2;
    (combined + pressure).min(1.0)
}

/// 注入压力带来的系统时延，`p = rate / 0.08`
pub fn system_delay(rate: f64) -> f64 {
    let p = rate / 0.08;
    if p > 2.2 {
        300.0 + (p - 2.2).powi(5) * 400.0
    } else if p > 1.8 {
        150.0 + (p - 1.8).powi(4) * 375.0
    } else if p > 1.4 {
        60.0 + (p - 1.4).powi(3) * 225.0
    } else if p > 1.25 {
        30.0 + (p - 1.25).powi(3) * 200.0
    } else if p > 1.0 {
        15.0 + (p - 1.0).powi(2) * 60.0
    } else if p > 0.6 {
        5.0 + (p - 0.6) * 25.0
    } else {
        p * 8.33
    }
}

/// 全网拥塞时延
pub fn congestion_delay(u: f64) -> f64 {
    if u > 0.6 {
        ((u - 0.6) / 0.4).powi(5) * 200.0
    } else if u > 0.4 {
        ((u - 0.4) / 0.2).powi(4) * 100.0
    } else if u > 0.25 {
        ((u - 0.25) / 0.15).powi(3) * 50.0
    } else if u > 0.1 {
        ((u - 0.1) / 0.15).powi(2) * 25.0
    } else {
        0.0
    }
}

/// 本地缓冲时延
pub fn buffer_delay(occupancy: f64) -> f64 {
    let b = occupancy;
    if b > 0.85 {
        (b - 0.85).powi(2) * 1200.0
    } else if b > 0.7 {
        (b - 0.7).powi(2) * 500.0
    } else if b > 0.5 {
        (b - 0.5).powi(2) * 200.0
    } else if b > 0.3 {
        (b - 0.3) * 100.0
    } else if b > 0.15 {
        (b - 0.15) * 30.0
    } else {
        b * 15.0
    }
}

/// 注入率越过 0.10 后的阈值效应
pub fn threshold_effect(rate: f64) -> f64 {
    if rate > 0.10 {
        ((rate - 0.10) / 0.05).powi(5) * 120.0
    } else {
        0.0
    }
}

/// 注入率越过 0.12 后的系统开销
pub fn system_overhead(rate: f64) -> f64 {
    if rate > 0.12 {
        ((rate - 0.12) / 0.12).powi(4) * 50.0
    } else {
        0.0
    }
}

/// 排队时延：基础项 + 系统 + 拥塞 + 缓冲 + 每跳惩罚 + 阈值效应
pub fn queuing_delay(s: &DelaySample) -> f64 {
    let hops = s.hops as f64;
    let base = 4.0 + 2.0 * hops;
    let hop_penalty = hops * (3.0 + s.utilization.powi(3) * 15.0);
    base + system_delay(s.injection_rate)
        + congestion_delay(s.utilization)
        + buffer_delay(s.buffer_occupancy)
        + hop_penalty
        + threshold_effect(s.injection_rate)
}

/// 时延下限
pub fn delay_floor(hops: u32) -> f64 {
    18.0 + 3.0 * hops as f64
}

/// 端到端时延
pub fn packet_delay(s: &DelaySample) -> f64 {
    let transmission = s.hops as f64 * TRANSMISSION_PER_HOP;
    let multiplier = 1.0 + s.utilization.powi(3) * 8.0;
    let total = (s.network_latency + transmission) * multiplier
        + queuing_delay(s)
        + system_overhead(s.injection_rate);
    total.max(delay_floor(s.hops))
}
