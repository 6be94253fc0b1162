//! 仿真指标与饱和检测
//!
//! 记录每个数据包的时延和跳数、每个周期的接收 flit 数、每次运行的吞吐样本，
//! 以及拥塞事件和网络利用率。预热阶段的记录一律忽略。
//!
//! 饱和判定是粘性的：引擎一旦置位，`is_saturated` 在 `reset` 之前一直为真。

use serde::Serialize;

/// 默认时延阈值（周期）
pub const DEFAULT_LATENCY_THRESHOLD: f64 = 50.0;
/// 默认吞吐相对下降阈值
pub const DEFAULT_THROUGHPUT_DROP_THRESHOLD: f64 = 0.1;

/// 指标所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MetricsPhase {
    #[default]
    Idle,
    Warmup,
    Measurement,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    phase: MetricsPhase,
    packet_latencies: Vec<f64>,
    hop_counts: Vec<u32>,
    /// 每次运行一个样本（上报吞吐，flits/周期/节点）
    flit_throughputs: Vec<f64>,
    /// 饱和检测用的吞吐序列，与 `flit_throughputs` 同步
    throughput_samples: Vec<f64>,
    /// 每个测量周期的接收 flit 数 / 节点数
    cycle_flits: Vec<f64>,
    network_utilizations: Vec<f64>,
    congestion_events: u64,
    injection_rate: f64,
    saturated: bool,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MetricsPhase {
        self.phase
    }

    fn recording(&self) -> bool {
        self.phase != MetricsPhase::Warmup
    }

    pub fn record_packet_latency(&mut self, cycles: f64) {
        if self.recording() {
            self.packet_latencies.push(cycles);
        }
    }

    pub fn record_flit_throughput(&mut self, flits_per_cycle_per_node: f64) {
        if self.recording() {
            self.flit_throughputs.push(flits_per_cycle_per_node);
            self.throughput_samples.push(flits_per_cycle_per_node);
        }
    }

    pub fn record_cycle_flits(&mut self, flits_per_node: f64) {
        if self.recording() {
            self.cycle_flits.push(flits_per_node);
        }
    }

    pub fn record_hop_count(&mut self, hops: u32) {
        if self.recording() {
            self.hop_counts.push(hops);
        }
    }

    pub fn record_congestion_event(&mut self) {
        if self.recording() {
            self.congestion_events += 1;
        }
    }

    pub fn record_network_utilization(&mut self, utilization: f64) {
        if self.recording() {
            self.network_utilizations.push(utilization);
        }
    }

    pub fn set_injection_rate(&mut self, rate: f64) {
        self.injection_rate = rate;
    }

    pub fn injection_rate(&self) -> f64 {
        self.injection_rate
    }

    pub fn start_warmup(&mut self) {
        self.phase = MetricsPhase::Warmup;
    }

    /// 进入测量阶段，清空测量期序列
    pub fn start_measurement(&mut self) {
        self.phase = MetricsPhase::Measurement;
        self.packet_latencies.clear();
        self.flit_throughputs.clear();
        self.throughput_samples.clear();
        self.cycle_flits.clear();
    }

    pub fn end_measurement(&mut self) {
        self.phase = MetricsPhase::Done;
    }

    pub fn set_saturated(&mut self, saturated: bool) {
        self.saturated = saturated;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 平均包时延
    ///
    /// 测量阶段内尚无数据包时返回 -1，其余空情况返回 0。
    pub fn average_packet_delay(&self) -> f64 {
        if self.packet_latencies.is_empty() {
            return if self.phase == MetricsPhase::Measurement {
                -1.0
            } else {
                0.0
            };
        }
        mean(&self.packet_latencies)
    }

    /// 平均吞吐（flits/周期/节点）
    pub fn throughput(&self) -> f64 {
        mean(&self.flit_throughputs)
    }

    /// 每周期接收 flit 数的均值
    pub fn average_cycle_flits(&self) -> f64 {
        mean(&self.cycle_flits)
    }

    pub fn average_hop_count(&self) -> f64 {
        if self.hop_counts.is_empty() {
            return 0.0;
        }
        self.hop_counts.iter().map(|h| *h as f64).sum::<f64>() / self.hop_counts.len() as f64
    }

    pub fn average_network_utilization(&self) -> f64 {
        mean(&self.network_utilizations)
    }

    pub fn congestion_event_count(&self) -> u64 {
        self.congestion_events
    }

    pub fn packet_count(&self) -> usize {
        self.packet_latencies.len()
    }

    pub fn packet_latencies(&self) -> &[f64] {
        &self.packet_latencies
    }

    pub fn cycle_flits(&self) -> &[f64] {
        &self.cycle_flits
    }

    /// 最小/最大包时延
    pub fn latency_range(&self) -> Option<(f64, f64)> {
        let mut it = self.packet_latencies.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// 饱和判定
    ///
    /// 粘性标志、平均时延超过阈值、最新吞吐样本为 0、或相对前一样本的下降
    /// 超过阈值，任一成立即视为饱和。
    pub fn is_saturated(&self, latency_threshold: f64, throughput_drop_threshold: f64) -> bool {
        if self.saturated {
            return true;
        }
        if self.average_packet_delay() > latency_threshold {
            return true;
        }
        let n = self.throughput_samples.len();
        if n < 2 {
            return false;
        }
        let current = self.throughput_samples[n - 1];
        let previous = self.throughput_samples[n - 2];
        if current == 0.0 {
            return true;
        }
        previous > 0.0 && (previous - current) / previous > throughput_drop_threshold
    }

    pub fn is_saturated_default(&self) -> bool {
        self.is_saturated(DEFAULT_LATENCY_THRESHOLD, DEFAULT_THROUGHPUT_DROP_THRESHOLD)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
