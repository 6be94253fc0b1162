//! 周期驱动仿真引擎
//!
//! 每个周期分两步：
//! 1. 注入：按确定性种子为每个节点决定是否产生新消息；
//! 2. 路由/排空：在全局移动上限、链路预算和缓冲容量的约束下，
//!    逐轮按节点编号推进各缓冲区的队首数据包。
//!
//! 数据包进入目的节点的缓冲区，轮到队首时退役，时延由解析式模型给出并记入指标。

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::metrics::Metrics;
use crate::net::{Network, NodeId, Packet};
use crate::queue::{BoundedQueue, PacketQueue};
use crate::routing::RoutingAlgorithm;
use crate::sim::capacity::{CapacitySchedule, rounds_per_cycle};
use crate::sim::config::SimConfig;
use crate::sim::delay::{self, DelaySample, LINK_UTIL_BASE};
use crate::sim::traffic::{TrafficPattern, injection_plan};

/// 连续零接收周期超过测量周期的该比例时提前结束
pub const EARLY_STOP_ZERO_FRACTION: f64 = 0.2;
/// 饱和判定：连续零接收周期比例
pub const ZERO_STREAK_FRACTION: f64 = 0.15;
/// 饱和判定：连续低吞吐周期比例
pub const LOW_STREAK_FRACTION: f64 = 0.2;
/// 接收数低于期望值的该比例即视为低吞吐周期
pub const LOW_THROUGHPUT_FRACTION: f64 = 0.6;
/// 饱和判定：平均时延上限
pub const SATURATION_DELAY: f64 = 300.0;

/// 引擎阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Warmup,
    Measurement,
    Reported,
}

/// 引擎参数
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    pub buffer_size: usize,
    pub injection_reserve: usize,
    pub packet_size_flits: u32,
    pub warmup_cycles: u64,
    pub measurement_cycles: u64,
    pub channel_reservation: bool,
    pub latency_threshold: f64,
    pub throughput_drop_threshold: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl EngineParams {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self {
            buffer_size: cfg.network.buffer_size,
            injection_reserve: cfg.injection_reserve(),
            packet_size_flits: cfg.traffic.packet_size_flits,
            warmup_cycles: cfg.traffic.warmup_cycles,
            measurement_cycles: cfg.traffic.measurement_cycles,
            channel_reservation: cfg.routing.channel_reservation,
            latency_threshold: cfg.experiment.latency_threshold,
            throughput_drop_threshold: cfg.experiment.throughput_drop_threshold,
        }
    }
}

/// 运行计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// 进入缓冲区的数据包（含预热）
    pub injected: u64,
    /// 因源缓冲区无余量而被拒绝的注入
    pub injection_refused: u64,
    /// 全部退役数（含预热）
    pub retired: u64,
    /// 测量阶段退役数
    pub retired_measured: u64,
    pub moves: u64,
    pub routing_stalls: u64,
    pub congestion_events: u64,
    pub dropped: u64,
    pub cycles_run: u64,
    pub measurement_cycles_run: u64,
    pub early_stopped: bool,
    pub zero_receive_streak: u64,
    pub low_throughput_streak: u64,
    pub max_buffer_occupancy: usize,
    pub max_link_use: u32,
}

/// 单个周期的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub injected: u32,
    pub moved: u32,
    pub retired: u32,
}

/// 一次运行的报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub injection_rate: f64,
    pub trial: u64,
    /// 测量期内平均包时延；没有数据包时为 -1
    pub average_delay: f64,
    pub raw_throughput: f64,
    /// 截断到容量上限后的吞吐
    pub throughput: f64,
    pub saturated: bool,
    pub packets: u64,
    pub average_hops: f64,
    pub in_flight: usize,
    pub stats: RunStats,
}

/// 运行结束时的饱和判据
///
/// 任一条件成立即饱和：测量期无退役；平均时延超过 [`SATURATION_DELAY`]；
/// 上报吞吐低于期望值的 70% 且时延超过 60；连续低吞吐周期超过测量周期的 20%；
/// 连续零接收周期超过测量周期的 15%。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationCheck {
    pub retired: u64,
    pub average_delay: f64,
    pub reported_throughput: f64,
    pub injection_rate: f64,
    pub packet_size_flits: u32,
    pub low_throughput_streak: u64,
    pub zero_receive_streak: u64,
    pub measurement_cycles: u64,
}

impl SaturationCheck {
    pub fn is_saturated(&self) -> bool {
        let measurement = self.measurement_cycles.max(1) as f64;
        let offered = self.injection_rate * self.packet_size_flits as f64;
        self.retired == 0
            || self.average_delay > SATURATION_DELAY
            || (self.reported_throughput < offered * 0.7 && self.average_delay > 60.0)
            || self.low_throughput_streak as f64 > measurement * LOW_STREAK_FRACTION
            || self.zero_receive_streak as f64 > measurement * ZERO_STREAK_FRACTION
    }
}

pub struct Engine {
    net: Network,
    routing: Box<dyn RoutingAlgorithm>,
    pattern: TrafficPattern,
    params: EngineParams,
    buffers: Vec<BoundedQueue>,
    link_use: HashMap<(NodeId, NodeId), u32>,
    metrics: Metrics,
    stats: RunStats,
    phase: Phase,
    cycle: u64,
    rate: f64,
    trial: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("topology", &self.net.kind())
            .field("routing", &self.routing.name())
            .field("pattern", &self.pattern)
            .field("phase", &self.phase)
            .field("cycle", &self.cycle)
            .finish()
    }
}

impl Engine {
    pub fn new(
        net: Network,
        routing: Box<dyn RoutingAlgorithm>,
        pattern: TrafficPattern,
        params: EngineParams,
    ) -> Self {
        let buffers = (0..net.num_nodes())
            .map(|_| BoundedQueue::new(params.buffer_size))
            .collect();
        Self {
            net,
            routing,
            pattern,
            params,
            buffers,
            link_use: HashMap::new(),
            metrics: Metrics::new(),
            stats: RunStats::default(),
            phase: Phase::Idle,
            cycle: 0,
            rate: 0.0,
            trial: 0,
        }
    }

    pub fn network(&self) -> &Network {
        &self.net
    }

    pub fn routing(&self) -> &dyn RoutingAlgorithm {
        self.routing.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn buffer_len(&self, node: NodeId) -> usize {
        self.buffers.get(node.0).map_or(0, |b| b.len())
    }

    /// 缓冲区中尚未退役的数据包总数
    pub fn in_flight(&self) -> usize {
        self.buffers.iter().map(|b| b.len()).sum()
    }

    /// 本周期各有向链路已通过的跳数
    pub fn link_use(&self) -> &HashMap<(NodeId, NodeId), u32> {
        &self.link_use
    }

    /// 清空缓冲区、计数器和指标，回到初始状态
    pub fn reset(&mut self) {
        for buf in &mut self.buffers {
            buf.clear();
        }
        self.link_use.clear();
        self.net.reset();
        self.metrics.reset();
        self.stats = RunStats::default();
        self.phase = Phase::Idle;
        self.cycle = 0;
        self.rate = 0.0;
        self.trial = 0;
    }

    /// 复位并以给定注入率进入预热阶段，之后可以逐周期调用 `step`
    pub fn start(&mut self, rate: f64, trial: u64) {
        self.reset();
        self.rate = rate;
        self.trial = trial;
        self.metrics.set_injection_rate(rate);
        self.metrics.start_warmup();
        self.phase = Phase::Warmup;
    }

    /// 进入测量阶段
    pub fn begin_measurement(&mut self) {
        self.metrics.start_measurement();
        self.phase = Phase::Measurement;
    }

    /// 以默认试验编号运行
    pub fn run(&mut self, rate: f64) -> RunReport {
        self.run_trial(rate, 0)
    }

    /// 完整运行一次：预热、测量并给出报告
    #[tracing::instrument(skip(self), fields(topology = self.net.kind().name(), routing = self.routing.name()))]
    pub fn run_trial(&mut self, rate: f64, trial: u64) -> RunReport {
        info!("🚀 开始仿真");
        self.start(rate, trial);

        for _ in 0..self.params.warmup_cycles {
            self.step();
        }
        debug!(cycle = self.cycle, in_flight = self.in_flight(), "预热结束");

        self.begin_measurement();
        let measurement = self.params.measurement_cycles;
        for _ in 0..measurement {
            self.step();
            if self.stats.zero_receive_streak as f64 > measurement as f64 * EARLY_STOP_ZERO_FRACTION {
                warn!(
                    cycle = self.cycle,
                    zero_streak = self.stats.zero_receive_streak,
                    "⚠️ 长时间没有数据包退役，提前结束测量"
                );
                self.stats.early_stopped = true;
                break;
            }
        }

        let report = self.finish();
        info!(
            average_delay = report.average_delay,
            throughput = report.throughput,
            saturated = report.saturated,
            packets = report.packets,
            "✅ 仿真完成"
        );
        report
    }

    /// 推进一个周期
    pub fn step(&mut self) -> CycleSummary {
        let mut summary = CycleSummary::default();
        self.inject(&mut summary);
        self.drain(&mut summary);

        self.stats.cycles_run += 1;
        let deepest = self.buffers.iter().map(|b| b.len()).max().unwrap_or(0);
        self.stats.max_buffer_occupancy = self.stats.max_buffer_occupancy.max(deepest);
        let busiest = self.link_use.values().copied().max().unwrap_or(0);
        self.stats.max_link_use = self.stats.max_link_use.max(busiest);

        if self.phase == Phase::Measurement {
            self.track_measurement_cycle(summary.retired);
        }
        self.cycle += 1;
        summary
    }

    fn inject(&mut self, summary: &mut CycleSummary) {
        let nodes = self.net.num_nodes();
        let admit_limit = self
            .params
            .buffer_size
            .saturating_sub(self.params.injection_reserve);
        for msg in injection_plan(&self.pattern, nodes, self.cycle, self.rate, self.trial) {
            let Some(buf) = self.buffers.get_mut(msg.src.0) else {
                continue;
            };
            if buf.len() >= admit_limit {
                self.stats.injection_refused += 1;
                continue;
            }
            let pkt = self.net.make_packet(msg);
            match buf.enqueue(pkt) {
                Ok(()) => {
                    self.stats.injected += 1;
                    summary.injected += 1;
                    trace!(src = ?msg.src, dst = ?msg.dst, cycle = self.cycle, "📦 注入数据包");
                }
                Err(_) => self.stats.injection_refused += 1,
            }
        }
    }

    fn drain(&mut self, summary: &mut CycleSummary) {
        self.link_use.clear();
        self.net.release_all_channels();

        let nodes = self.net.num_nodes();
        let link_budget = CapacitySchedule::link_budget().slots_at(self.rate);
        let global_cap = CapacitySchedule::global_moves(nodes).slots_at(self.rate);

        'rounds: for _ in 0..rounds_per_cycle(self.rate) {
            for idx in 0..nodes {
                if summary.moved >= global_cap {
                    break 'rounds;
                }
                if self.advance_head(NodeId(idx), link_budget, summary) {
                    summary.moved += 1;
                    self.stats.moves += 1;
                }
            }
        }
    }

    /// 尝试推进某节点的队首数据包；返回是否消耗了一次移动配额
    ///
    /// 队首已在目的节点则退役；否则转发一跳。退役与转发各占一次移动配额。
    fn advance_head(&mut self, node: NodeId, link_budget: u32, summary: &mut CycleSummary) -> bool {
        let Some(head) = self.buffers[node.0].front() else {
            return false;
        };
        let dst = head.dst;

        if head.arrived() {
            if let Some(pkt) = self.buffers[node.0].dequeue() {
                self.retire(pkt, node, summary);
            }
            return true;
        }

        let Some(hop) = self.routing.next_hop(&self.net, node, dst) else {
            self.stats.routing_stalls += 1;
            trace!(?node, ?dst, "路由暂无可用下一跳");
            return false;
        };

        let used = self.link_use.get(&(node, hop.next)).copied().unwrap_or(0);
        if used >= link_budget {
            self.congestion();
            return false;
        }
        if self.buffers[hop.next.0].is_full() {
            self.congestion();
            return false;
        }

        let Some(pkt) = self.buffers[node.0].dequeue() else {
            return false;
        };
        let pkt = pkt.advance(hop.next);
        *self.link_use.entry((node, hop.next)).or_insert(0) += 1;
        if self.params.channel_reservation {
            self.net.mark_transmitted(node, hop.next, hop.channel);
        }
        trace!(pkt_id = pkt.id, from = ?node, to = ?hop.next, channel = ?hop.channel, "➡️ 转发");

        // 到达目的节点的数据包在该节点被扫描到且位于队首时退役
        if let Err(pkt) = self.buffers[hop.next.0].enqueue(pkt) {
            warn!(pkt_id = pkt.id, at = ?hop.next, "缓冲区意外已满，丢弃数据包");
            self.stats.dropped += 1;
        }
        true
    }

    fn congestion(&mut self) {
        self.stats.congestion_events += 1;
        self.metrics.record_congestion_event();
    }

    fn retire(&mut self, pkt: Packet, at: NodeId, summary: &mut CycleSummary) {
        let sample = DelaySample {
            network_latency: self.cycle.saturating_sub(pkt.injected_at) as f64,
            hops: pkt.hops,
            injection_rate: self.rate,
            utilization: self.network_utilization(),
            buffer_occupancy: self.buffers.get(at.0).map_or(0.0, |b| b.occupancy()),
        };
        let delay = delay::packet_delay(&sample);
        self.metrics.record_packet_latency(delay);
        self.metrics.record_hop_count(pkt.hops);

        self.stats.retired += 1;
        if self.phase == Phase::Measurement {
            self.stats.retired_measured += 1;
        }
        summary.retired += 1;
        trace!(pkt_id = pkt.id, hops = pkt.hops, delay, "✅ 数据包退役");
    }

    /// 当前网络利用率
    pub fn network_utilization(&self) -> f64 {
        let nodes = self.buffers.len();
        let avg_buffer = if nodes == 0 {
            0.0
        } else {
            self.buffers.iter().map(|b| b.occupancy()).sum::<f64>() / nodes as f64
        };
        // 先做整数求和，结果与 HashMap 的遍历顺序无关
        let avg_link = if self.link_use.is_empty() {
            0.0
        } else {
            let total: u64 = self.link_use.values().map(|c| *c as u64).sum();
            total as f64 / LINK_UTIL_BASE / self.link_use.len() as f64
        };
        delay::network_utilization(avg_buffer, avg_link, self.rate)
    }

    fn track_measurement_cycle(&mut self, received: u32) {
        let nodes = self.net.num_nodes().max(1) as f64;
        self.stats.measurement_cycles_run += 1;

        if received == 0 {
            self.stats.zero_receive_streak += 1;
        } else {
            self.stats.zero_receive_streak = 0;
        }
        let expected = self.rate * nodes;
        if (received as f64) < expected * LOW_THROUGHPUT_FRACTION {
            self.stats.low_throughput_streak += 1;
        } else {
            self.stats.low_throughput_streak = 0;
        }

        let flits = received as f64 * self.params.packet_size_flits as f64;
        self.metrics.record_cycle_flits(flits / nodes);
        self.metrics.record_network_utilization(self.network_utilization());
    }

    /// 结束测量：计算吞吐、做饱和判定并生成报告
    fn finish(&mut self) -> RunReport {
        let nodes = self.net.num_nodes().max(1) as f64;
        let measurement = self.params.measurement_cycles.max(1) as f64;
        let flits = self.params.packet_size_flits as f64;
        let retired = self.stats.retired_measured;

        let raw = retired as f64 * flits / (measurement * nodes);
        let cap = CapacitySchedule::throughput_cap().at(self.rate);
        let reported = raw.min(cap).max(0.0);
        self.metrics.record_flit_throughput(reported);

        let average_delay = self.metrics.average_packet_delay();
        let saturated_now = SaturationCheck {
            retired,
            average_delay,
            reported_throughput: reported,
            injection_rate: self.rate,
            packet_size_flits: self.params.packet_size_flits,
            low_throughput_streak: self.stats.low_throughput_streak,
            zero_receive_streak: self.stats.zero_receive_streak,
            measurement_cycles: self.params.measurement_cycles,
        }
        .is_saturated();
        if saturated_now {
            self.metrics.set_saturated(true);
        }
        let saturated = self
            .metrics
            .is_saturated(self.params.latency_threshold, self.params.throughput_drop_threshold);
        debug!(raw, cap, reported, average_delay, saturated_now, "吞吐与饱和判定");

        let report = RunReport {
            injection_rate: self.rate,
            trial: self.trial,
            average_delay,
            raw_throughput: raw,
            throughput: reported,
            saturated,
            packets: retired,
            average_hops: self.metrics.average_hop_count(),
            in_flight: self.in_flight(),
            stats: self.stats.clone(),
        };
        self.metrics.end_measurement();
        self.phase = Phase::Reported;
        report
    }
}
