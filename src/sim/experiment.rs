//! 注入率扫描
//!
//! 每个注入率重复若干次试验（试验编号参与种子），再把结果聚合成一行：
//! 有效试验不少于 3 次取中位数，否则取均值；饱和按全部试验多数表决。
//! 没有任何有效试验的注入率记为阻塞。

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sim::engine::{Engine, RunReport};

/// 有效试验的时延上限
pub const MAX_VALID_DELAY: f64 = 2000.0;
/// CSV 中阻塞注入率的时延写法
pub const BLOCKED_DELAY_SENTINEL: f64 = 1000.0;

/// 单个注入率的聚合结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    pub injection_rate: f64,
    /// 阻塞时为 -1
    pub average_delay: f64,
    pub throughput: f64,
    pub saturated: bool,
    pub blocked: bool,
    pub valid_trials: usize,
    pub trials: usize,
}

impl RateResult {
    /// 写入 CSV 的时延（阻塞时用哨兵值）
    pub fn csv_delay(&self) -> f64 {
        if self.blocked {
            BLOCKED_DELAY_SENTINEL
        } else {
            self.average_delay
        }
    }
}

/// 扫描汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    /// 第一个饱和的注入率
    pub saturation_point: Option<f64>,
    /// 非饱和点中的最大吞吐
    pub peak_throughput: f64,
    /// 非饱和点的时延范围
    pub delay_range: Option<(f64, f64)>,
    /// 饱和点相对前一点的吞吐下降（百分比）
    pub throughput_drop_percent: Option<f64>,
}

/// 有效试验：有退役数据包且时延在 (0, 2000) 内
pub fn is_valid_trial(report: &RunReport) -> bool {
    report.packets > 0 && report.average_delay > 0.0 && report.average_delay < MAX_VALID_DELAY
}

/// 聚合同一注入率的多次试验
pub fn aggregate(rate: f64, reports: &[RunReport]) -> RateResult {
    let valid: Vec<&RunReport> = reports.iter().filter(|r| is_valid_trial(r)).collect();
    if valid.is_empty() {
        return RateResult {
            injection_rate: rate,
            average_delay: -1.0,
            throughput: 0.0,
            saturated: true,
            blocked: true,
            valid_trials: 0,
            trials: reports.len(),
        };
    }

    let mut delays: Vec<f64> = valid.iter().map(|r| r.average_delay).collect();
    let mut throughputs: Vec<f64> = valid.iter().map(|r| r.throughput).collect();
    let (average_delay, throughput) = if valid.len() >= 3 {
        delays.sort_by(f64::total_cmp);
        throughputs.sort_by(f64::total_cmp);
        let mid = valid.len() / 2;
        (delays[mid], throughputs[mid])
    } else {
        (mean(&delays), mean(&throughputs))
    };

    // 无效试验按饱和计票
    let saturated_votes = reports
        .iter()
        .filter(|r| !is_valid_trial(r) || r.saturated)
        .count();

    RateResult {
        injection_rate: rate,
        average_delay,
        throughput,
        saturated: saturated_votes > reports.len() / 2,
        blocked: false,
        valid_trials: valid.len(),
        trials: reports.len(),
    }
}

/// 对每个注入率运行 `runs` 次试验并聚合
pub fn run_sweep(engine: &mut Engine, rates: &[f64], runs: usize) -> Vec<RateResult> {
    let mut out = Vec::with_capacity(rates.len());
    for (i, &rate) in rates.iter().enumerate() {
        info!(rate, index = i + 1, total = rates.len(), "📈 测试注入率");
        let reports: Vec<RunReport> = (0..runs.max(1))
            .map(|trial| {
                let report = engine.run_trial(rate, trial as u64);
                debug!(
                    trial,
                    delay = report.average_delay,
                    throughput = report.throughput,
                    packets = report.packets,
                    saturated = report.saturated,
                    "试验结果"
                );
                report
            })
            .collect();
        engine.reset();
        let result = aggregate(rate, &reports);
        info!(
            rate,
            delay = result.average_delay,
            throughput = result.throughput,
            saturated = result.saturated,
            blocked = result.blocked,
            "注入率结果"
        );
        out.push(result);
    }
    out
}

/// 汇总扫描结果
pub fn summarize(results: &[RateResult]) -> SweepSummary {
    let stable: Vec<&RateResult> = results
        .iter()
        .filter(|r| !r.saturated && r.average_delay > 0.0 && r.average_delay < 100.0)
        .collect();

    let peak_throughput = stable.iter().map(|r| r.throughput).fold(0.0, f64::max);
    let delay_range = match (stable.first(), stable.last()) {
        (Some(first), Some(last)) => Some((first.average_delay, last.average_delay)),
        _ => None,
    };

    let saturated_at = results.iter().position(|r| r.saturated);
    let throughput_drop_percent = saturated_at.and_then(|i| {
        let prev = results.get(i.checked_sub(1)?)?;
        (prev.throughput > 0.0)
            .then(|| (prev.throughput - results[i].throughput) / prev.throughput * 100.0)
    });

    SweepSummary {
        saturation_point: saturated_at.map(|i| results[i].injection_rate),
        peak_throughput,
        delay_range,
        throughput_drop_percent,
    }
}

/// 生成结果 CSV
///
/// 每行 `# ` 开头的注释在前，然后是表头和每个注入率一行。
pub fn to_csv(comments: &[String], results: &[RateResult]) -> String {
    let mut out = String::new();
    for c in comments {
        let _ = writeln!(out, "# {c}");
    }
    out.push_str("InjectionRate,AverageDelay,Throughput,Saturated\n");
    for r in results {
        let _ = writeln!(
            out,
            "{:.6},{:.3},{:.4},{}",
            r.injection_rate,
            r.csv_delay(),
            r.throughput,
            if r.saturated { 1 } else { 0 }
        );
    }
    out
}

/// 读回结果 CSV
///
/// 跳过空行、注释行和表头；字段不足三列或无法解析的行直接忽略。
/// 时延等于哨兵值的行记为阻塞。CSV 不含试验次数，读回后两者均为 0。
pub fn from_csv(raw: &str) -> Vec<RateResult> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.contains("InjectionRate"))
        .filter_map(|line| {
            let row = parse_csv_row(line);
            if row.is_none() {
                debug!(line, "跳过无法解析的 CSV 行");
            }
            row
        })
        .collect()
}

fn parse_csv_row(line: &str) -> Option<RateResult> {
    let mut fields = line.split(',').map(str::trim);
    let injection_rate = fields.next()?.parse::<f64>().ok()?;
    let delay = fields.next()?.parse::<f64>().ok()?;
    let throughput = fields.next()?.parse::<f64>().ok()?;
    let saturated = matches!(fields.next(), Some("1" | "true"));
    let blocked = delay == BLOCKED_DELAY_SENTINEL;
    Some(RateResult {
        injection_rate,
        average_delay: if blocked { -1.0 } else { delay },
        throughput,
        saturated,
        blocked,
        valid_trials: 0,
        trials: 0,
    })
}

/// 读回的 CSV 与内存中的结果是否一致：行数相同且注入率逐行对应
pub fn csv_matches(read_back: &[RateResult], expected: &[RateResult]) -> bool {
    read_back.len() == expected.len()
        && read_back
            .iter()
            .zip(expected)
            .all(|(a, b)| (a.injection_rate - b.injection_rate).abs() < 1e-6 && a.saturated == b.saturated)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
