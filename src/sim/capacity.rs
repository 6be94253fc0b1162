//! 随注入率收缩的容量
//!
//! 链路带宽、全局每周期移动数和上报吞吐上限都遵循同一种分段线性曲线：
//! 注入率低于拐点时为基准值，越过拐点后按 `(rate - knee) / window` 线性下降，最低到下限。

/// 分段线性容量曲线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacitySchedule {
    pub base: f64,
    pub knee: f64,
    pub window: f64,
    /// 注入率越过拐点一个窗口时相对基准值的降幅
    pub reduction: f64,
    pub floor: f64,
}

impl CapacitySchedule {
    /// 每条有向链路每周期可通过的跳数
    pub fn link_budget() -> Self {
        Self {
            base: 3.0,
            knee: 0.15,
            window: 0.08,
            reduction: 0.7,
            floor: 1.0,
        }
    }

    /// 全网每周期可完成的移动数（退役也算一次）
    pub fn global_moves(nodes: usize) -> Self {
        let base = (nodes / 2) as f64;
        Self {
            base,
            knee: 0.16,
            window: 0.06,
            reduction: 0.8,
            floor: (nodes / 2 / 6).max(1) as f64,
        }
    }

    /// 上报吞吐（flits/节点/周期）的上限
    pub fn throughput_cap() -> Self {
        Self {
            base: 0.75,
            knee: 0.16,
            window: 0.10,
            reduction: 1.0,
            floor: 0.0,
        }
    }

    pub fn at(&self, rate: f64) -> f64 {
        if rate <= self.knee {
            return self.base;
        }
        let over = (rate - self.knee) / self.window;
        (self.base * (1.0 - over * self.reduction)).max(self.floor)
    }

    /// 取整后的容量，不低于下限
    pub fn slots_at(&self, rate: f64) -> u32 {
        (self.at(rate) as u32).max(self.floor as u32)
    }
}

/// 每周期的路由轮数，负载越高轮数越少
pub fn rounds_per_cycle(rate: f64) -> u32 {
    if rate > 0.18 {
        1
    } else if rate > 0.15 {
        2
    } else {
        3
    }
}
