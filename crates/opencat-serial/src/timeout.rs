//! 超时模型
//!
//! 单次读/写操作的总预算 = 常量 + 乘数 × 字节数（毫秒）。
//! 读操作额外有字节间隔超时：收到第一个字节后，相邻两个字节之间的最长等待时间。
//! 任一分量为 [`Timeout::MAX`] 表示该分量不生效。

use std::time::Duration;

/// 串口超时配置（单位：毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    /// 字节间隔超时
    pub inter_byte_ms: u32,
    /// 读超时常量部分
    pub read_constant_ms: u32,
    /// 读超时乘数（每字节）
    pub read_multiplier_ms: u32,
    /// 写超时常量部分
    pub write_constant_ms: u32,
    /// 写超时乘数（每字节）
    pub write_multiplier_ms: u32,
}

/// 读循环下一步的等待计划
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPlan {
    /// 最多再等待这么久
    Wait(Duration),
    /// 无限等待
    Forever,
    /// 预算已用完
    Expired,
}

impl Timeout {
    /// 不生效的超时分量
    pub const MAX: u32 = u32::MAX;

    pub const fn new(
        inter_byte_ms: u32,
        read_constant_ms: u32,
        read_multiplier_ms: u32,
        write_constant_ms: u32,
        write_multiplier_ms: u32,
    ) -> Self {
        Self {
            inter_byte_ms,
            read_constant_ms,
            read_multiplier_ms,
            write_constant_ms,
            write_multiplier_ms,
        }
    }

    /// 简单超时：读、写各自的总预算都是 `ms`，不使用字节间隔超时
    pub const fn simple(ms: u32) -> Self {
        Self::new(Self::MAX, ms, 0, ms, 0)
    }

    /// 读 `len` 字节的总预算，`None` 表示无限
    pub fn read_budget(&self, len: usize) -> Option<Duration> {
        budget(self.read_constant_ms, self.read_multiplier_ms, len)
    }

    /// 写 `len` 字节的总预算，`None` 表示无限
    pub fn write_budget(&self, len: usize) -> Option<Duration> {
        budget(self.write_constant_ms, self.write_multiplier_ms, len)
    }

    /// 字节间隔超时，`None` 表示不使用
    pub fn inter_byte(&self) -> Option<Duration> {
        (self.inter_byte_ms != Self::MAX).then(|| Duration::from_millis(self.inter_byte_ms as u64))
    }

    /// 计算读循环的下一次等待
    ///
    /// - `len`: 本次读操作请求的字节数
    /// - `elapsed`: 本次读操作已经花费的时间
    /// - `received_any`: 是否已经收到过字节（决定字节间隔超时是否生效）
    pub fn next_read_wait(&self, len: usize, elapsed: Duration, received_any: bool) -> WaitPlan {
        let remaining = match self.read_budget(len) {
            Some(total) => match total.checked_sub(elapsed) {
                Some(left) if !left.is_zero() => Some(left),
                _ => return WaitPlan::Expired,
            },
            None => None,
        };

        let gap = if received_any { self.inter_byte() } else { None };
        match (remaining, gap) {
            (Some(left), Some(gap)) => WaitPlan::Wait(left.min(gap)),
            (Some(left), None) => WaitPlan::Wait(left),
            (None, Some(gap)) => WaitPlan::Wait(gap),
            (None, None) => WaitPlan::Forever,
        }
    }
}

impl Default for Timeout {
    /// 1 秒简单超时
    fn default() -> Self {
        Self::simple(1000)
    }
}

fn budget(constant_ms: u32, multiplier_ms: u32, len: usize) -> Option<Duration> {
    if constant_ms == Timeout::MAX {
        return None;
    }
    let per_byte = (multiplier_ms as u64).saturating_mul(len as u64);
    Some(Duration::from_millis((constant_ms as u64).saturating_add(per_byte)))
}
