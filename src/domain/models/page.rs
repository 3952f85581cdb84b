// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 分页范围
///
/// 半开区间 `[start, end)`，按 `step` 递增。不会自动探测最后一页：
/// 范围偏小时尾页不会被获取，偏大时行为取决于远程数据源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    /// 每页记录数，作为页大小参数发送
    pub page_size: u64,
    /// 起始偏移量（包含）
    pub start: u64,
    /// 结束边界（不包含）
    pub end: u64,
    /// 偏移步长
    pub step: u64,
}

impl PageRange {
    /// 以页大小作为步长创建分页范围
    pub fn new(page_size: u64, start: u64, end: u64) -> Self {
        Self {
            page_size,
            start,
            end,
            step: page_size,
        }
    }

    /// 覆盖默认步长
    pub fn with_step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// 请求次数：ceil((end - start) / step)
    ///
    /// `step == 0` 时返回 0，由调用方在校验阶段拒绝。
    pub fn page_count(&self) -> u64 {
        if self.step == 0 || self.start >= self.end {
            return 0;
        }
        (self.end - self.start).div_ceil(self.step)
    }

    /// 依次产生每个请求的偏移量 start + k*step
    pub fn offsets(&self) -> impl Iterator<Item = u64> {
        let (start, step) = (self.start, self.step);
        (0..self.page_count()).map(move |k| start + k * step)
    }
}
