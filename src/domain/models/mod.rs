// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 分页范围（page）：偏移量区间和步长
/// - 记录（record）：远程记录、记录集和单节点提取结果
pub mod page;
pub mod record;
