// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含把获取、提取和输出串起来的用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含记录模型、定位表达式和字段提取服务
pub mod domain;

/// 引擎模块
///
/// 实现HTTP传输和分页获取
pub mod engines;

/// 基础设施模块
///
/// 提供分隔文本输出
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
