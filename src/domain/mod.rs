// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心逻辑，包括：
/// - 领域模型（models）：记录、记录集、分页范围和提取结果
/// - 定位表达式（locator）：路径表达式和CSS选择器的编译与求值
/// - 服务（services）：尽力而为的字段提取
///
/// 领域层不发出网络请求，只处理已经获取和解析好的数据。
pub mod locator;
pub mod models;
pub mod services;
