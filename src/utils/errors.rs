// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 表格输出错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("无效分隔符: {0:?}")]
    InvalidDelimiter(char),
}
